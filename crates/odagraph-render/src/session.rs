//! Load pipeline + current-graph ownership.
//!
//! A load is a strictly sequential pipeline (resolve → prepare → layout →
//! finalize) with the layout call as its one slow step. Overlapping loads
//! follow last-write-wins with explicit cancellation of stale results: a
//! generation counter invalidates every ticket issued before the newest
//! `begin_load`, so a slow older load can never overwrite a newer graph.

use odagraph_core::{Schema, resolve_metadata};
use tracing::{debug, warn};

use crate::builder::{GraphOptions, finalize, prepare};
use crate::focus::{FocusState, VisualDirective};
use crate::layout::LayoutEngine;
use crate::model::Graph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

/// Owns the single "current displayed graph" and the focus state attached
/// to it. The graph is wholly replaced on each successful load, never
/// patched incrementally.
#[derive(Debug, Default)]
pub struct Session {
    generation: u64,
    current: Option<Graph>,
    focus: FocusState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new load, invalidating every outstanding ticket.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Runs the full pipeline for one metadata document and installs the
    /// result. Returns `false` when the ticket went stale mid-flight (a
    /// newer load was started) and the result was discarded.
    ///
    /// Every failure mode short of a stale ticket degrades to the no-data
    /// state: malformed metadata resolves to an empty schema, and a layout
    /// engine failure clears the displayed graph.
    pub async fn load(
        &mut self,
        ticket: LoadTicket,
        metadata: &str,
        engine: &dyn LayoutEngine,
        options: &GraphOptions,
    ) -> bool {
        let schema = resolve_metadata(metadata);
        self.load_schema(ticket, &schema, engine, options).await
    }

    /// Same pipeline minus the resolve step, for callers that already hold
    /// a resolved schema.
    pub async fn load_schema(
        &mut self,
        ticket: LoadTicket,
        schema: &Schema,
        engine: &dyn LayoutEngine,
        options: &GraphOptions,
    ) -> bool {
        if schema.is_empty() {
            return self.install(ticket, None);
        }

        let prepared = prepare(schema, options);
        let graph = match engine.layout(&prepared.request) {
            Ok(response) => Some(finalize(&prepared, &response)),
            Err(err) => {
                warn!(error = %err, "layout engine failed; degrading to no-data state");
                None
            }
        };
        self.install(ticket, graph)
    }

    /// Installs a finished load. Stale tickets are rejected so the newest
    /// `begin_load` always wins regardless of completion order. Installing
    /// anything resets focus to neutral.
    pub fn install(&mut self, ticket: LoadTicket, graph: Option<Graph>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale load result"
            );
            return false;
        }
        self.current = graph;
        self.focus = FocusState::new();
        true
    }

    pub fn graph(&self) -> Option<&Graph> {
        self.current.as_ref()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focus.focused()
    }

    /// Focus transition; `None` when no graph is displayed.
    pub fn focus_node(&mut self, node_id: &str) -> Option<VisualDirective> {
        let graph = self.current.as_ref()?;
        Some(self.focus.focus(graph, node_id))
    }

    /// Explicit reset back to the neutral directive.
    pub fn reset_focus(&mut self) -> Option<VisualDirective> {
        let graph = self.current.as_ref()?;
        Some(self.focus.reset(graph))
    }
}
