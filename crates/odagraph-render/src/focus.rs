//! Focus/highlight state: a pure function from `(graph, focused node)` to a
//! visual directive, recomputed fresh on every transition rather than
//! mutated in place.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::Graph;

pub const BASE_NODE_OPACITY: f64 = 1.0;
pub const DIMMED_NODE_OPACITY: f64 = 0.2;

pub const BASE_EDGE_STROKE: &str = "#b1b1b7";
pub const FADED_EDGE_STROKE: &str = "#e5e5e5";
pub const BASE_EDGE_WIDTH: f64 = 1.0;
pub const FOCUS_EDGE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeEmphasis {
    pub opacity: f64,
    pub dimmed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeEmphasis {
    pub stroke: String,
    pub stroke_width: f64,
    /// Labels of non-related edges are hidden outright, not merely faded.
    pub label_visible: bool,
    pub faded: bool,
}

/// One directive per focus change: the complete visual state of every node
/// and edge. The rendering surface applies it wholesale.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualDirective {
    pub focused: Option<String>,
    pub nodes: IndexMap<String, NodeEmphasis>,
    pub edges: IndexMap<String, EdgeEmphasis>,
}

/// Neutral state: every node and edge at base color and opacity, labels in
/// their always-visible state.
pub fn neutral(graph: &Graph) -> VisualDirective {
    let nodes = graph
        .nodes
        .iter()
        .map(|n| {
            (
                n.id.clone(),
                NodeEmphasis {
                    opacity: BASE_NODE_OPACITY,
                    dimmed: false,
                },
            )
        })
        .collect();
    let edges = graph
        .edges
        .iter()
        .map(|e| {
            (
                e.id.clone(),
                EdgeEmphasis {
                    stroke: BASE_EDGE_STROKE.to_string(),
                    stroke_width: BASE_EDGE_WIDTH,
                    label_visible: true,
                    faded: false,
                },
            )
        })
        .collect();
    VisualDirective {
        focused: None,
        nodes,
        edges,
    }
}

/// Focused state for `node_id`: the node, its incident edges, and the
/// entities on their far ends at full emphasis; everything else dimmed
/// (nodes) or faded with labels hidden (edges). Edges at full emphasis keep
/// their own relationship color rather than the base stroke.
pub fn highlight(graph: &Graph, node_id: &str) -> VisualDirective {
    let related_edges: Vec<&crate::model::Edge> = graph
        .edges
        .iter()
        .filter(|e| e.source == node_id || e.target == node_id)
        .collect();

    let mut related_nodes: Vec<&str> = vec![node_id];
    for e in &related_edges {
        for end in [e.source.as_str(), e.target.as_str()] {
            if !related_nodes.contains(&end) {
                related_nodes.push(end);
            }
        }
    }

    let nodes = graph
        .nodes
        .iter()
        .map(|n| {
            let related = related_nodes.contains(&n.id.as_str());
            (
                n.id.clone(),
                NodeEmphasis {
                    opacity: if related {
                        BASE_NODE_OPACITY
                    } else {
                        DIMMED_NODE_OPACITY
                    },
                    dimmed: !related,
                },
            )
        })
        .collect();

    let edges = graph
        .edges
        .iter()
        .map(|e| {
            let related = e.source == node_id || e.target == node_id;
            let emphasis = if related {
                EdgeEmphasis {
                    stroke: e.color.clone(),
                    stroke_width: FOCUS_EDGE_WIDTH,
                    label_visible: true,
                    faded: false,
                }
            } else {
                EdgeEmphasis {
                    stroke: FADED_EDGE_STROKE.to_string(),
                    stroke_width: BASE_EDGE_WIDTH,
                    label_visible: false,
                    faded: true,
                }
            };
            (e.id.clone(), emphasis)
        })
        .collect();

    VisualDirective {
        focused: Some(node_id.to_string()),
        nodes,
        edges,
    }
}

/// Single-focus state machine over the current graph.
///
/// There is no toggle-off: focusing the already-focused node recomputes the
/// identical directive. Only an explicit reset (or a new load) returns to
/// neutral.
#[derive(Debug, Clone, Default)]
pub struct FocusState {
    focused: Option<String>,
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn focus(&mut self, graph: &Graph, node_id: &str) -> VisualDirective {
        self.focused = Some(node_id.to_string());
        highlight(graph, node_id)
    }

    pub fn reset(&mut self, graph: &Graph) -> VisualDirective {
        self.focused = None;
        neutral(graph)
    }
}
