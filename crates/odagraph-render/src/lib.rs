#![forbid(unsafe_code)]

//! Relationship graph builder + focus state for OData entity schemas.
//!
//! Consumes the normalized schema from `odagraph-core` and produces a
//! presentation graph in two phases around an external layout engine:
//!
//! - [`prepare`]: one node per entity (with layout size hints), one
//!   deduplicated edge per distinct entity pair, deterministic per-pair
//!   colors, and the layout request to hand to the engine.
//! - [`finalize`]: positions and render sizes from the engine's response,
//!   plus a resolved docking side for every connection point.
//!
//! The layout engine itself is a collaborator behind the [`LayoutEngine`]
//! trait; this crate only feeds it a well-sized, deduplicated graph
//! description and interprets its output.

pub mod builder;
pub mod focus;
pub mod layout;
pub mod model;
pub mod session;

pub use builder::{GraphOptions, PortPlacement, PreparedGraph, finalize, prepare};
pub use focus::{EdgeEmphasis, FocusState, NodeEmphasis, VisualDirective, highlight, neutral};
pub use layout::{LayoutEngine, RowLayout};
pub use model::{
    Direction, DockingStrategy, Edge, Graph, GraphNode, LayoutDirectives, LayoutRequest,
    LayoutResponse, PlacedNode, Port, PortRole, RelationshipEdge, Routing, Side,
};
pub use session::{LoadTicket, Session};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("layout engine failed: {message}")]
    LayoutEngine { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests;
