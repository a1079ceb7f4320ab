use indexmap::IndexMap;
use odagraph_core::FieldConstraint;
use serde::{Deserialize, Serialize};

/// Fixed relationship color palette. Pair colors are assigned by hashing the
/// sorted entity-pair key modulo the palette size, so the same pair always
/// gets the same color; collisions across different pairs are acceptable.
pub const PALETTE: [&str; 12] = [
    "#2563eb", "#dc2626", "#16a34a", "#9333ea", "#ea580c", "#0891b2", "#db2777", "#65a30d",
    "#7c3aed", "#0d9488", "#b91c1c", "#4f46e5",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortRole {
    Source,
    Target,
}

/// A connection point on a node boundary, with its side resolved after
/// layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub role: PortRole,
    pub side: Side,
    /// Key field anchoring this endpoint, when a referential constraint
    /// names one.
    pub field: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeHint {
    pub width: f64,
    pub height: f64,
}

/// Pre-layout node: one per entity, id equals the entity name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// Layout-time size. Intentionally generous versus the final render
    /// size so the engine leaves clearance around node bodies.
    pub size_hint: SizeHint,
    /// Capped count of properties shown in the node body.
    pub visible_properties: usize,
    /// Capped count of navigation rows shown in the node body.
    pub visible_navigation: usize,
    /// Property name → palette color for referential-constraint fields.
    pub field_colors: IndexMap<String, String>,
}

/// One undirected, deduplicated relationship between two distinct entities.
/// At most one exists per unordered entity pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    /// Deterministic palette index for the unordered `{source, target}` pair.
    pub color_index: usize,
    pub color: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_constraints: Vec<FieldConstraint>,
}

/// Post-layout node: absolute position, actual render size (smaller than
/// the layout-time hint), and resolved ports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub field_colors: IndexMap<String, String>,
    #[serde(default)]
    pub ports: Vec<Port>,
}

/// Finalized edge handed to the rendering surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub color: String,
    pub source_side: Side,
    pub target_side: Side,
}

/// The entire surface exposed to the rendering layer (besides the focus
/// directive stream). Wholly replaced on each successful load, never
/// patched in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Graph {
    pub nodes: Vec<PlacedNode>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

// ---------------------------------------------------------------------------
// Layout-engine boundary.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    #[default]
    Right,
    Down,
    Left,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Routing {
    #[default]
    Orthogonal,
    Polyline,
    Splines,
}

/// Docking-side strategy for the fixed-docking (no free ports) mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DockingStrategy {
    #[default]
    Horizontal,
    Vertical,
}

/// Named layout directives passed through to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutDirectives {
    pub direction: Direction,
    pub node_spacing: f64,
    pub layer_spacing: f64,
    pub routing: Routing,
}

impl Default for LayoutDirectives {
    fn default() -> Self {
        Self {
            direction: Direction::Right,
            node_spacing: 80.0,
            layer_spacing: 100.0,
            routing: Routing::Orthogonal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutNodeSpec {
    pub id: String,
    pub width: f64,
    pub height: f64,
    /// Free-floating connection points the engine should place on the node
    /// boundary. Empty in fixed-docking mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<LayoutPortSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutPortSpec {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutEdgeSpec {
    pub id: String,
    pub sources: Vec<String>,
    pub targets: Vec<String>,
}

/// Graph description handed to the external layout engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub directives: LayoutDirectives,
    pub nodes: Vec<LayoutNodeSpec>,
    pub edges: Vec<LayoutEdgeSpec>,
}

/// Port coordinates are relative to the owning node's top-left corner; the
/// engine may place a port anywhere on the boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedPort {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedLayoutNode {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub ports: Vec<PlacedPort>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutResponse {
    pub nodes: Vec<PlacedLayoutNode>,
}
