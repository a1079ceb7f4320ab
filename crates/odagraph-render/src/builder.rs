//! Two-phase graph construction around the external layout call.

use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use odagraph_core::{EntityType, NavigationProperty, Schema};
use rustc_hash::{FxHashMap, FxHashSet, FxHasher};
use tracing::{debug, warn};

use crate::model::{
    DockingStrategy, Edge, Graph, GraphNode, LayoutDirectives, LayoutEdgeSpec, LayoutNodeSpec,
    LayoutPortSpec, LayoutRequest, LayoutResponse, PALETTE, PlacedLayoutNode, PlacedNode, Port,
    PortRole, RelationshipEdge, Side, SizeHint,
};

/// Row caps for node bodies; anything beyond is elided in display.
const MAX_VISIBLE_PROPERTIES: usize = 12;
const MAX_VISIBLE_NAVIGATION: usize = 8;

// Layout-time metrics pad generously so edges routed by the engine clear
// node bodies instead of crossing through them.
const HINT_WIDTH: f64 = 220.0;
const HINT_ROW_HEIGHT: f64 = 24.0;
const HINT_HEADER_HEIGHT: f64 = 40.0;
const HINT_FOOTER_HEIGHT: f64 = 16.0;

// Render-time metrics are what actually gets drawn.
const RENDER_WIDTH: f64 = 180.0;
const RENDER_ROW_HEIGHT: f64 = 18.0;
const RENDER_HEADER_HEIGHT: f64 = 30.0;
const RENDER_FOOTER_HEIGHT: f64 = 8.0;

/// A port within this distance of a node boundary edge resolves to that side.
const PORT_SIDE_TOLERANCE: f64 = 2.0;

/// Below this horizontal (or vertical) center distance the two nodes are
/// treated as stacked and both edge ends dock on the same side, so the edge
/// routes around intervening nodes instead of straight through them.
const SAME_SIDE_THRESHOLD: f64 = 60.0;

/// How connection points are obtained from the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortPlacement {
    /// One free-floating port per relationship endpoint; the engine decides
    /// where on the boundary each lands and we classify the side afterwards.
    FreePorts,
    /// No ports in the request; docking sides are picked from node geometry.
    Docked(DockingStrategy),
}

impl Default for PortPlacement {
    fn default() -> Self {
        Self::Docked(DockingStrategy::Horizontal)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GraphOptions {
    pub directives: LayoutDirectives,
    pub ports: PortPlacement,
}

/// Output of the pre-layout phase: nodes with size hints, deduplicated
/// edges, and the request to hand to the layout engine.
#[derive(Debug, Clone)]
pub struct PreparedGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<RelationshipEdge>,
    pub request: LayoutRequest,
    pub options: GraphOptions,
}

/// Phase 1: schema → nodes, deduplicated edges, field colors, layout request.
pub fn prepare(schema: &Schema, options: &GraphOptions) -> PreparedGraph {
    let known: FxHashSet<&str> = schema.entities.iter().map(|e| e.name.as_str()).collect();

    let mut field_colors: FxHashMap<&str, IndexMap<String, String>> = FxHashMap::default();
    let mut seen_pairs: FxHashSet<String> = FxHashSet::default();
    let mut edges: Vec<RelationshipEdge> = Vec::new();

    for entity in &schema.entities {
        for nav in &entity.navigation {
            let Some(target) = nav.target.as_deref() else {
                continue;
            };
            if !known.contains(target) {
                debug!(entity = %entity.name, nav = %nav.name, target, "navigation target is not a known entity; no edge");
                continue;
            }
            if target == entity.name {
                // Self-loops are dropped entirely, field coloring included.
                continue;
            }

            let key = pair_key(&entity.name, target);
            let color_index = color_index(&key);
            let color = PALETTE[color_index].to_string();

            // Both declared directions of a pair contribute field colors,
            // even though only the first produces an edge object.
            for c in &nav.constraints {
                field_colors
                    .entry(entity.name.as_str())
                    .or_default()
                    .insert(c.source_field.clone(), color.clone());
                field_colors
                    .entry(target)
                    .or_default()
                    .insert(c.target_field.clone(), color.clone());
            }

            if !seen_pairs.insert(key) {
                continue;
            }
            edges.push(RelationshipEdge {
                id: format!("{}-{}", entity.name, target),
                source: entity.name.clone(),
                target: target.to_string(),
                label: edge_label(entity, nav, target),
                color_index,
                color,
                field_constraints: nav.constraints.clone(),
            });
        }
    }

    let mut nodes = Vec::with_capacity(schema.entities.len());
    for entity in &schema.entities {
        let visible_properties = entity.properties.len().min(MAX_VISIBLE_PROPERTIES);
        let visible_navigation = entity.navigation.len().min(MAX_VISIBLE_NAVIGATION);
        nodes.push(GraphNode {
            id: entity.name.clone(),
            size_hint: size_hint_for(visible_properties, visible_navigation),
            visible_properties,
            visible_navigation,
            field_colors: field_colors
                .remove(entity.name.as_str())
                .unwrap_or_default(),
        });
    }

    let request = build_request(&nodes, &edges, options);
    PreparedGraph {
        nodes,
        edges,
        request,
        options: *options,
    }
}

/// Phase 2: layout response → positioned nodes with render sizes and
/// resolved port sides, plus finalized edges.
///
/// Degrades instead of failing: a node absent from the response is dropped
/// together with its edges.
pub fn finalize(prepared: &PreparedGraph, response: &LayoutResponse) -> Graph {
    let placed: FxHashMap<&str, &PlacedLayoutNode> = response
        .nodes
        .iter()
        .map(|n| (n.id.as_str(), n))
        .collect();

    let mut nodes = Vec::with_capacity(prepared.nodes.len());
    for node in &prepared.nodes {
        let Some(p) = placed.get(node.id.as_str()) else {
            warn!(node = %node.id, "layout response is missing a node; dropping it");
            continue;
        };
        let (width, height) = render_size_for(node.visible_properties, node.visible_navigation);
        let ports = node_ports(node, p, &prepared.edges, &placed, prepared.options.ports);
        nodes.push(PlacedNode {
            id: node.id.clone(),
            x: p.x,
            y: p.y,
            width,
            height,
            field_colors: node.field_colors.clone(),
            ports,
        });
    }

    let mut edges = Vec::with_capacity(prepared.edges.len());
    for edge in &prepared.edges {
        let (Some(s), Some(t)) = (
            placed.get(edge.source.as_str()).copied(),
            placed.get(edge.target.as_str()).copied(),
        ) else {
            warn!(edge = %edge.id, "layout response is missing an edge endpoint; dropping the edge");
            continue;
        };
        let (source_side, target_side) = edge_sides(edge, s, t, prepared.options.ports);
        edges.push(Edge {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            label: edge.label.clone(),
            color: edge.color.clone(),
            source_side,
            target_side,
        });
    }

    Graph { nodes, edges }
}

fn build_request(
    nodes: &[GraphNode],
    edges: &[RelationshipEdge],
    options: &GraphOptions,
) -> LayoutRequest {
    let mut node_ports: FxHashMap<&str, Vec<LayoutPortSpec>> = FxHashMap::default();
    if options.ports == PortPlacement::FreePorts {
        for edge in edges {
            node_ports
                .entry(edge.source.as_str())
                .or_default()
                .push(LayoutPortSpec {
                    id: source_port_id(&edge.id),
                });
            node_ports
                .entry(edge.target.as_str())
                .or_default()
                .push(LayoutPortSpec {
                    id: target_port_id(&edge.id),
                });
        }
    }

    LayoutRequest {
        directives: options.directives,
        nodes: nodes
            .iter()
            .map(|n| LayoutNodeSpec {
                id: n.id.clone(),
                width: n.size_hint.width,
                height: n.size_hint.height,
                ports: node_ports.remove(n.id.as_str()).unwrap_or_default(),
            })
            .collect(),
        edges: edges
            .iter()
            .map(|e| LayoutEdgeSpec {
                id: e.id.clone(),
                sources: vec![e.source.clone()],
                targets: vec![e.target.clone()],
            })
            .collect(),
    }
}

fn size_hint_for(properties: usize, navigation: usize) -> SizeHint {
    SizeHint {
        width: HINT_WIDTH,
        height: HINT_HEADER_HEIGHT
            + (properties + navigation) as f64 * HINT_ROW_HEIGHT
            + HINT_FOOTER_HEIGHT,
    }
}

fn render_size_for(properties: usize, navigation: usize) -> (f64, f64) {
    (
        RENDER_WIDTH,
        RENDER_HEADER_HEIGHT
            + (properties + navigation) as f64 * RENDER_ROW_HEIGHT
            + RENDER_FOOTER_HEIGHT,
    )
}

fn pair_key(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}|{hi}")
}

/// Deterministic palette index for a sorted pair key. Stable across reloads
/// and independent of which direction of the pair was processed first.
pub(crate) fn color_index(pair_key: &str) -> usize {
    let mut hasher = FxHasher::default();
    pair_key.hash(&mut hasher);
    (hasher.finish() % PALETTE.len() as u64) as usize
}

fn edge_label(entity: &EntityType, nav: &NavigationProperty, target: &str) -> String {
    match (
        nav.source_multiplicity.as_deref(),
        nav.target_multiplicity.as_deref(),
    ) {
        (Some(s), Some(t)) => format!("{} ({s} : {t})", nav.name),
        _ if !nav.name.is_empty() => nav.name.clone(),
        _ => format!("{} - {}", entity.name, target),
    }
}

fn source_port_id(edge_id: &str) -> String {
    format!("{edge_id}:source")
}

fn target_port_id(edge_id: &str) -> String {
    format!("{edge_id}:target")
}

fn node_ports(
    node: &GraphNode,
    placed: &PlacedLayoutNode,
    edges: &[RelationshipEdge],
    placed_by_id: &FxHashMap<&str, &PlacedLayoutNode>,
    placement: PortPlacement,
) -> Vec<Port> {
    let mut ports = Vec::new();
    for edge in edges {
        let (role, port_id, field) = if edge.source == node.id {
            (
                PortRole::Source,
                source_port_id(&edge.id),
                edge.field_constraints.first().map(|c| c.source_field.clone()),
            )
        } else if edge.target == node.id {
            (
                PortRole::Target,
                target_port_id(&edge.id),
                edge.field_constraints.first().map(|c| c.target_field.clone()),
            )
        } else {
            continue;
        };

        let side = match placement {
            PortPlacement::FreePorts => {
                let Some(p) = placed.ports.iter().find(|p| p.id == port_id) else {
                    debug!(port = %port_id, "layout response is missing a port; skipping it");
                    continue;
                };
                classify_port_side(p.x, p.y, placed.width, placed.height)
            }
            PortPlacement::Docked(strategy) => {
                let other_id = if role == PortRole::Source {
                    edge.target.as_str()
                } else {
                    edge.source.as_str()
                };
                let Some(other) = placed_by_id.get(other_id).copied() else {
                    continue;
                };
                docking_sides(placed, other, strategy).0
            }
        };

        ports.push(Port {
            id: port_id,
            role,
            side,
            field,
        });
    }
    ports
}

fn edge_sides(
    edge: &RelationshipEdge,
    source: &PlacedLayoutNode,
    target: &PlacedLayoutNode,
    placement: PortPlacement,
) -> (Side, Side) {
    match placement {
        PortPlacement::FreePorts => {
            let classify = |node: &PlacedLayoutNode, port_id: String, fallback: Side| {
                node.ports
                    .iter()
                    .find(|p| p.id == port_id)
                    .map(|p| classify_port_side(p.x, p.y, node.width, node.height))
                    .unwrap_or(fallback)
            };
            let (fs, ft) = docking_sides(source, target, DockingStrategy::Horizontal);
            (
                classify(source, source_port_id(&edge.id), fs),
                classify(target, target_port_id(&edge.id), ft),
            )
        }
        PortPlacement::Docked(strategy) => docking_sides(source, target, strategy),
    }
}

/// Classifies a port's side from its coordinates relative to the node's
/// top-left corner. Left/right are checked first; a port nowhere near the
/// boundary (engine misbehavior) snaps to the nearest edge.
fn classify_port_side(x: f64, y: f64, width: f64, height: f64) -> Side {
    if x.abs() <= PORT_SIDE_TOLERANCE {
        return Side::Left;
    }
    if (x - width).abs() <= PORT_SIDE_TOLERANCE {
        return Side::Right;
    }
    if y.abs() <= PORT_SIDE_TOLERANCE {
        return Side::Top;
    }
    if (y - height).abs() <= PORT_SIDE_TOLERANCE {
        return Side::Bottom;
    }

    let to_left = x;
    let to_right = width - x;
    let to_top = y;
    let to_bottom = height - y;
    let nearest = to_left.min(to_right).min(to_top).min(to_bottom);
    if nearest == to_left {
        Side::Left
    } else if nearest == to_right {
        Side::Right
    } else if nearest == to_top {
        Side::Top
    } else {
        Side::Bottom
    }
}

fn docking_sides(
    a: &PlacedLayoutNode,
    b: &PlacedLayoutNode,
    strategy: DockingStrategy,
) -> (Side, Side) {
    match strategy {
        DockingStrategy::Horizontal => {
            let ca = a.x + a.width / 2.0;
            let cb = b.x + b.width / 2.0;
            if (ca - cb).abs() < SAME_SIDE_THRESHOLD {
                // Roughly stacked: same-side docking routes the edge around
                // instead of straight through nodes placed between them.
                (Side::Right, Side::Right)
            } else if ca < cb {
                (Side::Right, Side::Left)
            } else {
                (Side::Left, Side::Right)
            }
        }
        DockingStrategy::Vertical => {
            let ca = a.y + a.height / 2.0;
            let cb = b.y + b.height / 2.0;
            if (ca - cb).abs() < SAME_SIDE_THRESHOLD {
                (Side::Bottom, Side::Bottom)
            } else if ca < cb {
                (Side::Bottom, Side::Top)
            } else {
                (Side::Top, Side::Bottom)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_hint_is_strictly_larger_than_render_size() {
        for (p, n) in [(0, 0), (3, 1), (12, 8), (40, 20)] {
            let hint = size_hint_for(p.min(MAX_VISIBLE_PROPERTIES), n.min(MAX_VISIBLE_NAVIGATION));
            let (w, h) = render_size_for(p.min(MAX_VISIBLE_PROPERTIES), n.min(MAX_VISIBLE_NAVIGATION));
            assert!(hint.width > w);
            assert!(hint.height > h);
        }
    }

    #[test]
    fn port_side_classification_uses_tolerance_then_nearest_edge() {
        assert_eq!(classify_port_side(0.0, 50.0, 200.0, 100.0), Side::Left);
        assert_eq!(classify_port_side(1.5, 50.0, 200.0, 100.0), Side::Left);
        assert_eq!(classify_port_side(200.0, 50.0, 200.0, 100.0), Side::Right);
        assert_eq!(classify_port_side(199.0, 50.0, 200.0, 100.0), Side::Right);
        assert_eq!(classify_port_side(100.0, 0.5, 200.0, 100.0), Side::Top);
        assert_eq!(classify_port_side(100.0, 99.0, 200.0, 100.0), Side::Bottom);
        // Interior point snaps to the nearest boundary edge.
        assert_eq!(classify_port_side(10.0, 50.0, 200.0, 100.0), Side::Left);
        assert_eq!(classify_port_side(100.0, 90.0, 200.0, 100.0), Side::Bottom);
    }

    #[test]
    fn stacked_nodes_dock_on_the_same_side() {
        let a = PlacedLayoutNode {
            id: "A".into(),
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 100.0,
            ports: vec![],
        };
        let mut b = a.clone();
        b.id = "B".into();
        b.y = 300.0;
        assert_eq!(
            docking_sides(&a, &b, DockingStrategy::Horizontal),
            (Side::Right, Side::Right)
        );

        b.x = 500.0;
        assert_eq!(
            docking_sides(&a, &b, DockingStrategy::Horizontal),
            (Side::Right, Side::Left)
        );
        assert_eq!(
            docking_sides(&b, &a, DockingStrategy::Horizontal),
            (Side::Left, Side::Right)
        );
    }

    #[test]
    fn vertical_strategy_docks_top_bottom() {
        let a = PlacedLayoutNode {
            id: "A".into(),
            x: 0.0,
            y: 0.0,
            width: 200.0,
            height: 100.0,
            ports: vec![],
        };
        let mut b = a.clone();
        b.id = "B".into();
        b.y = 400.0;
        assert_eq!(
            docking_sides(&a, &b, DockingStrategy::Vertical),
            (Side::Bottom, Side::Top)
        );
        b.y = 10.0;
        assert_eq!(
            docking_sides(&a, &b, DockingStrategy::Vertical),
            (Side::Bottom, Side::Bottom)
        );
    }
}
