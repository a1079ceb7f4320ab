//! Layout-engine boundary.
//!
//! The constraint-based placement algorithm is an external collaborator:
//! it consumes a [`LayoutRequest`] and returns absolute positions plus
//! per-port relative coordinates. Everything variable about placement is
//! its decision; this crate only interprets the result.

use crate::model::{LayoutRequest, LayoutResponse, PlacedLayoutNode, PlacedPort};
use crate::{Error, Result};

pub trait LayoutEngine {
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResponse>;
}

/// Deliberately trivial row-packing stand-in used by tests and the CLI.
///
/// Not a layout algorithm: nodes are packed left-to-right into rows of at
/// most `max_row_width`, and requested ports are spread along each node's
/// right edge. Real engines live behind [`LayoutEngine`].
#[derive(Debug, Clone)]
pub struct RowLayout {
    pub max_row_width: f64,
}

impl Default for RowLayout {
    fn default() -> Self {
        Self {
            max_row_width: 1600.0,
        }
    }
}

impl LayoutEngine for RowLayout {
    fn layout(&self, request: &LayoutRequest) -> Result<LayoutResponse> {
        if self.max_row_width <= 0.0 {
            return Err(Error::LayoutEngine {
                message: format!("non-positive row width: {}", self.max_row_width),
            });
        }

        let node_spacing = request.directives.node_spacing.max(0.0);
        let layer_spacing = request.directives.layer_spacing.max(0.0);

        let mut nodes = Vec::with_capacity(request.nodes.len());
        let mut x = 0.0;
        let mut y = 0.0;
        let mut row_height: f64 = 0.0;

        for spec in &request.nodes {
            if x > 0.0 && x + spec.width > self.max_row_width {
                x = 0.0;
                y += row_height + layer_spacing;
                row_height = 0.0;
            }

            let ports = spread_along_right_edge(&spec.ports, spec.width, spec.height);
            nodes.push(PlacedLayoutNode {
                id: spec.id.clone(),
                x,
                y,
                width: spec.width,
                height: spec.height,
                ports,
            });

            x += spec.width + node_spacing;
            row_height = row_height.max(spec.height);
        }

        Ok(LayoutResponse { nodes })
    }
}

fn spread_along_right_edge(
    ports: &[crate::model::LayoutPortSpec],
    width: f64,
    height: f64,
) -> Vec<PlacedPort> {
    let count = ports.len();
    ports
        .iter()
        .enumerate()
        .map(|(i, p)| PlacedPort {
            id: p.id.clone(),
            x: width,
            y: height * (i + 1) as f64 / (count + 1) as f64,
        })
        .collect()
}
