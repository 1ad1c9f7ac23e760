//! The render cycle and the renderer seam.
//!
//! Rendering follows a full-rebuild strategy: every graph mutation discards
//! the visual tree and rebuilds it from current store state. Diagrams change
//! at human interaction speed, so the throwaway-and-recreate overhead stays
//! bounded; continuous node dragging bypasses the cycle through
//! [`FlowRenderer::move_node`].
//!
//! A backend only needs to place boxes, draw path commands, and apply a
//! translate+scale to the viewport layer. [`ModelRenderer`] is the built-in
//! backend that mirrors visuals into slint models for direct UI binding.

use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use slint::{Color, Model, SharedString, VecModel};

use crate::graph::{Edge, EdgeKind, GraphStore, LookupNode, Node};
use crate::path::{bezier_path, step_path, straight_path, EdgePath, DEFAULT_BEZIER_OFFSET};
use crate::viewport::Viewport;

/// Stable element identifier for a node, usable for later lookup/removal.
pub fn node_element_id(id: &str) -> String {
    format!("flow-node-{}", id)
}

/// Stable element identifier for an edge.
pub fn edge_element_id(id: &str) -> String {
    format!("flow-edge-{}", id)
}

fn edge_stroke(selected: bool) -> Color {
    if selected {
        Color::from_rgb_u8(255, 0, 114)
    } else {
        Color::from_rgb_u8(177, 177, 183)
    }
}

/// Visual description of one node box.
#[derive(Clone, Debug)]
pub struct NodeVisual {
    pub element_id: String,
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label: String,
    pub class_name: String,
    pub selected: bool,
    pub z_index: i32,
}

/// Visual description of one connector.
#[derive(Clone, Debug)]
pub struct EdgeVisual {
    pub element_id: String,
    pub id: String,
    pub path: EdgePath,
    pub stroke: Color,
    pub stroke_width: f32,
    pub selected: bool,
    /// Requests a continuously repeating dash-offset animation.
    pub animated: bool,
}

/// The rendering backend seam.
///
/// Methods are invoked synchronously from the render cycle and the drag fast
/// path; implementations must not call back into the engine.
pub trait FlowRenderer {
    /// Size of the mount container in screen pixels.
    fn container_size(&self) -> (f32, f32);

    /// Apply the committed viewport transform to the viewport layer.
    fn apply_viewport_transform(&mut self, viewport: &Viewport);

    /// Discard the current visual tree.
    fn clear(&mut self);

    fn draw_edge(&mut self, edge: &EdgeVisual);

    fn draw_node(&mut self, node: &NodeVisual);

    /// Fast-path position update for a single node during a drag, bypassing
    /// the full rebuild.
    fn move_node(&mut self, element_id: &str, x: f32, y: f32);

    /// Called once after all draw calls of a rebuild.
    fn finish(&mut self) {}
}

/// Build the visual for one node.
pub fn build_node_visual(node: &Node) -> NodeVisual {
    let rect = node.rect();
    NodeVisual {
        element_id: node_element_id(&node.id),
        id: node.id.clone(),
        x: rect.x,
        y: rect.y,
        width: rect.width,
        height: rect.height,
        label: node.label().to_string(),
        class_name: node.class_name.clone().unwrap_or_default(),
        selected: node.selected,
        z_index: node.z_index,
    }
}

/// Build the visual for one edge, resolving both endpoints to node centers.
///
/// An edge referencing a missing node degrades to an empty path instead of
/// being skipped, so the identifier-to-visual mapping stays stable.
pub fn build_edge_visual(edge: &Edge, lookup: &HashMap<String, LookupNode>) -> EdgeVisual {
    let endpoints = lookup
        .get(&edge.source)
        .zip(lookup.get(&edge.target))
        .map(|(s, t)| (s.rect().center(), t.rect().center()));

    let path = match endpoints {
        Some((s, t)) => match edge.kind {
            EdgeKind::Straight => straight_path(s.x, s.y, t.x, t.y),
            EdgeKind::Bezier => bezier_path(s.x, s.y, t.x, t.y, 1.0, DEFAULT_BEZIER_OFFSET),
            EdgeKind::Step => step_path(s.x, s.y, t.x, t.y),
        },
        None => {
            warn!("edge {} references a missing node, rendering empty path", edge.id);
            EdgePath::empty()
        }
    };

    EdgeVisual {
        element_id: edge_element_id(&edge.id),
        id: edge.id.clone(),
        path,
        stroke: edge_stroke(edge.selected),
        stroke_width: 2.0,
        selected: edge.selected,
        animated: edge.animated,
    }
}

/// Run one full rebuild against the given backend: clear, then edges (they
/// sit under the nodes), then nodes.
pub fn render(store: &GraphStore, renderer: &mut dyn FlowRenderer) {
    renderer.clear();
    for edge in store.edges() {
        renderer.draw_edge(&build_edge_visual(edge, store.lookup()));
    }
    for node in store.nodes() {
        renderer.draw_node(&build_node_visual(node));
    }
    renderer.finish();
}

/// One node row in the slint binding model.
#[derive(Clone, Debug, Default)]
pub struct NodeVisualRow {
    pub element_id: SharedString,
    pub label: SharedString,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub selected: bool,
    pub z_index: i32,
}

/// One edge row in the slint binding model.
#[derive(Clone, Debug)]
pub struct EdgeVisualRow {
    pub element_id: SharedString,
    pub commands: SharedString,
    pub stroke: Color,
    pub stroke_width: f32,
    pub selected: bool,
    pub animated: bool,
}

/// Backend that mirrors the visual tree into slint `VecModel`s.
///
/// Draw calls are buffered per rebuild and written into the models in
/// `finish`, updating rows in place where possible so the UI only re-renders
/// what changed.
pub struct ModelRenderer {
    width: f32,
    height: f32,
    transform: Viewport,
    nodes: Rc<VecModel<NodeVisualRow>>,
    edges: Rc<VecModel<EdgeVisualRow>>,
    pending_nodes: Vec<NodeVisualRow>,
    pending_edges: Vec<EdgeVisualRow>,
}

impl ModelRenderer {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            transform: Viewport::default(),
            nodes: Rc::new(VecModel::default()),
            edges: Rc::new(VecModel::default()),
            pending_nodes: Vec::new(),
            pending_edges: Vec::new(),
        }
    }

    /// The node model to bind in the UI.
    pub fn node_model(&self) -> Rc<VecModel<NodeVisualRow>> {
        self.nodes.clone()
    }

    /// The edge model to bind in the UI.
    pub fn edge_model(&self) -> Rc<VecModel<EdgeVisualRow>> {
        self.edges.clone()
    }

    /// The last transform applied to the viewport layer.
    pub fn transform(&self) -> Viewport {
        self.transform
    }
}

impl FlowRenderer for ModelRenderer {
    fn container_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn apply_viewport_transform(&mut self, viewport: &Viewport) {
        self.transform = *viewport;
    }

    fn clear(&mut self) {
        self.pending_nodes.clear();
        self.pending_edges.clear();
    }

    fn draw_edge(&mut self, edge: &EdgeVisual) {
        self.pending_edges.push(EdgeVisualRow {
            element_id: SharedString::from(edge.element_id.as_str()),
            commands: SharedString::from(edge.path.commands.as_str()),
            stroke: edge.stroke,
            stroke_width: edge.stroke_width,
            selected: edge.selected,
            animated: edge.animated,
        });
    }

    fn draw_node(&mut self, node: &NodeVisual) {
        self.pending_nodes.push(NodeVisualRow {
            element_id: SharedString::from(node.element_id.as_str()),
            label: SharedString::from(node.label.as_str()),
            x: node.x,
            y: node.y,
            width: node.width,
            height: node.height,
            selected: node.selected,
            z_index: node.z_index,
        });
    }

    fn move_node(&mut self, element_id: &str, x: f32, y: f32) {
        for i in 0..self.nodes.row_count() {
            if let Some(mut row) = self.nodes.row_data(i) {
                if row.element_id == element_id {
                    row.x = x;
                    row.y = y;
                    self.nodes.set_row_data(i, row);
                    return;
                }
            }
        }
    }

    fn finish(&mut self) {
        let node_count = self.pending_nodes.len();
        for (i, row) in self.pending_nodes.drain(..).enumerate() {
            if i < self.nodes.row_count() {
                self.nodes.set_row_data(i, row);
            } else {
                self.nodes.push(row);
            }
        }
        while self.nodes.row_count() > node_count {
            self.nodes.remove(self.nodes.row_count() - 1);
        }

        let edge_count = self.pending_edges.len();
        for (i, row) in self.pending_edges.drain(..).enumerate() {
            if i < self.edges.row_count() {
                self.edges.set_row_data(i, row);
            } else {
                self.edges.push(row);
            }
        }
        while self.edges.row_count() > edge_count {
            self.edges.remove(self.edges.row_count() - 1);
        }
    }
}
