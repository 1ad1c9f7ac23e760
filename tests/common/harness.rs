//! Test harness wiring a [`Flow`] to recording mock backends.
//!
//! Mirrors how a host embeds the engine: a renderer backend for the visual
//! tree, a pan/zoom service for gestures, and callback tracking.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use node_flow::{
    Edge, EdgeVisual, Flow, FlowOptions, FlowRenderer, Node, NodeVisual, PanZoom,
    PanZoomUpdateConfig, Viewport, ViewportExtent,
};

use super::CallbackTracker;

/// Everything the recording renderer observed.
#[derive(Default)]
pub struct RenderLog {
    pub clears: usize,
    pub finishes: usize,
    pub nodes: Vec<NodeVisual>,
    pub edges: Vec<EdgeVisual>,
    pub moves: Vec<(String, f32, f32)>,
    pub transforms: Vec<Viewport>,
}

impl RenderLog {
    pub fn node(&self, element_id: &str) -> Option<&NodeVisual> {
        self.nodes.iter().find(|n| n.element_id == element_id)
    }

    pub fn edge(&self, element_id: &str) -> Option<&EdgeVisual> {
        self.edges.iter().find(|e| e.element_id == element_id)
    }
}

/// Renderer backend that records draw calls instead of drawing.
pub struct RecordingRenderer {
    size: (f32, f32),
    log: Rc<RefCell<RenderLog>>,
}

impl RecordingRenderer {
    pub fn new(width: f32, height: f32) -> (Self, Rc<RefCell<RenderLog>>) {
        let log = Rc::new(RefCell::new(RenderLog::default()));
        (Self { size: (width, height), log: log.clone() }, log)
    }
}

impl FlowRenderer for RecordingRenderer {
    fn container_size(&self) -> (f32, f32) {
        self.size
    }

    fn apply_viewport_transform(&mut self, viewport: &Viewport) {
        self.log.borrow_mut().transforms.push(*viewport);
    }

    fn clear(&mut self) {
        let mut log = self.log.borrow_mut();
        log.clears += 1;
        log.nodes.clear();
        log.edges.clear();
    }

    fn draw_edge(&mut self, edge: &EdgeVisual) {
        self.log.borrow_mut().edges.push(edge.clone());
    }

    fn draw_node(&mut self, node: &NodeVisual) {
        self.log.borrow_mut().nodes.push(node.clone());
    }

    fn move_node(&mut self, element_id: &str, x: f32, y: f32) {
        let mut log = self.log.borrow_mut();
        log.moves.push((element_id.to_string(), x, y));
        if let Some(node) = log.nodes.iter_mut().find(|n| n.element_id == element_id) {
            node.x = x;
            node.y = y;
        }
    }

    fn finish(&mut self) {
        self.log.borrow_mut().finishes += 1;
    }
}

/// Everything the pan/zoom stub observed.
#[derive(Default)]
pub struct PanZoomLog {
    pub updates: Vec<PanZoomUpdateConfig>,
    pub constrained: Vec<(Viewport, ViewportExtent)>,
    pub scaled: Vec<f32>,
    pub destroyed: bool,
}

/// Pan/zoom service stub that accepts every transition.
pub struct TestPanZoom {
    log: Rc<RefCell<PanZoomLog>>,
}

impl TestPanZoom {
    pub fn new() -> (Self, Rc<RefCell<PanZoomLog>>) {
        let log = Rc::new(RefCell::new(PanZoomLog::default()));
        (Self { log: log.clone() }, log)
    }
}

impl PanZoom for TestPanZoom {
    fn update(&mut self, config: &PanZoomUpdateConfig) {
        self.log.borrow_mut().updates.push(config.clone());
    }

    fn set_viewport_constrained(
        &mut self,
        viewport: Viewport,
        bounds: ViewportExtent,
        _extent: ViewportExtent,
    ) -> bool {
        self.log.borrow_mut().constrained.push((viewport, bounds));
        true
    }

    fn scale_to(&mut self, zoom: f32) -> bool {
        self.log.borrow_mut().scaled.push(zoom);
        true
    }

    fn destroy(&mut self) {
        self.log.borrow_mut().destroyed = true;
    }
}

/// A flow instance with recording backends and callback tracking.
pub struct FlowTestHarness {
    pub flow: Flow,
    pub render_log: Rc<RefCell<RenderLog>>,
    pub pan_zoom_log: Rc<RefCell<PanZoomLog>>,
    pub tracker: CallbackTracker,
}

impl FlowTestHarness {
    /// Harness with the default fixture: two nodes and one edge in an
    /// 800x600 container.
    pub fn new() -> Self {
        Self::with_nodes_and_edges(
            vec![
                Node::new("a", 100.0, 100.0).with_label("Node A"),
                Node::new("b", 400.0, 200.0).with_label("Node B"),
            ],
            vec![Edge::new("e1", "a", "b")],
        )
    }

    pub fn with_nodes_and_edges(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self::build(nodes, edges, true, FlowOptions::default)
    }

    /// Harness without a pan/zoom service, for testing the unattached soft
    /// no-op paths.
    pub fn without_pan_zoom() -> Self {
        Self::build(vec![], vec![], false, FlowOptions::default)
    }

    /// Harness with custom options; `renderer` and `pan_zoom` are overridden.
    pub fn with_options(options: impl Fn() -> FlowOptions) -> Self {
        Self::build(vec![], vec![], true, options)
    }

    fn build(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        attach_pan_zoom: bool,
        options: impl Fn() -> FlowOptions,
    ) -> Self {
        let (renderer, render_log) = RecordingRenderer::new(800.0, 600.0);
        let (pan_zoom, pan_zoom_log) = TestPanZoom::new();

        let mut opts = options();
        opts.renderer = Some(Box::new(renderer));
        opts.pan_zoom = attach_pan_zoom.then(|| Box::new(pan_zoom) as Box<dyn PanZoom>);
        if opts.nodes.is_empty() {
            opts.nodes = nodes;
        }
        if opts.edges.is_empty() {
            opts.edges = edges;
        }

        let flow = Flow::new(opts).expect("harness always supplies a renderer");
        let tracker = CallbackTracker::new();
        tracker.install(&flow);

        Self { flow, render_log, pan_zoom_log, tracker }
    }
}
