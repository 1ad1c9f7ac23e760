//! # node-flow
//!
//! A renderer-agnostic interaction engine for building node-and-edge flow
//! diagram editors: nodes positioned in a 2-D plane, edges connecting them, a
//! pannable/zoomable viewport, drag-to-move nodes, and a pluggable
//! connection-creation state machine.
//!
//! ## Features
//!
//! - **Backend-Agnostic Rendering** - Any backend that can place boxes, draw
//!   path commands and transform a layer plugs in via the [`FlowRenderer`]
//!   trait; [`ModelRenderer`] ships as a slint-model binding backend
//! - **External Gesture Recognition** - Wheel/pinch/drag-to-pan stays in the
//!   host's [`PanZoom`] service; every transform funnels through one
//!   apply-transform step
//! - **Full-Rebuild Render Cycle** - Simple and bounded; continuous drags use
//!   a direct-write fast path
//! - **Pluggable Connection Validation** - Loose/strict handle compatibility
//!   plus a host `is_valid_connection` callback
//!
//! ## Quick Start
//!
//! ```
//! use node_flow::{Flow, FlowOptions, ModelRenderer, Node, Edge};
//!
//! let flow = Flow::new(FlowOptions {
//!     renderer: Some(Box::new(ModelRenderer::new(800.0, 600.0))),
//!     nodes: vec![
//!         Node::new("a", 100.0, 100.0).with_label("Input"),
//!         Node::new("b", 400.0, 200.0).with_label("Output"),
//!     ],
//!     edges: vec![Edge::new("a-b", "a", "b")],
//!     ..FlowOptions::default()
//! }).unwrap();
//!
//! flow.fit_view(Default::default());
//! ```
//!
//! ## Core Components
//!
//! - [`Flow`] - The façade composing store, viewport, rendering, dragging and
//!   connections; clone it to share one instance across callbacks
//! - [`GraphStore`] semantics via [`Flow::set_nodes`] / [`Flow::set_edges`] -
//!   replacement or functional updates
//! - [`ConnectionController`] - The connection state machine driven through
//!   the façade's pointer entry points
//! - [`BackgroundGrid`] - A viewport-driven presentational shell
//!
//! Hosts observe committed changes through [`Flow::add_listener`] rather than
//! polling.

pub mod connection;
pub mod drag;
pub mod events;
pub mod flow;
pub mod geometry;
pub mod graph;
pub mod grid;
pub mod observable;
pub mod path;
pub mod render;
pub mod selection;
pub mod viewport;

pub use connection::{
    Connection, ConnectionCallbacks, ConnectionController, ConnectionMode, ConnectionState,
    Handle, HandleKind,
};
pub use drag::DragController;
pub use events::{EventHub, FlowEvent, ListenerId};
pub use flow::{Flow, FlowError, FlowOptions, FlowSnapshot, FlowStateSnapshot};
pub use geometry::{bounds_of, viewport_for_bounds, Rect, XYPosition};
pub use graph::{
    add_connection, DeleteElements, Edge, EdgeKind, GraphStore, LookupNode, Node, NodeData,
    Update, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH,
};
pub use grid::{grid_commands, BackgroundGrid};
pub use observable::Observable;
pub use path::{bezier_path, step_path, straight_path, EdgePath};
pub use render::{
    build_edge_visual, build_node_visual, edge_element_id, node_element_id, EdgeVisual,
    EdgeVisualRow, FlowRenderer, ModelRenderer, NodeVisual, NodeVisualRow,
};
pub use selection::SelectionManager;
pub use viewport::{
    FitViewOptions, PanZoom, PanZoomUpdateConfig, Viewport, ViewportController, ViewportExtent,
    INFINITE_EXTENT,
};
