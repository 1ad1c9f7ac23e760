//! The flow façade: one instance of the diagram editor bound to one mount.
//!
//! [`Flow`] composes the graph store, viewport controller, render cycle, drag
//! controller and connection state machine, and is the only object external
//! collaborators observe. It is cheap to clone — clones share the same
//! instance — which is how the host wires gesture and pointer callbacks back
//! into it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::connection::{
    connection_between, find_candidate, mode_allows, node_handles, Connection,
    ConnectionCallbacks, ConnectionController, ConnectionMode, ConnectionState, Handle,
    HandleKind,
};
use crate::drag::DragController;
use crate::events::{EventHub, FlowEvent, ListenerId};
use crate::geometry::{bounds_of, viewport_for_bounds, XYPosition};
use crate::graph::{DeleteElements, Edge, GraphStore, Node, NodeData, Update};
use crate::render::{node_element_id, render, FlowRenderer};
use crate::selection::SelectionManager;
use crate::viewport::{
    FitViewOptions, PanZoom, PanZoomUpdateConfig, Viewport, ViewportController, ViewportExtent,
};

/// Construction failures. Everything past construction degrades to soft
/// no-ops instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// No renderer was supplied; there is nothing to mount into.
    MissingRenderer,
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRenderer => write!(f, "a mount renderer is required to construct a Flow"),
        }
    }
}

/// Construction configuration.
pub struct FlowOptions {
    /// The mount seam. Mandatory; its absence is the one loud failure.
    pub renderer: Option<Box<dyn FlowRenderer>>,
    /// Optional gesture service; viewport operations resolve `false` until
    /// one is attached.
    pub pan_zoom: Option<Box<dyn PanZoom>>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub viewport: Viewport,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub pan_on_drag: bool,
    pub zoom_on_scroll: bool,
    pub zoom_on_double_click: bool,
    pub nodes_draggable: bool,
    pub nodes_connectable: bool,
    pub elements_selectable: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            renderer: None,
            pan_zoom: None,
            nodes: Vec::new(),
            edges: Vec::new(),
            viewport: Viewport::default(),
            min_zoom: 0.5,
            max_zoom: 2.0,
            pan_on_drag: true,
            zoom_on_scroll: true,
            zoom_on_double_click: true,
            nodes_draggable: true,
            nodes_connectable: true,
            elements_selectable: true,
        }
    }
}

/// Interaction flags fixed at construction.
struct ResolvedOptions {
    nodes_draggable: bool,
    nodes_connectable: bool,
    elements_selectable: bool,
    pan_zoom_config: PanZoomUpdateConfig,
}

/// Mutable configuration consumed by handle-bearing children, plus the host
/// callbacks. Owned exclusively by the façade.
struct FlowState {
    connection_mode: ConnectionMode,
    connection_radius: f32,
    connect_on_click: bool,
    auto_pan_on_connect: bool,
    auto_pan_speed: f32,
    connection_drag_threshold: f32,
    callbacks: ConnectionCallbacks,
}

impl Default for FlowState {
    fn default() -> Self {
        Self {
            connection_mode: ConnectionMode::default(),
            connection_radius: 20.0,
            connect_on_click: false,
            auto_pan_on_connect: true,
            auto_pan_speed: 0.5,
            connection_drag_threshold: 1.0,
            callbacks: ConnectionCallbacks::default(),
        }
    }
}

/// Read-only snapshot of the configuration handed to child elements.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowStateSnapshot {
    pub connection_mode: ConnectionMode,
    pub connection_radius: f32,
    pub connect_on_click: bool,
    pub auto_pan_on_connect: bool,
    pub auto_pan_speed: f32,
    pub connection_drag_threshold: f32,
    pub nodes_draggable: bool,
    pub nodes_connectable: bool,
    pub elements_selectable: bool,
}

/// Serializable snapshot returned by [`Flow::to_object`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub viewport: Viewport,
}

/// One diagram editor instance.
#[derive(Clone)]
pub struct Flow {
    store: Rc<RefCell<GraphStore>>,
    viewport: Rc<RefCell<ViewportController>>,
    renderer: Rc<RefCell<Box<dyn FlowRenderer>>>,
    drag: Rc<RefCell<DragController>>,
    connection: Rc<RefCell<ConnectionController>>,
    selection: Rc<RefCell<SelectionManager>>,
    state: Rc<RefCell<FlowState>>,
    events: EventHub,
    opts: Rc<ResolvedOptions>,
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flow").finish_non_exhaustive()
    }
}

impl Flow {
    pub fn new(options: FlowOptions) -> Result<Self, FlowError> {
        let renderer = options.renderer.ok_or(FlowError::MissingRenderer)?;

        let pan_zoom_config = PanZoomUpdateConfig {
            min_zoom: options.min_zoom,
            max_zoom: options.max_zoom,
            pan_on_drag: options.pan_on_drag,
            zoom_on_scroll: options.zoom_on_scroll,
            zoom_on_double_click: options.zoom_on_double_click,
            ..PanZoomUpdateConfig::default()
        };
        let mut viewport = ViewportController::new(options.viewport, options.min_zoom, options.max_zoom);
        if let Some(service) = options.pan_zoom {
            viewport.attach(service, &pan_zoom_config);
        }

        let flow = Self {
            store: Rc::new(RefCell::new(GraphStore::new(options.nodes, options.edges))),
            viewport: Rc::new(RefCell::new(viewport)),
            renderer: Rc::new(RefCell::new(renderer)),
            drag: Rc::new(RefCell::new(DragController::new())),
            connection: Rc::new(RefCell::new(ConnectionController::new())),
            selection: Rc::new(RefCell::new(SelectionManager::new())),
            state: Rc::new(RefCell::new(FlowState::default())),
            events: EventHub::new(),
            opts: Rc::new(ResolvedOptions {
                nodes_draggable: options.nodes_draggable,
                nodes_connectable: options.nodes_connectable,
                elements_selectable: options.elements_selectable,
                pan_zoom_config,
            }),
        };

        flow.apply_transform(options.viewport);
        flow.refresh();
        Ok(flow)
    }

    // === Graph store ===

    pub fn set_nodes(&self, update: impl Into<Update<Node>>) {
        self.store.borrow_mut().set_nodes(update);
        self.refresh();
    }

    /// Defensive copy of the node collection; mutating it cannot affect
    /// internal state.
    pub fn get_nodes(&self) -> Vec<Node> {
        self.store.borrow().nodes().to_vec()
    }

    pub fn set_edges(&self, update: impl Into<Update<Edge>>) {
        self.store.borrow_mut().set_edges(update);
        self.refresh();
    }

    pub fn get_edges(&self) -> Vec<Edge> {
        self.store.borrow().edges().to_vec()
    }

    pub fn add_nodes(&self, nodes: Vec<Node>) {
        self.store.borrow_mut().add_nodes(nodes);
        self.refresh();
    }

    pub fn add_edges(&self, edges: Vec<Edge>) {
        self.store.borrow_mut().add_edges(edges);
        self.refresh();
    }

    pub fn delete_elements(&self, params: DeleteElements) {
        self.store.borrow_mut().delete_elements(params);
        self.refresh();
    }

    /// Shallow-merge `data` into the node's payload; a no-op returning
    /// `false` for an unknown identifier.
    pub fn update_node_data(&self, id: &str, data: NodeData) -> bool {
        let updated = self.store.borrow_mut().update_node_data(id, data);
        if updated {
            self.refresh();
        }
        updated
    }

    // === Viewport ===

    pub fn get_viewport(&self) -> Viewport {
        self.viewport.borrow().viewport()
    }

    pub fn get_zoom(&self) -> f32 {
        self.get_viewport().zoom
    }

    pub fn get_min_zoom(&self) -> f32 {
        self.viewport.borrow().min_zoom()
    }

    pub fn get_max_zoom(&self) -> f32 {
        self.viewport.borrow().max_zoom()
    }

    /// Request a constrained transition to `viewport`. Resolves `false`
    /// before a pan/zoom service is attached.
    pub fn set_viewport(&self, viewport: Viewport) -> bool {
        let bounds = self.screen_bounds();
        let committed = self.viewport.borrow_mut().request_viewport(viewport, bounds);
        match committed {
            Some(v) => {
                self.apply_transform(v);
                true
            }
            None => false,
        }
    }

    /// Frame all nodes in the container. Fails fast (soft `false`) with zero
    /// nodes.
    pub fn fit_view(&self, options: FitViewOptions) -> bool {
        let rects: Vec<_> = self.store.borrow().nodes().iter().map(Node::rect).collect();
        let Some(bounds) = bounds_of(rects) else {
            return false;
        };
        let (width, height) = self.renderer.borrow().container_size();
        let (min_zoom, max_zoom) = {
            let ctrl = self.viewport.borrow();
            (
                options.min_zoom.unwrap_or_else(|| ctrl.min_zoom()),
                options.max_zoom.unwrap_or_else(|| ctrl.max_zoom()),
            )
        };
        let target = viewport_for_bounds(bounds, width, height, min_zoom, max_zoom, options.padding);
        self.set_viewport(target)
    }

    /// Center the logical point `(x, y)` in the container, at the current
    /// zoom or an explicit override.
    pub fn set_center(&self, x: f32, y: f32, zoom: Option<f32>) -> bool {
        let zoom = {
            let ctrl = self.viewport.borrow();
            zoom.map_or(ctrl.viewport().zoom, |z| ctrl.clamp_zoom(z))
        };
        let (width, height) = self.renderer.borrow().container_size();
        self.set_viewport(Viewport {
            x: width / 2.0 - x * zoom,
            y: height / 2.0 - y * zoom,
            zoom,
        })
    }

    pub fn zoom_in(&self) -> bool {
        let committed = self.viewport.borrow_mut().zoom_in();
        self.commit_if_some(committed)
    }

    pub fn zoom_out(&self) -> bool {
        let committed = self.viewport.borrow_mut().zoom_out();
        self.commit_if_some(committed)
    }

    pub fn zoom_to(&self, level: f32) -> bool {
        let committed = self.viewport.borrow_mut().request_zoom(level);
        self.commit_if_some(committed)
    }

    /// The apply-transform funnel. Every transform change — gesture,
    /// programmatic call, or pan/zoom service callback — passes through here:
    /// the viewport value is stored, the visual transform re-applied, and the
    /// viewport-changed notification emitted, in that order.
    pub fn apply_transform(&self, viewport: Viewport) {
        self.viewport.borrow_mut().commit(viewport);
        self.renderer.borrow_mut().apply_viewport_transform(&viewport);
        self.events.emit(&FlowEvent::ViewportChanged(viewport));
    }

    /// Attach the gesture service after construction. The host is expected to
    /// wire the service's transform-change callback to
    /// [`apply_transform`](Self::apply_transform).
    pub fn attach_pan_zoom(&self, service: Box<dyn PanZoom>) {
        self.viewport.borrow_mut().attach(service, &self.opts.pan_zoom_config);
    }

    // === Dragging ===

    /// Enter the node-drag state. Refused when dragging is disabled for the
    /// engine or for this node, or when the node is unknown.
    pub fn begin_drag(&self, node_id: &str, screen: XYPosition) -> bool {
        if !self.opts.nodes_draggable {
            return false;
        }
        let position = {
            let store = self.store.borrow();
            let Some(node) = store.node(node_id) else {
                return false;
            };
            if !node.draggable {
                return false;
            }
            node.position
        };
        self.drag.borrow_mut().begin(node_id, screen, position)
    }

    /// Drag fast path: write the new plane position straight onto the node
    /// and the backend, bypassing the full render cycle.
    pub fn update_drag(&self, screen: XYPosition) -> bool {
        let zoom = self.viewport.borrow().viewport().zoom;
        let Some((id, position)) = self.drag.borrow_mut().update(screen, zoom) else {
            return false;
        };
        self.store.borrow_mut().write_node_position(&id, position);
        self.renderer
            .borrow_mut()
            .move_node(&node_element_id(&id), position.x, position.y);
        true
    }

    pub fn end_drag(&self) -> bool {
        self.drag.borrow_mut().end()
    }

    pub fn dragged_node(&self) -> Option<String> {
        self.drag.borrow().dragged_node().map(String::from)
    }

    // === Connections ===

    /// The derived handle of a node, positioned from the lookup index.
    pub fn handle(&self, node_id: &str, kind: HandleKind) -> Option<Handle> {
        let store = self.store.borrow();
        let entry = store.lookup().get(node_id)?;
        let [source, target] = node_handles(entry);
        Some(match kind {
            HandleKind::Source => source,
            HandleKind::Target => target,
        })
    }

    /// Pointer-down on a handle: enter the connecting state.
    pub fn begin_connection(&self, node_id: &str, kind: HandleKind) -> bool {
        if !self.opts.nodes_connectable {
            return false;
        }
        let Some(from) = self.handle(node_id, kind) else {
            return false;
        };
        let started = self.connection.borrow_mut().begin(from.clone());
        if started {
            debug!("connection started from {}", from.node_id);
            self.events.emit(&FlowEvent::ConnectionChanged);
            let cb = self.state.borrow().callbacks.on_connect_start.clone();
            if let Some(cb) = cb {
                cb(&from);
            }
        }
        started
    }

    /// Pointer moved while connecting: re-evaluate the candidate handle
    /// within the connection radius. Returns whether the pending state
    /// changed.
    pub fn update_connection_position(&self, screen: XYPosition) -> bool {
        let Some(from) = self.connection.borrow().snapshot().from_handle else {
            return false;
        };
        let pointer = {
            let viewport = self.viewport.borrow().viewport();
            let (x, y) = viewport.screen_to_plane(screen.x, screen.y);
            XYPosition::new(x, y)
        };
        let (mode, radius, validator) = {
            let state = self.state.borrow();
            (
                state.connection_mode,
                state.connection_radius,
                state.callbacks.is_valid_connection.clone(),
            )
        };
        let candidate = {
            let store = self.store.borrow();
            find_candidate(pointer, &from, store.lookup(), mode, radius)
        };
        let (to_handle, is_valid) = match candidate {
            Some(handle) => {
                let connection = connection_between(&from, &handle);
                let verdict = validator.map_or(true, |check| check(&connection));
                (Some(handle), verdict)
            }
            None => (None, false),
        };
        let changed = self.connection.borrow_mut().set_target(to_handle, is_valid);
        if changed {
            self.events.emit(&FlowEvent::ConnectionChanged);
        }
        changed
    }

    /// Pointer released: complete the attempt. `on_connect` fires only over a
    /// valid candidate; `on_connect_end` fires either way. The engine never
    /// appends the connection to the edge collection itself.
    pub fn end_connection(&self) -> Option<Connection> {
        let (connection, was_in_progress) = self.connection.borrow_mut().finish();
        if !was_in_progress {
            return None;
        }
        self.events.emit(&FlowEvent::ConnectionChanged);
        let (on_connect, on_connect_end) = {
            let state = self.state.borrow();
            (
                state.callbacks.on_connect.clone(),
                state.callbacks.on_connect_end.clone(),
            )
        };
        if let Some(conn) = &connection {
            debug!("connection completed: {} -> {}", conn.source, conn.target);
            if let Some(cb) = on_connect {
                cb(conn);
            }
        }
        if let Some(cb) = on_connect_end {
            cb();
        }
        connection
    }

    /// Programmatic abort of an in-progress attempt.
    pub fn cancel_connection(&self) {
        let was_in_progress = self.connection.borrow_mut().cancel();
        if !was_in_progress {
            return;
        }
        self.events.emit(&FlowEvent::ConnectionChanged);
        let cb = self.state.borrow().callbacks.on_connect_end.clone();
        if let Some(cb) = cb {
            cb();
        }
    }

    /// Click-to-connect, gated by `connect_on_click`: the first click
    /// remembers the origin handle, a second click on another handle attempts
    /// the connection, re-clicking the origin cancels.
    pub fn click_handle(&self, node_id: &str, kind: HandleKind) -> Option<Connection> {
        let (connect_on_click, mode) = {
            let state = self.state.borrow();
            (state.connect_on_click, state.connection_mode)
        };
        if !connect_on_click || !self.opts.nodes_connectable {
            return None;
        }
        let handle = self.handle(node_id, kind)?;

        let origin = self.connection.borrow().click_start_handle();
        match origin {
            None => {
                let started = self.connection.borrow_mut().begin_click(handle.clone());
                if started {
                    self.events.emit(&FlowEvent::ConnectionChanged);
                    let cb = self.state.borrow().callbacks.on_connect_start.clone();
                    if let Some(cb) = cb {
                        cb(&handle);
                    }
                }
                None
            }
            Some(origin) if origin.is_same_as(&handle) => {
                self.cancel_connection();
                None
            }
            Some(origin) => {
                let validator = self.state.borrow().callbacks.is_valid_connection.clone();
                let is_valid = mode_allows(mode, &origin, &handle) && {
                    let connection = connection_between(&origin, &handle);
                    validator.map_or(true, |check| check(&connection))
                };
                let changed = self.connection.borrow_mut().set_target(Some(handle), is_valid);
                if changed {
                    self.events.emit(&FlowEvent::ConnectionChanged);
                }
                self.end_connection()
            }
        }
    }

    /// Snapshot of the ephemeral connection state.
    pub fn connection(&self) -> ConnectionState {
        self.connection.borrow().snapshot()
    }

    // === Flow state and callbacks ===

    /// Read-only snapshot of the configuration consumed by child elements.
    pub fn state(&self) -> FlowStateSnapshot {
        let state = self.state.borrow();
        FlowStateSnapshot {
            connection_mode: state.connection_mode,
            connection_radius: state.connection_radius,
            connect_on_click: state.connect_on_click,
            auto_pan_on_connect: state.auto_pan_on_connect,
            auto_pan_speed: state.auto_pan_speed,
            connection_drag_threshold: state.connection_drag_threshold,
            nodes_draggable: self.opts.nodes_draggable,
            nodes_connectable: self.opts.nodes_connectable,
            elements_selectable: self.opts.elements_selectable,
        }
    }

    /// All flow-state writes funnel through here so children always learn
    /// about configuration changes.
    fn set_state(&self, mutate: impl FnOnce(&mut FlowState)) {
        mutate(&mut self.state.borrow_mut());
        self.events.emit(&FlowEvent::ConnectionChanged);
    }

    pub fn set_connection_mode(&self, mode: ConnectionMode) {
        self.set_state(|s| s.connection_mode = mode);
    }

    pub fn set_connection_radius(&self, radius: f32) {
        self.set_state(|s| s.connection_radius = radius);
    }

    pub fn set_connect_on_click(&self, enabled: bool) {
        self.set_state(|s| s.connect_on_click = enabled);
    }

    pub fn on_connect(&self, callback: impl Fn(&Connection) + 'static) {
        self.set_state(|s| s.callbacks.on_connect = Some(Rc::new(callback)));
    }

    pub fn on_connect_start(&self, callback: impl Fn(&Handle) + 'static) {
        self.set_state(|s| s.callbacks.on_connect_start = Some(Rc::new(callback)));
    }

    pub fn on_connect_end(&self, callback: impl Fn() + 'static) {
        self.set_state(|s| s.callbacks.on_connect_end = Some(Rc::new(callback)));
    }

    pub fn is_valid_connection(&self, callback: impl Fn(&Connection) -> bool + 'static) {
        self.set_state(|s| s.callbacks.is_valid_connection = Some(Rc::new(callback)));
    }

    // === Selection ===

    /// Click on an element; a modifier click toggles. Gated by
    /// `elements_selectable`.
    pub fn select_element(&self, id: &str, toggle: bool) -> bool {
        if !self.opts.elements_selectable {
            return false;
        }
        self.selection.borrow_mut().handle_interaction(id, toggle);
        self.apply_selection();
        true
    }

    /// Replace the selection wholesale.
    pub fn set_selected<I, S>(&self, ids: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.opts.elements_selectable {
            return false;
        }
        self.selection.borrow_mut().replace_selection(ids);
        self.apply_selection();
        true
    }

    pub fn clear_selection(&self) {
        self.selection.borrow_mut().clear();
        self.apply_selection();
    }

    pub fn selected_ids(&self) -> Vec<String> {
        self.selection.borrow().iter().map(String::from).collect()
    }

    fn apply_selection(&self) {
        let ids: std::collections::HashSet<String> =
            self.selection.borrow().iter().map(String::from).collect();
        {
            let mut store = self.store.borrow_mut();
            let node_ids = ids.clone();
            store.set_nodes(Update::with(move |nodes: &[Node]| {
                nodes
                    .iter()
                    .cloned()
                    .map(|mut n| {
                        n.selected = node_ids.contains(&n.id);
                        n
                    })
                    .collect()
            }));
            store.set_edges(Update::with(move |edges: &[Edge]| {
                edges
                    .iter()
                    .cloned()
                    .map(|mut e| {
                        e.selected = ids.contains(&e.id);
                        e
                    })
                    .collect()
            }));
        }
        self.refresh();
    }

    // === Events, snapshot, teardown ===

    pub fn add_listener(&self, listener: impl Fn(&FlowEvent) + 'static) -> ListenerId {
        self.events.add_listener(listener)
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.events.remove_listener(id);
    }

    /// Serializable snapshot of nodes, edges and viewport.
    pub fn to_object(&self) -> FlowSnapshot {
        FlowSnapshot {
            nodes: self.get_nodes(),
            edges: self.get_edges(),
            viewport: self.get_viewport(),
        }
    }

    /// Release the pan/zoom service and detach the visual tree.
    pub fn destroy(&self) {
        self.viewport.borrow_mut().destroy();
        let mut renderer = self.renderer.borrow_mut();
        renderer.clear();
        renderer.finish();
    }

    fn screen_bounds(&self) -> ViewportExtent {
        let (width, height) = self.renderer.borrow().container_size();
        [[0.0, 0.0], [width, height]]
    }

    fn commit_if_some(&self, committed: Option<Viewport>) -> bool {
        match committed {
            Some(v) => {
                self.apply_transform(v);
                true
            }
            None => false,
        }
    }

    fn refresh(&self) {
        let store = self.store.borrow();
        let mut renderer = self.renderer.borrow_mut();
        render(&store, &mut **renderer);
    }
}
