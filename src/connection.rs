//! Handle-to-handle connection creation.
//!
//! Tracks an in-progress connection attempt from pointer-down (or click, in
//! click-to-connect mode) on an origin handle until release. Candidate
//! handles near the pointer are validated continuously for visual feedback;
//! nothing is committed until release over a valid candidate, and even then
//! the engine only reports the [`Connection`] — appending it to the edge
//! collection is the host's job (see [`crate::graph::add_connection`]).

use std::collections::HashMap;
use std::rc::Rc;

use crate::geometry::XYPosition;
use crate::graph::LookupNode;

/// Whether a handle originates connections or receives them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleKind {
    Source,
    Target,
}

/// A connection point on a node, with its plane-space position resolved from
/// the node lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct Handle {
    pub node_id: String,
    pub handle_id: Option<String>,
    pub kind: HandleKind,
    pub position: XYPosition,
}

impl Handle {
    pub(crate) fn is_same_as(&self, other: &Handle) -> bool {
        self.node_id == other.node_id
            && self.kind == other.kind
            && self.handle_id == other.handle_id
    }
}

/// A completed handle pairing, normalized so `source` is the source side.
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub source: String,
    pub source_handle: Option<String>,
    pub target: String,
    pub target_handle: Option<String>,
}

/// Handle-compatibility policy while validating a candidate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Any handle may pair with any handle on another position.
    #[default]
    Loose,
    /// Source handles pair only with target handles and vice versa.
    Strict,
}

/// The ephemeral connection state observed by handle shells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConnectionState {
    pub in_progress: bool,
    pub from_handle: Option<Handle>,
    pub to_handle: Option<Handle>,
    pub is_valid: bool,
}

pub type OnConnect = Rc<dyn Fn(&Connection)>;
pub type OnConnectStart = Rc<dyn Fn(&Handle)>;
pub type OnConnectEnd = Rc<dyn Fn()>;
pub type IsValidConnection = Rc<dyn Fn(&Connection) -> bool>;

/// Host callbacks invoked at the state-machine transition points.
#[derive(Clone, Default)]
pub struct ConnectionCallbacks {
    pub on_connect: Option<OnConnect>,
    pub on_connect_start: Option<OnConnectStart>,
    pub on_connect_end: Option<OnConnectEnd>,
    pub is_valid_connection: Option<IsValidConnection>,
}

/// The two derived handles of a node: source at the right-edge center,
/// target at the left-edge center.
pub fn node_handles(entry: &LookupNode) -> [Handle; 2] {
    let rect = entry.rect();
    let mid_y = rect.y + rect.height / 2.0;
    [
        Handle {
            node_id: entry.id.clone(),
            handle_id: None,
            kind: HandleKind::Source,
            position: XYPosition::new(rect.x + rect.width, mid_y),
        },
        Handle {
            node_id: entry.id.clone(),
            handle_id: None,
            kind: HandleKind::Target,
            position: XYPosition::new(rect.x, mid_y),
        },
    ]
}

/// Whether `mode` allows pairing `from` with `candidate` at all. The origin
/// handle never pairs with itself.
pub fn mode_allows(mode: ConnectionMode, from: &Handle, candidate: &Handle) -> bool {
    if candidate.is_same_as(from) {
        return false;
    }
    match mode {
        ConnectionMode::Loose => true,
        ConnectionMode::Strict => from.kind != candidate.kind,
    }
}

/// Normalize a handle pairing into a [`Connection`]: the handle with the
/// source kind becomes the source side.
pub fn connection_between(from: &Handle, to: &Handle) -> Connection {
    let (source, target) = if from.kind == HandleKind::Source {
        (from, to)
    } else {
        (to, from)
    };
    Connection {
        source: source.node_id.clone(),
        source_handle: source.handle_id.clone(),
        target: target.node_id.clone(),
        target_handle: target.handle_id.clone(),
    }
}

/// Closest mode-compatible handle within `radius` of the pointer, searched
/// over the node lookup.
pub fn find_candidate(
    pointer: XYPosition,
    from: &Handle,
    lookup: &HashMap<String, LookupNode>,
    mode: ConnectionMode,
    radius: f32,
) -> Option<Handle> {
    let radius_sq = radius * radius;
    let mut best: Option<(f32, Handle)> = None;
    for entry in lookup.values() {
        for handle in node_handles(entry) {
            if !mode_allows(mode, from, &handle) {
                continue;
            }
            let dist_sq = handle.position.distance_sq(pointer);
            if dist_sq > radius_sq {
                continue;
            }
            if best.as_ref().map_or(true, |(d, _)| dist_sq < *d) {
                best = Some((dist_sq, handle));
            }
        }
    }
    best.map(|(_, handle)| handle)
}

/// The connection state machine: idle → connecting → (valid-pending |
/// invalid-pending) → idle.
///
/// Methods only mutate state; the façade wraps each one, emitting the
/// connection-changed notification after the write and invoking the host
/// callbacks with no internal borrows held.
#[derive(Default)]
pub struct ConnectionController {
    connection: ConnectionState,
    click_start: Option<Handle>,
}

impl ConnectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ConnectionState {
        self.connection.clone()
    }

    /// The remembered origin of a click-to-connect attempt.
    pub fn click_start_handle(&self) -> Option<Handle> {
        self.click_start.clone()
    }

    /// Enter the connecting state from `from`. Ignored while an attempt is
    /// already in progress.
    pub fn begin(&mut self, from: Handle) -> bool {
        if self.connection.in_progress {
            return false;
        }
        self.connection = ConnectionState {
            in_progress: true,
            from_handle: Some(from),
            to_handle: None,
            is_valid: false,
        };
        true
    }

    /// Like [`begin`](Self::begin), but also remembers the origin for
    /// click-to-connect completion.
    pub fn begin_click(&mut self, from: Handle) -> bool {
        if !self.begin(from.clone()) {
            return false;
        }
        self.click_start = Some(from);
        true
    }

    /// Record the current candidate and its verdict. Returns whether the
    /// state actually changed.
    pub fn set_target(&mut self, to_handle: Option<Handle>, is_valid: bool) -> bool {
        if !self.connection.in_progress {
            return false;
        }
        if self.connection.to_handle == to_handle && self.connection.is_valid == is_valid {
            return false;
        }
        self.connection.to_handle = to_handle;
        self.connection.is_valid = is_valid;
        true
    }

    /// Release: build the normalized connection if the pending candidate is
    /// valid, then reset to idle. Returns the connection (if any) and whether
    /// an attempt was in progress.
    pub fn finish(&mut self) -> (Option<Connection>, bool) {
        let was_in_progress = self.connection.in_progress;
        let connection = match (&self.connection.from_handle, &self.connection.to_handle) {
            (Some(from), Some(to)) if self.connection.is_valid => {
                Some(connection_between(from, to))
            }
            _ => None,
        };
        self.reset();
        (connection, was_in_progress)
    }

    /// Abort the attempt without creating a connection.
    pub fn cancel(&mut self) -> bool {
        let was_in_progress = self.connection.in_progress;
        self.reset();
        was_in_progress
    }

    fn reset(&mut self) {
        self.connection = ConnectionState::default();
        self.click_start = None;
    }
}
