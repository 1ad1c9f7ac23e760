//! Node and edge collections and the derived node-lookup index.
//!
//! The [`GraphStore`] owns both collections. Mutators accept either a full
//! replacement or a pure transform over the current collection (see
//! [`Update`]), and every node mutation rebuilds the lookup index wholesale —
//! the index is a disposable cache, not incrementally patched state.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::geometry::{Rect, XYPosition};

/// Fallback size used whenever a node has not declared its dimensions.
pub const DEFAULT_NODE_WIDTH: f32 = 100.0;
pub const DEFAULT_NODE_HEIGHT: f32 = 50.0;

/// Arbitrary per-node payload.
pub type NodeData = serde_json::Map<String, serde_json::Value>;

fn default_true() -> bool {
    true
}

/// A positioned box in the diagram.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub position: XYPosition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    #[serde(default)]
    pub data: NodeData,
    #[serde(default)]
    pub selected: bool,
    #[serde(default = "default_true")]
    pub draggable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub z_index: i32,
}

impl Node {
    pub fn new(id: impl Into<String>, x: f32, y: f32) -> Self {
        Self {
            id: id.into(),
            position: XYPosition::new(x, y),
            width: None,
            height: None,
            data: NodeData::new(),
            selected: false,
            draggable: true,
            class_name: None,
            z_index: 0,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.data.insert("label".into(), label.into());
        self
    }

    pub fn with_data(mut self, data: NodeData) -> Self {
        self.data = data;
        self
    }

    /// The text shown inside the node: the `label` data entry, falling back
    /// to the identifier.
    pub fn label(&self) -> &str {
        self.data
            .get("label")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.id)
    }

    /// Plane-space rectangle, with missing dimensions defaulted.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.width.unwrap_or(DEFAULT_NODE_WIDTH),
            self.height.unwrap_or(DEFAULT_NODE_HEIGHT),
        )
    }
}

/// Connector curve family, resolved by the render cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    #[default]
    Straight,
    Bezier,
    Step,
}

/// A connector between two nodes.
///
/// An edge whose `source` or `target` does not resolve to a stored node is
/// still kept and rendered as a degenerate empty path; dangling edges are the
/// caller's to clean up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub animated: bool,
    #[serde(default)]
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
            selected: false,
            animated: false,
            kind: EdgeKind::default(),
        }
    }

    pub fn with_kind(mut self, kind: EdgeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn animated(mut self) -> Self {
        self.animated = true;
        self
    }
}

/// Lightweight projection of a node kept in the lookup index. Dimensions are
/// stored with the fallback already applied so the connection subsystem can
/// derive handle geometry without re-resolving defaults.
#[derive(Clone, Debug, PartialEq)]
pub struct LookupNode {
    pub id: String,
    pub position: XYPosition,
    pub width: f32,
    pub height: f32,
    pub data: NodeData,
}

impl LookupNode {
    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.width, self.height)
    }
}

/// Either a full replacement collection or a pure transform over the current
/// one. Both produce a new collection; the transform must not rely on
/// mutating its input.
pub enum Update<T> {
    Replace(Vec<T>),
    With(Box<dyn FnOnce(&[T]) -> Vec<T>>),
}

impl<T> Update<T> {
    pub fn replace(items: Vec<T>) -> Self {
        Update::Replace(items)
    }

    pub fn with(f: impl FnOnce(&[T]) -> Vec<T> + 'static) -> Self {
        Update::With(Box::new(f))
    }

    fn apply(self, current: &[T]) -> Vec<T> {
        match self {
            Update::Replace(items) => items,
            Update::With(f) => f(current),
        }
    }
}

impl<T> From<Vec<T>> for Update<T> {
    fn from(items: Vec<T>) -> Self {
        Update::Replace(items)
    }
}

/// Identifier sets for [`GraphStore::delete_elements`].
#[derive(Debug, Default)]
pub struct DeleteElements {
    pub nodes: Vec<String>,
    pub edges: Vec<String>,
}

impl DeleteElements {
    pub fn nodes<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { nodes: ids.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    pub fn edges<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { edges: ids.into_iter().map(Into::into).collect(), ..Self::default() }
    }
}

/// Owns the node and edge collections plus the derived lookup index.
pub struct GraphStore {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    lookup: HashMap<String, LookupNode>,
}

impl GraphStore {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut store = Self { nodes, edges, lookup: HashMap::new() };
        store.rebuild_lookup();
        store
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn lookup(&self) -> &HashMap<String, LookupNode> {
        &self.lookup
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn set_nodes(&mut self, update: impl Into<Update<Node>>) {
        self.nodes = update.into().apply(&self.nodes);
        self.rebuild_lookup();
    }

    pub fn set_edges(&mut self, update: impl Into<Update<Edge>>) {
        self.edges = update.into().apply(&self.edges);
    }

    pub fn add_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes.extend(nodes);
        self.rebuild_lookup();
    }

    pub fn add_edges(&mut self, edges: Vec<Edge>) {
        self.edges.extend(edges);
    }

    /// Remove elements by identifier-set membership. Removing a node does not
    /// cascade to its incident edges; those stay behind as dangling edges.
    pub fn delete_elements(&mut self, params: DeleteElements) {
        if !params.nodes.is_empty() {
            let ids: HashSet<&str> = params.nodes.iter().map(String::as_str).collect();
            self.nodes.retain(|n| !ids.contains(n.id.as_str()));
            self.rebuild_lookup();
        }
        if !params.edges.is_empty() {
            let ids: HashSet<&str> = params.edges.iter().map(String::as_str).collect();
            self.edges.retain(|e| !ids.contains(e.id.as_str()));
        }
    }

    /// Shallow-merge `data` into the node's payload. Returns `false` (and
    /// changes nothing) when the identifier is unknown.
    pub fn update_node_data(&mut self, id: &str, data: NodeData) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        for (key, value) in data {
            node.data.insert(key, value);
        }
        if let Some(entry) = self.lookup.get_mut(id) {
            entry.data = node.data.clone();
        }
        true
    }

    /// Direct position write used by the drag fast path. Keeps the lookup
    /// entry in sync without a full rebuild.
    pub fn write_node_position(&mut self, id: &str, position: XYPosition) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        node.position = position;
        if let Some(entry) = self.lookup.get_mut(id) {
            entry.position = position;
        }
        true
    }

    fn rebuild_lookup(&mut self) {
        self.lookup.clear();
        for node in &self.nodes {
            let rect = node.rect();
            self.lookup.insert(
                node.id.clone(),
                LookupNode {
                    id: node.id.clone(),
                    position: node.position,
                    width: rect.width,
                    height: rect.height,
                    data: node.data.clone(),
                },
            );
        }
    }
}

/// Append `connection` to `edges` as a new edge, skipping exact duplicates
/// (same endpoints and handles). This is the host-side helper for the
/// `on_connect` callback; the engine itself never mutates the edge collection
/// on connect.
pub fn add_connection(connection: &Connection, edges: &[Edge]) -> Vec<Edge> {
    let duplicate = edges.iter().any(|e| {
        e.source == connection.source
            && e.target == connection.target
            && e.source_handle == connection.source_handle
            && e.target_handle == connection.target_handle
    });
    let mut next = edges.to_vec();
    if !duplicate {
        next.push(Edge {
            id: connection_edge_id(connection),
            source: connection.source.clone(),
            target: connection.target.clone(),
            source_handle: connection.source_handle.clone(),
            target_handle: connection.target_handle.clone(),
            selected: false,
            animated: false,
            kind: EdgeKind::default(),
        });
    }
    next
}

fn connection_edge_id(connection: &Connection) -> String {
    let sh = connection.source_handle.as_deref().unwrap_or("");
    let th = connection.target_handle.as_deref().unwrap_or("");
    format!(
        "edge-{}{}-{}{}",
        connection.source, sh, connection.target, th
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_nodes() -> Vec<Node> {
        vec![
            Node::new("a", 0.0, 0.0).with_label("Node A"),
            Node::new("b", 200.0, 100.0).with_size(120.0, 60.0),
        ]
    }

    // ========================================================================
    // Node basics
    // ========================================================================

    #[test]
    fn node_label_falls_back_to_id() {
        let node = Node::new("plain", 0.0, 0.0);
        assert_eq!(node.label(), "plain");
        let labeled = Node::new("n", 0.0, 0.0).with_label("Sum");
        assert_eq!(labeled.label(), "Sum");
    }

    #[test]
    fn node_rect_applies_size_fallback() {
        let node = Node::new("a", 10.0, 20.0);
        assert_eq!(node.rect(), Rect::new(10.0, 20.0, 100.0, 50.0));

        let sized = Node::new("b", 0.0, 0.0).with_size(80.0, 40.0);
        assert_eq!(sized.rect(), Rect::new(0.0, 0.0, 80.0, 40.0));
    }

    #[test]
    fn node_deserializes_with_defaults() {
        let node: Node = serde_json::from_str(
            r#"{"id": "n1", "position": {"x": 5.0, "y": 6.0}}"#,
        )
        .unwrap();
        assert!(node.draggable);
        assert!(!node.selected);
        assert!(node.width.is_none());
    }

    // ========================================================================
    // set_nodes / set_edges - replacement and functional update
    // ========================================================================

    #[test]
    fn set_nodes_replace() {
        let mut store = GraphStore::new(two_nodes(), vec![]);
        store.set_nodes(vec![Node::new("c", 1.0, 1.0)]);

        assert_eq!(store.nodes().len(), 1);
        assert_eq!(store.nodes()[0].id, "c");
        assert!(store.lookup().contains_key("c"));
        assert!(!store.lookup().contains_key("a"));
    }

    #[test]
    fn set_nodes_functional_update() {
        let mut store = GraphStore::new(two_nodes(), vec![]);
        store.set_nodes(Update::with(|nodes: &[Node]| {
            nodes
                .iter()
                .cloned()
                .map(|mut n| {
                    n.position.x += 10.0;
                    n
                })
                .collect()
        }));

        assert_eq!(store.nodes()[0].position.x, 10.0);
        assert_eq!(store.nodes()[1].position.x, 210.0);
        assert_eq!(store.lookup()["a"].position.x, 10.0);
    }

    #[test]
    fn set_edges_functional_update() {
        let mut store = GraphStore::new(two_nodes(), vec![Edge::new("e1", "a", "b")]);
        store.set_edges(Update::with(|edges: &[Edge]| {
            let mut next = edges.to_vec();
            next.push(Edge::new("e2", "b", "a"));
            next
        }));
        assert_eq!(store.edges().len(), 2);
    }

    // ========================================================================
    // Lookup index
    // ========================================================================

    #[test]
    fn lookup_rebuilds_on_node_mutation() {
        let mut store = GraphStore::new(two_nodes(), vec![]);
        assert_eq!(store.lookup().len(), 2);

        store.add_nodes(vec![Node::new("c", 5.0, 5.0)]);
        assert_eq!(store.lookup().len(), 3);

        store.delete_elements(DeleteElements::nodes(["a"]));
        assert!(!store.lookup().contains_key("a"));
    }

    #[test]
    fn lookup_stores_resolved_dimensions() {
        let store = GraphStore::new(two_nodes(), vec![]);
        let a = &store.lookup()["a"];
        assert_eq!((a.width, a.height), (DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT));
        let b = &store.lookup()["b"];
        assert_eq!((b.width, b.height), (120.0, 60.0));
    }

    // ========================================================================
    // delete_elements - no cascade
    // ========================================================================

    #[test]
    fn deleting_node_keeps_incident_edges() {
        let mut store = GraphStore::new(two_nodes(), vec![Edge::new("e1", "a", "b")]);
        store.delete_elements(DeleteElements::nodes(["a"]));

        assert_eq!(store.nodes().len(), 1);
        assert_eq!(store.edges().len(), 1, "dangling edge must survive");
    }

    #[test]
    fn delete_edges_by_id() {
        let mut store = GraphStore::new(
            two_nodes(),
            vec![Edge::new("e1", "a", "b"), Edge::new("e2", "b", "a")],
        );
        store.delete_elements(DeleteElements::edges(["e1"]));
        assert_eq!(store.edges().len(), 1);
        assert_eq!(store.edges()[0].id, "e2");
    }

    #[test]
    fn delete_unknown_ids_is_noop() {
        let mut store = GraphStore::new(two_nodes(), vec![]);
        store.delete_elements(DeleteElements::nodes(["missing"]));
        assert_eq!(store.nodes().len(), 2);
    }

    // ========================================================================
    // update_node_data
    // ========================================================================

    #[test]
    fn update_node_data_shallow_merges() {
        let mut store = GraphStore::new(two_nodes(), vec![]);
        let mut patch = NodeData::new();
        patch.insert("label".into(), "Renamed".into());
        patch.insert("weight".into(), 3.into());

        assert!(store.update_node_data("a", patch));

        let node = store.node("a").unwrap();
        assert_eq!(node.label(), "Renamed");
        assert_eq!(node.data["weight"], 3);
        assert_eq!(store.lookup()["a"].data["weight"], 3);
    }

    #[test]
    fn update_node_data_unknown_id_is_noop() {
        let mut store = GraphStore::new(two_nodes(), vec![]);
        let before = store.nodes().to_vec();

        let mut patch = NodeData::new();
        patch.insert("label".into(), "x".into());
        assert!(!store.update_node_data("missing", patch));

        assert_eq!(store.nodes(), &before[..]);
    }

    // ========================================================================
    // write_node_position - drag fast path
    // ========================================================================

    #[test]
    fn write_node_position_syncs_lookup() {
        let mut store = GraphStore::new(two_nodes(), vec![]);
        assert!(store.write_node_position("a", XYPosition::new(33.0, 44.0)));
        assert_eq!(store.node("a").unwrap().position, XYPosition::new(33.0, 44.0));
        assert_eq!(store.lookup()["a"].position, XYPosition::new(33.0, 44.0));
    }

    #[test]
    fn write_node_position_unknown_id_is_noop() {
        let mut store = GraphStore::new(two_nodes(), vec![]);
        assert!(!store.write_node_position("missing", XYPosition::new(1.0, 1.0)));
    }

    // ========================================================================
    // add_connection
    // ========================================================================

    #[test]
    fn add_connection_appends_edge() {
        let conn = Connection {
            source: "a".into(),
            source_handle: None,
            target: "b".into(),
            target_handle: None,
        };
        let edges = add_connection(&conn, &[]);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, "a");
        assert_eq!(edges[0].target, "b");
        assert_eq!(edges[0].id, "edge-a-b");
    }

    #[test]
    fn add_connection_skips_duplicates() {
        let conn = Connection {
            source: "a".into(),
            source_handle: None,
            target: "b".into(),
            target_handle: None,
        };
        let once = add_connection(&conn, &[]);
        let twice = add_connection(&conn, &once);
        assert_eq!(twice.len(), 1);
    }

    #[test]
    fn add_connection_distinguishes_handles() {
        let first = Connection {
            source: "a".into(),
            source_handle: Some("out-1".into()),
            target: "b".into(),
            target_handle: None,
        };
        let second = Connection {
            source: "a".into(),
            source_handle: Some("out-2".into()),
            target: "b".into(),
            target_handle: None,
        };
        let edges = add_connection(&second, &add_connection(&first, &[]));
        assert_eq!(edges.len(), 2);
    }
}
