//! Presentation host tree
//!
//! The crate never renders widgets itself; chrome strategies mount nodes
//! into this abstract host tree and the embedding shell mirrors the tree
//! onto real widgets (the same core/platform split the rest of the crate
//! follows). The host also carries the pieces of shell behavior the
//! session contract needs: click dispatch for the take/cancel actions,
//! viewport-driven layout bindings for dialog centering, and a revision
//! watch so tests can wait for mutations instead of polling.

use crate::presentation::UserAction;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

/// Identifier of a mounted node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// What a mounted node represents to the embedding shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Generic container
    Container,
    /// Full-viewport shade behind a plain dialog
    Shadow,
    /// Dialog box
    Dialog,
    /// Loading backdrop shown while the stream is acquired
    Backdrop,
    /// Live preview viewport
    Preview,
    /// Clickable button
    Button,
    /// Dialog title
    Title,
    /// Popover attached to an anchor
    Popover,
}

/// Viewport-driven layout rule
///
/// Registered by chromes instead of arbitrary resize callbacks; the host
/// re-applies every binding whenever the viewport changes, and applies a
/// binding once immediately when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutBinding {
    /// Keep `node` horizontally centered for a content width
    CenterHorizontally {
        /// Node to center
        node: NodeId,
        /// Content width in pixels
        width: u32,
    },
    /// Keep `node` sized to the full viewport
    FillViewport {
        /// Node to stretch
        node: NodeId,
    },
}

/// Identifier of a registered layout binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(u64);

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    label: String,
    attrs: HashMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

struct HostState {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: u64,
    clicks: HashMap<NodeId, (mpsc::UnboundedSender<UserAction>, UserAction)>,
    bindings: HashMap<BindingId, LayoutBinding>,
    next_binding: u64,
    viewport: (u32, u32),
}

impl HostState {
    fn apply_binding(&mut self, binding: LayoutBinding) {
        let (vw, vh) = self.viewport;
        match binding {
            LayoutBinding::CenterHorizontally { node, width } => {
                let left = vw.saturating_sub(width) / 2;
                if let Some(n) = self.nodes.get_mut(&node) {
                    n.attrs.insert("left".into(), left.to_string());
                }
            }
            LayoutBinding::FillViewport { node } => {
                if let Some(n) = self.nodes.get_mut(&node) {
                    n.attrs.insert("width".into(), vw.to_string());
                    n.attrs.insert("height".into(), vh.to_string());
                }
            }
        }
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(&id) else {
            return;
        };
        self.clicks.remove(&id);
        if let Some(parent) = node.parent {
            if let Some(p) = self.nodes.get_mut(&parent) {
                p.children.retain(|c| *c != id);
            }
        }
        for child in node.children {
            self.remove_subtree(child);
        }
        self.bindings.retain(|_, b| match b {
            LayoutBinding::CenterHorizontally { node, .. } => *node != id,
            LayoutBinding::FillViewport { node } => *node != id,
        });
    }
}

/// Shared handle to a presentation host tree
///
/// Clones refer to the same tree.
#[derive(Clone)]
pub struct Host {
    state: Arc<Mutex<HostState>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    /// Create a host tree with an empty root container
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = HashMap::new();
        nodes.insert(
            root,
            Node {
                kind: NodeKind::Container,
                label: "body".to_string(),
                attrs: HashMap::new(),
                parent: None,
                children: Vec::new(),
            },
        );
        let (tx, _rx) = watch::channel(0);
        Self {
            state: Arc::new(Mutex::new(HostState {
                nodes,
                root,
                next_id: 1,
                clicks: HashMap::new(),
                bindings: HashMap::new(),
                next_binding: 0,
                viewport: (1024, 768),
            })),
            revision: Arc::new(tx),
        }
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }

    /// Watch receiver that changes on every tree mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// The root node
    pub fn root(&self) -> NodeId {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).root
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a detached node
    pub fn create(&self, kind: NodeKind, label: impl Into<String>) -> NodeId {
        let mut state = self.lock();
        let id = NodeId(state.next_id);
        state.next_id += 1;
        state.nodes.insert(
            id,
            Node {
                kind,
                label: label.into(),
                attrs: HashMap::new(),
                parent: None,
                children: Vec::new(),
            },
        );
        drop(state);
        self.bump();
        id
    }

    /// Append a detached node under a parent
    ///
    /// No-op if either node is gone or the child is already attached.
    pub fn append(&self, parent: NodeId, child: NodeId) {
        let mut state = self.lock();
        if !state.nodes.contains_key(&parent) {
            return;
        }
        match state.nodes.get_mut(&child) {
            Some(c) if c.parent.is_none() => c.parent = Some(parent),
            _ => return,
        }
        if let Some(p) = state.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        drop(state);
        self.bump();
    }

    /// Remove a node and its subtree
    pub fn remove(&self, id: NodeId) {
        let mut state = self.lock();
        state.remove_subtree(id);
        drop(state);
        self.bump();
    }

    /// Whether a node is still mounted (or detached but alive)
    pub fn contains(&self, id: NodeId) -> bool {
        self.lock().nodes.contains_key(&id)
    }

    /// Child nodes in mount order
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.lock()
            .nodes
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Node label
    pub fn label(&self, id: NodeId) -> Option<String> {
        self.lock().nodes.get(&id).map(|n| n.label.clone())
    }

    /// Node kind
    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.lock().nodes.get(&id).map(|n| n.kind)
    }

    /// Set a node attribute
    pub fn set_attr(&self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        let mut state = self.lock();
        if let Some(n) = state.nodes.get_mut(&id) {
            n.attrs.insert(key.into(), value.into());
        }
        drop(state);
        self.bump();
    }

    /// Read a node attribute
    pub fn attr(&self, id: NodeId, key: &str) -> Option<String> {
        self.lock()
            .nodes
            .get(&id)
            .and_then(|n| n.attrs.get(key).cloned())
    }

    /// Find the first live node with a label, depth-insensitive
    pub fn find_by_label(&self, label: &str) -> Option<NodeId> {
        let state = self.lock();
        let mut ids: Vec<NodeId> = state.nodes.keys().copied().collect();
        ids.sort();
        ids.into_iter()
            .find(|id| state.nodes[id].label == label)
    }

    /// All live nodes of a kind
    pub fn nodes_of_kind(&self, kind: NodeKind) -> Vec<NodeId> {
        let state = self.lock();
        let mut ids: Vec<NodeId> = state
            .nodes
            .iter()
            .filter(|(_, n)| n.kind == kind)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Wire a button click to a user action
    pub fn wire_click(
        &self,
        id: NodeId,
        sender: mpsc::UnboundedSender<UserAction>,
        action: UserAction,
    ) {
        self.lock().clicks.insert(id, (sender, action));
    }

    /// Dispatch a click on a node
    ///
    /// Returns false when the node is gone or not wired; clicking a
    /// removed button after session disposal is a no-op by design.
    pub fn click(&self, id: NodeId) -> bool {
        let entry = {
            let state = self.lock();
            if !state.nodes.contains_key(&id) {
                return false;
            }
            state.clicks.get(&id).cloned()
        };
        match entry {
            Some((sender, action)) => sender.send(action).is_ok(),
            None => false,
        }
    }

    /// Register a layout binding, applying it once immediately
    pub fn bind_layout(&self, binding: LayoutBinding) -> BindingId {
        let mut state = self.lock();
        let id = BindingId(state.next_binding);
        state.next_binding += 1;
        state.bindings.insert(id, binding);
        state.apply_binding(binding);
        drop(state);
        self.bump();
        id
    }

    /// Detach a layout binding
    pub fn unbind_layout(&self, id: BindingId) {
        self.lock().bindings.remove(&id);
    }

    /// Number of registered layout bindings
    pub fn layout_binding_count(&self) -> usize {
        self.lock().bindings.len()
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        self.lock().viewport
    }

    /// Change the viewport, re-applying every layout binding
    pub fn set_viewport(&self, width: u32, height: u32) {
        let mut state = self.lock();
        state.viewport = (width, height);
        let bindings: Vec<LayoutBinding> = state.bindings.values().copied().collect();
        for binding in bindings {
            state.apply_binding(binding);
        }
        drop(state);
        self.bump();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_remove_subtree() {
        let host = Host::new();
        let dialog = host.create(NodeKind::Dialog, "dialog");
        let button = host.create(NodeKind::Button, "Take it");
        host.append(host.root(), dialog);
        host.append(dialog, button);

        assert_eq!(host.children(host.root()), vec![dialog]);
        host.remove(dialog);
        assert!(!host.contains(dialog));
        assert!(!host.contains(button));
        assert!(host.children(host.root()).is_empty());
    }

    #[test]
    fn test_click_dispatch_and_removed_node_noop() {
        let host = Host::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let button = host.create(NodeKind::Button, "Cancel");
        host.append(host.root(), button);
        host.wire_click(button, tx, UserAction::Cancel);

        assert!(host.click(button));
        assert_eq!(rx.try_recv().unwrap(), UserAction::Cancel);

        host.remove(button);
        assert!(!host.click(button));
    }

    #[test]
    fn test_center_binding_tracks_viewport() {
        let host = Host::new();
        let dialog = host.create(NodeKind::Dialog, "dialog");
        host.append(host.root(), dialog);
        let binding = host.bind_layout(LayoutBinding::CenterHorizontally {
            node: dialog,
            width: 300,
        });

        // Applied immediately for the default 1024-wide viewport
        assert_eq!(host.attr(dialog, "left").unwrap(), "362");

        host.set_viewport(700, 500);
        assert_eq!(host.attr(dialog, "left").unwrap(), "200");

        host.unbind_layout(binding);
        host.set_viewport(900, 500);
        assert_eq!(host.attr(dialog, "left").unwrap(), "200");
    }

    #[test]
    fn test_fill_viewport_binding() {
        let host = Host::new();
        let shadow = host.create(NodeKind::Shadow, "shadow");
        host.append(host.root(), shadow);
        host.bind_layout(LayoutBinding::FillViewport { node: shadow });
        host.set_viewport(800, 600);
        assert_eq!(host.attr(shadow, "width").unwrap(), "800");
        assert_eq!(host.attr(shadow, "height").unwrap(), "600");
    }

    #[test]
    fn test_removing_node_drops_its_bindings() {
        let host = Host::new();
        let dialog = host.create(NodeKind::Dialog, "dialog");
        host.append(host.root(), dialog);
        host.bind_layout(LayoutBinding::CenterHorizontally {
            node: dialog,
            width: 300,
        });
        assert_eq!(host.layout_binding_count(), 1);
        host.remove(dialog);
        assert_eq!(host.layout_binding_count(), 0);
    }
}
