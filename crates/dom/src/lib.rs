//! Host display surface.
//!
//! The bridge never reaches for a global document: it is handed a
//! [`HostSurface`] once at construction and performs every visual mutation and
//! listener registration through it.
//!
//! Invariants:
//! - A node has at most one parent; roots have none and are attached directly
//!   under the top of the visible tree.
//! - Keys are never reused within one surface.
//! - Operations on a removed key are no-ops; queries on it return `None`/`false`.

mod event;
mod memory;

pub use event::{KeyInfo, ListenTarget, ListenerHandle, NativeEvent, NativeEventClass, Phase};
pub use memory::MemorySurface;

/// Opaque key for a node owned by a surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u32);

impl NodeKey {
    /// Reserved sentinel; never handed out by a surface.
    pub const INVALID: NodeKey = NodeKey(0);
}

pub trait HostSurface {
    // =========================================================================
    // Tree
    // =========================================================================

    /// Allocates a detached element of the given native kind.
    fn create_element(&mut self, tag_name: &str) -> NodeKey;

    /// Detaches and frees `node`. Its children become detached.
    fn remove_node(&mut self, node: NodeKey);

    fn append_root(&mut self, node: NodeKey);

    fn append_child(&mut self, parent: NodeKey, child: NodeKey);

    fn insert_before(&mut self, parent: NodeKey, child: NodeKey, before: NodeKey);

    fn parent(&self, node: NodeKey) -> Option<NodeKey>;

    fn children(&self, node: NodeKey) -> Vec<NodeKey>;

    /// `true` when `node` is reachable from a root.
    fn is_attached(&self, node: NodeKey) -> bool;

    fn tag_name(&self, node: NodeKey) -> Option<String>;

    // =========================================================================
    // Attributes
    // =========================================================================

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str);

    fn remove_attribute(&mut self, node: NodeKey, name: &str);

    fn attribute(&self, node: NodeKey, name: &str) -> Option<String>;

    fn add_class(&mut self, node: NodeKey, class: &str);

    fn remove_class(&mut self, node: NodeKey, class: &str);

    fn has_class(&self, node: NodeKey, class: &str) -> bool;

    // =========================================================================
    // Editable content
    // =========================================================================

    /// `true` for single-line text inputs, which also carry a size hint.
    fn is_text_input(&self, node: NodeKey) -> bool;

    /// Live editable content; `None` for nodes that have none.
    fn value(&self, node: NodeKey) -> Option<String>;

    fn set_value(&mut self, node: NodeKey, value: &str);

    fn size(&self, node: NodeKey) -> Option<usize>;

    fn set_size(&mut self, node: NodeKey, size: usize);

    fn focus(&mut self, node: NodeKey);

    fn focused(&self) -> Option<NodeKey>;

    // =========================================================================
    // Native listeners
    // =========================================================================

    fn listen(&mut self, class: NativeEventClass, target: ListenTarget, phase: Phase)
    -> ListenerHandle;

    fn unlisten(&mut self, handle: ListenerHandle);
}
