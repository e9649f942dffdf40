//! Arena-backed [`HostSurface`] for headless runs and tests.

use crate::{HostSurface, ListenTarget, ListenerHandle, NativeEventClass, NodeKey, Phase};
use std::collections::HashMap;
use std::sync::Arc;

/// Size hint a fresh text input reports before anything resizes it.
const DEFAULT_INPUT_SIZE: usize = 20;

/// Removed nodes keep a tombstone slot so keys are never reused; the slot's
/// attributes, content and child list are released on removal.
#[derive(Debug, Default)]
pub struct MemorySurface {
    nodes: Vec<NodeRecord>,
    live: HashMap<NodeKey, usize>,
    roots: Vec<NodeKey>,
    focused: Option<NodeKey>,
    listeners: Vec<Registration>,
    next_listener: u32,
}

#[derive(Debug)]
struct NodeRecord {
    tag_name: Arc<str>,
    attributes: Vec<(Arc<str>, String)>,
    value: Option<String>,
    size: Option<usize>,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

#[derive(Clone, Copy, Debug)]
struct Registration {
    handle: ListenerHandle,
    class: NativeEventClass,
    target: ListenTarget,
    phase: Phase,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn roots(&self) -> &[NodeKey] {
        &self.roots
    }

    pub fn is_live(&self, node: NodeKey) -> bool {
        self.live.contains_key(&node)
    }

    /// `true` if any listener for `class` is registered.
    pub fn is_listening(&self, class: NativeEventClass) -> bool {
        self.listeners.iter().any(|r| r.class == class)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Target and phase a listener for `class` was registered with.
    pub fn registration(&self, class: NativeEventClass) -> Option<(ListenTarget, Phase)> {
        self.listeners
            .iter()
            .find(|r| r.class == class)
            .map(|r| (r.target, r.phase))
    }

    /// Attributes in write order, for assertions and dumps.
    pub fn attributes(&self, node: NodeKey) -> Vec<(String, String)> {
        self.record(node)
            .map(|r| {
                r.attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn record(&self, node: NodeKey) -> Option<&NodeRecord> {
        self.live.get(&node).map(|&i| &self.nodes[i])
    }

    fn record_mut(&mut self, node: NodeKey) -> Option<&mut NodeRecord> {
        match self.live.get(&node) {
            Some(&i) => Some(&mut self.nodes[i]),
            None => {
                log::debug!(target: "dom", "ignoring write to dead node {node:?}");
                None
            }
        }
    }

    fn detach(&mut self, node: NodeKey) {
        self.roots.retain(|k| *k != node);
        let Some(parent) = self.record_mut(node).and_then(|r| r.parent.take()) else {
            return;
        };
        if let Some(record) = self.record_mut(parent) {
            record.children.retain(|k| *k != node);
        }
    }

    fn is_ancestor(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.parent(key);
        }
        false
    }

    fn can_adopt(&self, parent: NodeKey, child: NodeKey) -> bool {
        if !self.is_live(parent) || !self.is_live(child) {
            log::debug!(target: "dom", "cannot attach {child:?} under {parent:?}: dead node");
            return false;
        }
        if self.is_ancestor(child, parent) {
            debug_assert!(false, "cannot create cycle");
            return false;
        }
        true
    }

    fn class_tokens(&self, node: NodeKey) -> Vec<String> {
        self.attribute(node, "class")
            .map(|c| c.split_ascii_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

impl HostSurface for MemorySurface {
    fn create_element(&mut self, tag_name: &str) -> NodeKey {
        let key = NodeKey(self.nodes.len() as u32 + 1);
        let editable = tag_name.eq_ignore_ascii_case("input")
            || tag_name.eq_ignore_ascii_case("textarea");
        let index = self.nodes.len();
        self.nodes.push(NodeRecord {
            tag_name: Arc::from(tag_name.to_ascii_lowercase()),
            attributes: Vec::new(),
            value: editable.then(String::new),
            size: tag_name
                .eq_ignore_ascii_case("input")
                .then_some(DEFAULT_INPUT_SIZE),
            parent: None,
            children: Vec::new(),
        });
        self.live.insert(key, index);
        key
    }

    fn remove_node(&mut self, node: NodeKey) {
        if !self.is_live(node) {
            return;
        }
        self.detach(node);
        let index = self.live[&node];
        let record = &mut self.nodes[index];
        let children = std::mem::take(&mut record.children);
        record.attributes = Vec::new();
        record.value = None;
        record.size = None;
        for child in children {
            if let Some(record) = self.record_mut(child) {
                record.parent = None;
            }
        }
        if self.focused == Some(node) {
            self.focused = None;
        }
        self.live.remove(&node);
    }

    fn append_root(&mut self, node: NodeKey) {
        if !self.is_live(node) {
            return;
        }
        self.detach(node);
        self.roots.push(node);
    }

    fn append_child(&mut self, parent: NodeKey, child: NodeKey) {
        if !self.can_adopt(parent, child) {
            return;
        }
        self.detach(child);
        if let Some(record) = self.record_mut(parent) {
            record.children.push(child);
        }
        if let Some(record) = self.record_mut(child) {
            record.parent = Some(parent);
        }
    }

    fn insert_before(&mut self, parent: NodeKey, child: NodeKey, before: NodeKey) {
        if self.parent(before) != Some(parent) {
            self.append_child(parent, child);
            return;
        }
        if !self.can_adopt(parent, child) {
            return;
        }
        self.detach(child);
        if let Some(record) = self.record_mut(parent) {
            let pos = record
                .children
                .iter()
                .position(|k| *k == before)
                .unwrap_or(record.children.len());
            record.children.insert(pos, child);
        }
        if let Some(record) = self.record_mut(child) {
            record.parent = Some(parent);
        }
    }

    fn parent(&self, node: NodeKey) -> Option<NodeKey> {
        self.record(node).and_then(|r| r.parent)
    }

    fn children(&self, node: NodeKey) -> Vec<NodeKey> {
        self.record(node)
            .map(|r| r.children.clone())
            .unwrap_or_default()
    }

    fn is_attached(&self, node: NodeKey) -> bool {
        let mut current = node;
        loop {
            if !self.is_live(current) {
                return false;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return self.roots.contains(&current),
            }
        }
    }

    fn tag_name(&self, node: NodeKey) -> Option<String> {
        self.record(node).map(|r| r.tag_name.to_string())
    }

    fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) {
        let Some(record) = self.record_mut(node) else {
            return;
        };
        match record.attributes.iter_mut().find(|(k, _)| &**k == name) {
            Some((_, existing)) => {
                existing.clear();
                existing.push_str(value);
            }
            None => record.attributes.push((Arc::from(name), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, node: NodeKey, name: &str) {
        if let Some(record) = self.record_mut(node) {
            record.attributes.retain(|(k, _)| &**k != name);
        }
    }

    fn attribute(&self, node: NodeKey, name: &str) -> Option<String> {
        self.record(node)?
            .attributes
            .iter()
            .find(|(k, _)| &**k == name)
            .map(|(_, v)| v.clone())
    }

    fn add_class(&mut self, node: NodeKey, class: &str) {
        let mut tokens = self.class_tokens(node);
        if tokens.iter().any(|t| t == class) {
            return;
        }
        tokens.push(class.to_string());
        self.set_attribute(node, "class", &tokens.join(" "));
    }

    fn remove_class(&mut self, node: NodeKey, class: &str) {
        let mut tokens = self.class_tokens(node);
        let before = tokens.len();
        tokens.retain(|t| t != class);
        if tokens.len() == before {
            return;
        }
        if tokens.is_empty() {
            self.remove_attribute(node, "class");
        } else {
            self.set_attribute(node, "class", &tokens.join(" "));
        }
    }

    fn has_class(&self, node: NodeKey, class: &str) -> bool {
        self.class_tokens(node).iter().any(|t| t == class)
    }

    fn is_text_input(&self, node: NodeKey) -> bool {
        self.record(node).is_some_and(|r| &*r.tag_name == "input")
    }

    fn value(&self, node: NodeKey) -> Option<String> {
        self.record(node).and_then(|r| r.value.clone())
    }

    fn set_value(&mut self, node: NodeKey, value: &str) {
        let Some(record) = self.record_mut(node) else {
            return;
        };
        match &mut record.value {
            Some(existing) => {
                existing.clear();
                existing.push_str(value);
            }
            None => log::debug!(target: "dom", "node {node:?} has no editable content"),
        }
    }

    fn size(&self, node: NodeKey) -> Option<usize> {
        self.record(node).and_then(|r| r.size)
    }

    fn set_size(&mut self, node: NodeKey, size: usize) {
        if let Some(record) = self.record_mut(node)
            && record.size.is_some()
        {
            record.size = Some(size);
        }
    }

    fn focus(&mut self, node: NodeKey) {
        if self.is_attached(node) {
            self.focused = Some(node);
        } else {
            log::debug!(target: "dom", "cannot focus detached node {node:?}");
        }
    }

    fn focused(&self) -> Option<NodeKey> {
        self.focused.filter(|k| self.is_live(*k))
    }

    fn listen(
        &mut self,
        class: NativeEventClass,
        target: ListenTarget,
        phase: Phase,
    ) -> ListenerHandle {
        self.next_listener += 1;
        let handle = ListenerHandle(self.next_listener);
        self.listeners.push(Registration {
            handle,
            class,
            target,
            phase,
        });
        handle
    }

    fn unlisten(&mut self, handle: ListenerHandle) {
        self.listeners.retain(|r| r.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_nodes_are_detached() {
        let mut s = MemorySurface::new();
        let div = s.create_element("div");
        assert!(s.is_live(div));
        assert!(!s.is_attached(div));
        s.append_root(div);
        assert!(s.is_attached(div));
        assert_eq!(s.roots(), &[div]);
    }

    #[test]
    fn children_follow_parent_attachment() {
        let mut s = MemorySurface::new();
        let outer = s.create_element("div");
        let inner = s.create_element("span");
        s.append_child(outer, inner);
        assert_eq!(s.parent(inner), Some(outer));
        assert!(!s.is_attached(inner));
        s.append_root(outer);
        assert!(s.is_attached(inner));
    }

    #[test]
    fn insert_before_orders_siblings() {
        let mut s = MemorySurface::new();
        let p = s.create_element("ul");
        let a = s.create_element("li");
        let b = s.create_element("li");
        let c = s.create_element("li");
        s.append_child(p, a);
        s.append_child(p, c);
        s.insert_before(p, b, c);
        assert_eq!(s.children(p), vec![a, b, c]);
    }

    #[test]
    fn removing_parent_orphans_children() {
        let mut s = MemorySurface::new();
        let p = s.create_element("div");
        let c = s.create_element("div");
        s.append_root(p);
        s.append_child(p, c);
        s.remove_node(p);
        assert!(!s.is_live(p));
        assert_eq!(s.parent(c), None);
        assert!(s.roots().is_empty());
        assert_eq!(s.tag_name(p), None);
    }

    #[test]
    fn removed_nodes_release_their_contents() {
        let mut s = MemorySurface::new();
        let input = s.create_element("input");
        s.set_attribute(input, "title", "t");
        s.set_value(input, "typed");
        s.remove_node(input);
        let slot = &s.nodes[0];
        assert!(slot.attributes.is_empty());
        assert_eq!(slot.value, None);
        assert_eq!(slot.size, None);

        let next = s.create_element("div");
        assert_ne!(next, input);
        assert_eq!(s.attribute(input, "title"), None);
    }

    #[test]
    fn class_list_is_token_based() {
        let mut s = MemorySurface::new();
        let n = s.create_element("div");
        s.add_class(n, "a");
        s.add_class(n, "b");
        s.add_class(n, "a");
        assert_eq!(s.attribute(n, "class").as_deref(), Some("a b"));
        s.remove_class(n, "a");
        assert!(!s.has_class(n, "a"));
        assert!(s.has_class(n, "b"));
        s.remove_class(n, "b");
        assert_eq!(s.attribute(n, "class"), None);
    }

    #[test]
    fn only_inputs_have_size_and_value() {
        let mut s = MemorySurface::new();
        let input = s.create_element("INPUT");
        let area = s.create_element("textarea");
        let div = s.create_element("div");
        assert!(s.is_text_input(input));
        assert_eq!(s.size(input), Some(DEFAULT_INPUT_SIZE));
        assert_eq!(s.value(area).as_deref(), Some(""));
        assert_eq!(s.size(area), None);
        assert_eq!(s.value(div), None);
        s.set_value(div, "ignored");
        assert_eq!(s.value(div), None);
    }

    #[test]
    fn focus_requires_attachment() {
        let mut s = MemorySurface::new();
        let input = s.create_element("input");
        s.focus(input);
        assert_eq!(s.focused(), None);
        s.append_root(input);
        s.focus(input);
        assert_eq!(s.focused(), Some(input));
    }

    #[test]
    fn unlisten_drops_registration() {
        let mut s = MemorySurface::new();
        let h = s.listen(NativeEventClass::Click, ListenTarget::Window, Phase::Bubble);
        assert!(s.is_listening(NativeEventClass::Click));
        s.unlisten(h);
        assert!(!s.is_listening(NativeEventClass::Click));
    }
}
