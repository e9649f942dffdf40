//! Instance Directory side table.
//!
//! Per-instance state lives here, keyed by instance id, rather than on the
//! host's node objects. Invariants:
//! - `by_node` and `by_element` only ever point at live entries.
//! - Within its lifetime an instance owns exactly one entity, and an entity is
//!   rendered by at most one live instance.

use core_types::{InstanceId, Value};
use dom::NodeKey;
use std::collections::HashMap;
use std::sync::Arc;

/// Event classes an instance has opted into, keyed by class name (`"hover"`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListenerFlags(HashMap<Arc<str>, bool>);

impl ListenerFlags {
    pub fn get(&self, listener: &str) -> bool {
        self.0.get(listener).copied().unwrap_or(false)
    }

    pub fn set(&mut self, listener: &str, enabled: bool) {
        match self.0.get_mut(listener) {
            Some(flag) => *flag = enabled,
            None => {
                self.0.insert(Arc::from(listener), enabled);
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct InstanceRecord {
    pub node: NodeKey,
    /// Entity this instance renders.
    pub element: Value,
    /// Style references in application order.
    pub styles: Vec<Value>,
    pub sort: Option<Value>,
    pub listeners: ListenerFlags,
}

impl InstanceRecord {
    pub fn new(node: NodeKey, element: Value) -> Self {
        Self {
            node,
            element,
            styles: Vec::new(),
            sort: None,
            listeners: ListenerFlags::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct InstanceDirectory {
    instances: HashMap<InstanceId, InstanceRecord>,
    by_node: HashMap<NodeKey, InstanceId>,
    by_element: HashMap<Value, InstanceId>,
}

impl InstanceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a live instance, returning whatever previously held `id`.
    pub fn insert(&mut self, id: InstanceId, record: InstanceRecord) -> Option<InstanceRecord> {
        let previous = self.remove(&id);
        if let Some(owner) = self.by_element.get(&record.element)
            && *owner != id
        {
            log::warn!(
                target: "bridge.directory",
                "entity {} already rendered by instance {owner}; rebinding to {id}",
                record.element
            );
        }
        self.by_node.insert(record.node, id.clone());
        self.by_element.insert(record.element.clone(), id.clone());
        self.instances.insert(id, record);
        previous
    }

    pub fn remove(&mut self, id: &InstanceId) -> Option<InstanceRecord> {
        let record = self.instances.remove(id)?;
        if self.by_node.get(&record.node) == Some(id) {
            self.by_node.remove(&record.node);
        }
        if self.by_element.get(&record.element) == Some(id) {
            self.by_element.remove(&record.element);
        }
        Some(record)
    }

    pub fn get(&self, id: &InstanceId) -> Option<&InstanceRecord> {
        self.instances.get(id)
    }

    pub fn get_mut(&mut self, id: &InstanceId) -> Option<&mut InstanceRecord> {
        self.instances.get_mut(id)
    }

    pub fn contains(&self, id: &InstanceId) -> bool {
        self.instances.contains_key(id)
    }

    /// Instance rendered by a surface node, if the node is one of ours.
    pub fn instance_at(&self, node: NodeKey) -> Option<(&InstanceId, &InstanceRecord)> {
        let id = self.by_node.get(&node)?;
        self.instances.get(id).map(|record| (id, record))
    }

    pub fn is_instance(&self, node: NodeKey) -> bool {
        self.by_node.contains_key(&node)
    }

    /// Live instance rendering `element`.
    pub fn lookup(&self, element: &Value) -> Option<&InstanceId> {
        self.by_element.get(element)
    }

    pub fn node_of(&self, id: &InstanceId) -> Option<NodeKey> {
        self.instances.get(id).map(|r| r.node)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
