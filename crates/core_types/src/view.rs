use crate::fact::{Fact, FactChange};
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Read-only query surface a rule body runs against.
pub trait FactView {
    /// Entities holding `attribute = value`, in first-assertion order.
    fn entities_with(&self, attribute: &str, value: &Value) -> Vec<Value>;

    /// Every value of `attribute` on `entity`.
    fn values(&self, entity: &Value, attribute: &str) -> Vec<Value>;

    fn find(&self, tag: &str) -> Vec<Value> {
        self.entities_with("tag", &Value::text(tag))
    }

    fn first(&self, entity: &Value, attribute: &str) -> Option<Value> {
        self.values(entity, attribute).into_iter().next()
    }

    fn has(&self, entity: &Value, attribute: &str, value: &Value) -> bool {
        self.values(entity, attribute).iter().any(|v| v == value)
    }
}

/// In-memory fact set, keyed by entity.
#[derive(Clone, Debug, Default)]
pub struct FactSet {
    order: Vec<Value>,
    by_entity: HashMap<Value, Vec<Fact>>,
}

impl FactSet {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            by_entity: HashMap::new(),
        }
    }

    /// Returns `false` when the exact fact is already present.
    pub fn insert(&mut self, fact: Fact) -> bool {
        if !self.by_entity.contains_key(&fact.entity) {
            self.order.push(fact.entity.clone());
        }
        let facts = self.by_entity.entry(fact.entity.clone()).or_default();
        if facts.contains(&fact) {
            return false;
        }
        facts.push(fact);
        true
    }

    /// Removes every fact sharing the triple, regardless of extra components.
    pub fn remove(&mut self, fact: &Fact) -> bool {
        self.retain_on(&fact.entity, |f| !f.same_triple(fact))
    }

    pub fn remove_attribute(&mut self, entity: &Value, attribute: &str) -> bool {
        self.retain_on(entity, |f| &*f.attribute != attribute)
    }

    pub fn remove_entity(&mut self, entity: &Value) -> bool {
        if self.by_entity.remove(entity).is_none() {
            return false;
        }
        self.order.retain(|e| e != entity);
        true
    }

    /// Applies one rule change; returns `true` if the set changed.
    pub fn apply(&mut self, change: &FactChange) -> bool {
        match change {
            FactChange::Add(fact) => self.insert(fact.clone()),
            FactChange::Remove(fact) => self.remove(fact),
            FactChange::RemoveAttribute { entity, attribute } => {
                self.remove_attribute(entity, attribute)
            }
            FactChange::RemoveEntity(entity) => self.remove_entity(entity),
        }
    }

    pub fn contains(&self, entity: &Value, attribute: &str, value: &Value) -> bool {
        self.by_entity.get(entity).is_some_and(|facts| {
            facts
                .iter()
                .any(|f| &*f.attribute == attribute && &f.value == value)
        })
    }

    pub fn len(&self) -> usize {
        self.by_entity.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> + '_ {
        self.order
            .iter()
            .filter_map(|e| self.by_entity.get(e))
            .flatten()
    }

    fn retain_on(&mut self, entity: &Value, keep: impl Fn(&Fact) -> bool) -> bool {
        let Some(facts) = self.by_entity.get_mut(entity) else {
            return false;
        };
        let before = facts.len();
        facts.retain(|f| keep(f));
        let changed = facts.len() != before;
        if facts.is_empty() {
            self.by_entity.remove(entity);
            self.order.retain(|e| e != entity);
        }
        changed
    }
}

impl FactView for FactSet {
    fn entities_with(&self, attribute: &str, value: &Value) -> Vec<Value> {
        self.order
            .iter()
            .filter(|e| self.contains(e, attribute, value))
            .cloned()
            .collect()
    }

    fn values(&self, entity: &Value, attribute: &str) -> Vec<Value> {
        let Some(facts) = self.by_entity.get(entity) else {
            return Vec::new();
        };
        let mut out: Vec<Value> = Vec::new();
        for fact in facts.iter().filter(|f| &*f.attribute == attribute) {
            if !out.contains(&fact.value) {
                out.push(fact.value.clone());
            }
        }
        out
    }
}

impl Extend<Fact> for FactSet {
    fn extend<I: IntoIterator<Item = Fact>>(&mut self, iter: I) {
        for fact in iter {
            self.insert(fact);
        }
    }
}

/// One row of a watched query's result set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Record {
    fields: Vec<(Arc<str>, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.push((Arc::from(name), value.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| &**field == name)
            .map(|(_, v)| v)
    }
}

/// Rows that entered and left a watched query's result since the last delivery.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WatchDiff {
    pub adds: Vec<Record>,
    pub removes: Vec<Record>,
}

impl WatchDiff {
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }
}
