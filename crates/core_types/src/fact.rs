use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// `(entity, attribute, value)` assertion, optionally extended with ordered
/// extra components for compound records.
///
/// Facts are immutable; changing one is a removal followed by an insertion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fact {
    pub entity: Value,
    pub attribute: Arc<str>,
    pub value: Value,
    pub extra: Vec<Value>,
}

impl Fact {
    pub fn new(entity: impl Into<Value>, attribute: &str, value: impl Into<Value>) -> Self {
        Self {
            entity: entity.into(),
            attribute: Arc::from(attribute),
            value: value.into(),
            extra: Vec::new(),
        }
    }

    pub fn compound(
        entity: impl Into<Value>,
        attribute: &str,
        value: impl Into<Value>,
        extra: Vec<Value>,
    ) -> Self {
        Self {
            extra,
            ..Self::new(entity, attribute, value)
        }
    }

    /// Same triple, ignoring extra components.
    pub fn same_triple(&self, other: &Fact) -> bool {
        self.entity == other.entity
            && self.attribute == other.attribute
            && self.value == other.value
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} {}", self.entity, self.attribute, self.value)?;
        for component in &self.extra {
            write!(f, " {component}")?;
        }
        f.write_str("]")
    }
}

/// Facts emitted or applied together as one atomic unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FactBatch {
    facts: Vec<Fact>,
}

impl FactBatch {
    pub fn new() -> Self {
        Self { facts: Vec::new() }
    }

    pub fn push(&mut self, fact: Fact) {
        self.facts.push(fact);
    }

    pub fn add(&mut self, entity: &Value, attribute: &str, value: impl Into<Value>) {
        self.facts.push(Fact::new(entity.clone(), attribute, value));
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Fact> {
        self.facts.iter()
    }

    pub fn into_facts(self) -> Vec<Fact> {
        self.facts
    }

    /// Values of every fact in the batch carrying `attribute`, in batch order.
    pub fn values_of<'a>(&'a self, attribute: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.facts
            .iter()
            .filter(move |f| &*f.attribute == attribute)
            .map(|f| &f.value)
    }
}

impl From<Vec<Fact>> for FactBatch {
    fn from(facts: Vec<Fact>) -> Self {
        Self { facts }
    }
}

impl IntoIterator for FactBatch {
    type Item = Fact;
    type IntoIter = std::vec::IntoIter<Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.into_iter()
    }
}

impl<'a> IntoIterator for &'a FactBatch {
    type Item = &'a Fact;
    type IntoIter = std::slice::Iter<'a, Fact>;

    fn into_iter(self) -> Self::IntoIter {
        self.facts.iter()
    }
}

/// Change a rule body asks the engine to make.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FactChange {
    Add(Fact),
    Remove(Fact),
    /// Remove every value of `attribute` on `entity`.
    RemoveAttribute { entity: Value, attribute: Arc<str> },
    /// Remove every fact about `entity`.
    RemoveEntity(Value),
}

impl FactChange {
    pub fn add(entity: &Value, attribute: &str, value: impl Into<Value>) -> Self {
        FactChange::Add(Fact::new(entity.clone(), attribute, value))
    }

    pub fn remove(entity: &Value, attribute: &str, value: impl Into<Value>) -> Self {
        FactChange::Remove(Fact::new(entity.clone(), attribute, value))
    }

    pub fn remove_attribute(entity: &Value, attribute: &str) -> Self {
        FactChange::RemoveAttribute {
            entity: entity.clone(),
            attribute: Arc::from(attribute),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_extra_components() {
        let fact = Fact::compound("ev", "element", "e1", vec![Value::from("direct")]);
        assert_eq!(fact.to_string(), "[ev element e1 direct]");
    }

    #[test]
    fn values_of_keeps_batch_order() {
        let ev = Value::from("ev");
        let mut batch = FactBatch::new();
        batch.add(&ev, "element", "child");
        batch.add(&ev, "tag", "x");
        batch.add(&ev, "element", "parent");
        let elements: Vec<_> = batch.values_of("element").cloned().collect();
        assert_eq!(elements, vec![Value::from("child"), Value::from("parent")]);
    }
}
