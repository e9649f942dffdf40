use core_types::Value;
use uuid::Uuid;

/// Source of fresh synthetic entity ids for event records.
pub trait IdGenerator {
    fn next_id(&mut self) -> Value;
}

/// Random v4 UUIDs; collisions with store-assigned ids are not a concern.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> Value {
        Value::from(Uuid::new_v4().to_string())
    }
}

/// Deterministic `<prefix>-1`, `<prefix>-2`, ... ids for replays and tests.
#[derive(Clone, Debug)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("event")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Value {
        let id = Value::from(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuids_are_unique() {
        let mut ids = UuidIds;
        assert_ne!(ids.next_id(), ids.next_id());
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::new("ev");
        assert_eq!(ids.next_id(), Value::from("ev-1"));
        assert_eq!(ids.next_id(), Value::from("ev-2"));
    }
}
