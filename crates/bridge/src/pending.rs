//! Pending Input Buffer.
//!
//! Every value the bridge reports through a change event is appended under the
//! element it came from, so a later `value` write can be recognised as the
//! echo of our own report rather than an external edit.
//!
//! Entries are never pruned while the element lives; the buffer grows with
//! every keystroke of a long-lived input.

use core_types::Value;
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct PendingInputs {
    sent: HashMap<Value, Vec<String>>,
}

impl PendingInputs {
    pub fn new() -> Self {
        Self {
            sent: HashMap::new(),
        }
    }

    pub fn record(&mut self, element: &Value, value: &str) {
        self.sent
            .entry(element.clone())
            .or_default()
            .push(value.to_string());
    }

    /// Values sent for `element`, oldest first.
    pub fn sent(&self, element: &Value) -> &[String] {
        self.sent.get(element).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn was_sent(&self, element: &Value, value: &str) -> bool {
        self.sent(element).iter().any(|v| v == value)
    }

    /// Total number of buffered values across all elements.
    pub fn total(&self) -> usize {
        self.sent.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_accumulate_in_order() {
        let mut pending = PendingInputs::new();
        let e = Value::from("e1");
        pending.record(&e, "h");
        pending.record(&e, "he");
        pending.record(&e, "h");
        assert_eq!(pending.sent(&e), &["h", "he", "h"]);
        assert!(pending.was_sent(&e, "he"));
        assert!(!pending.was_sent(&e, "hex"));
        assert_eq!(pending.total(), 3);
    }

    #[test]
    fn unknown_element_has_nothing() {
        let pending = PendingInputs::new();
        assert!(pending.sent(&Value::from("nope")).is_empty());
    }
}
