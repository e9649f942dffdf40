//! Listener Subscription Manager.
//!
//! The engine watches "element declared as a hover listener, paired with its
//! live instance" and reports result-set diffs. Diffs travel over a channel
//! from the engine callback to the bridge, which drains it around every render
//! batch and before translating an event, then flips per-instance flags.
//!
//! The engine can report a row in the same cycle that makes its instance
//! live, before the render batch creating that instance has been applied.
//! Such adds are parked and land once the instance is in the directory.

use crate::directory::InstanceDirectory;
use core_types::{InstanceId, Record, Value, WatchDiff};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

/// One row of the listener watch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListenerRecord {
    pub listener: Arc<str>,
    pub element: Value,
    pub instance: InstanceId,
}

impl ListenerRecord {
    pub fn new(listener: &str, element: Value, instance: InstanceId) -> Self {
        Self {
            listener: Arc::from(listener),
            element,
            instance,
        }
    }

    pub fn from_record(record: &Record) -> Option<Self> {
        Some(Self {
            listener: Arc::from(record.get("listener")?.as_text()?),
            element: record.get("element")?.clone(),
            instance: InstanceId(record.get("instance")?.clone()),
        })
    }

    pub fn to_record(&self) -> Record {
        Record::new()
            .with("listener", &*self.listener)
            .with("element", self.element.clone())
            .with("instance", self.instance.value().clone())
    }
}

#[derive(Debug)]
pub struct ListenerSubscriptions {
    tx: Sender<WatchDiff>,
    rx: Receiver<WatchDiff>,
    /// Adds whose instance was not yet rendered.
    parked: Vec<ListenerRecord>,
}

impl ListenerSubscriptions {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            parked: Vec::new(),
        }
    }

    /// Callback for the engine's watch; forwards every diff to the bridge.
    pub fn handler(&self) -> impl FnMut(WatchDiff) + 'static {
        let tx = self.tx.clone();
        move |diff| {
            if tx.send(diff).is_err() {
                log::debug!(target: "bridge.listeners", "bridge gone; dropping listener diff");
            }
        }
    }

    /// Applies every diff delivered so far, then retries parked adds.
    /// Returns how many diffs were applied.
    pub fn drain(&mut self, directory: &mut InstanceDirectory) -> usize {
        let mut applied = 0;
        while let Ok(diff) = self.rx.try_recv() {
            self.apply(directory, &diff);
            applied += 1;
        }
        self.retry_parked(directory);
        applied
    }

    /// Applies one diff; adds for unknown instances are parked.
    pub fn apply(&mut self, directory: &mut InstanceDirectory, diff: &WatchDiff) {
        if !self.parked.is_empty() {
            let removed: Vec<ListenerRecord> = diff
                .removes
                .iter()
                .filter_map(ListenerRecord::from_record)
                .collect();
            self.parked.retain(|p| !removed.contains(p));
        }
        for record in apply_diff(directory, diff) {
            if !self.parked.contains(&record) {
                self.parked.push(record);
            }
        }
    }

    pub fn parked(&self) -> &[ListenerRecord] {
        &self.parked
    }

    fn retry_parked(&mut self, directory: &mut InstanceDirectory) {
        self.parked
            .retain(|record| match directory.get_mut(&record.instance) {
                Some(instance) => {
                    instance.listeners.set(&record.listener, true);
                    false
                }
                None => true,
            });
    }
}

impl Default for ListenerSubscriptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Flips listener flags for one diff. Removals apply first so a row that is
/// replaced within one diff ends up enabled. Returns the adds whose instance
/// is not in the directory.
pub fn apply_diff(directory: &mut InstanceDirectory, diff: &WatchDiff) -> Vec<ListenerRecord> {
    let mut unresolved = Vec::new();
    for row in &diff.removes {
        let Some(record) = ListenerRecord::from_record(row) else {
            log::debug!(target: "bridge.listeners", "malformed listener row {row:?}");
            continue;
        };
        // Already destroyed instances have nothing to clear.
        if let Some(instance) = directory.get_mut(&record.instance) {
            instance.listeners.set(&record.listener, false);
        }
    }
    for row in &diff.adds {
        let Some(record) = ListenerRecord::from_record(row) else {
            log::debug!(target: "bridge.listeners", "malformed listener row {row:?}");
            continue;
        };
        match directory.get_mut(&record.instance) {
            Some(instance) => instance.listeners.set(&record.listener, true),
            None => {
                log::debug!(
                    target: "bridge.listeners",
                    "{} listener for unrendered instance {}",
                    record.listener,
                    record.instance
                );
                unresolved.push(record);
            }
        }
    }
    unresolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InstanceRecord;
    use dom::NodeKey;

    fn directory_with(id: &str) -> InstanceDirectory {
        let mut dir = InstanceDirectory::new();
        dir.insert(
            InstanceId::from(id),
            InstanceRecord::new(NodeKey(1), Value::from("e1")),
        );
        dir
    }

    fn row(instance: &str) -> Record {
        ListenerRecord::new("hover", Value::from("e1"), InstanceId::from(instance)).to_record()
    }

    fn hover(dir: &InstanceDirectory, id: &str) -> bool {
        dir.get(&InstanceId::from(id))
            .is_some_and(|r| r.listeners.get("hover"))
    }

    #[test]
    fn adds_set_and_removes_clear() {
        let mut dir = directory_with("i1");
        apply_diff(
            &mut dir,
            &WatchDiff {
                adds: vec![row("i1")],
                removes: vec![],
            },
        );
        assert!(hover(&dir, "i1"));
        apply_diff(
            &mut dir,
            &WatchDiff {
                adds: vec![],
                removes: vec![row("i1")],
            },
        );
        assert!(!hover(&dir, "i1"));
    }

    #[test]
    fn removal_for_destroyed_instance_is_a_noop() {
        let mut dir = InstanceDirectory::new();
        apply_diff(
            &mut dir,
            &WatchDiff {
                adds: vec![],
                removes: vec![row("gone")],
            },
        );
        assert!(dir.is_empty());
    }

    #[test]
    fn replaced_row_ends_enabled() {
        let mut dir = directory_with("i1");
        let old = ListenerRecord::new("hover", Value::from("e0"), InstanceId::from("i1"));
        apply_diff(
            &mut dir,
            &WatchDiff {
                adds: vec![row("i1")],
                removes: vec![old.to_record()],
            },
        );
        assert!(hover(&dir, "i1"));
    }

    #[test]
    fn handler_diffs_arrive_on_drain() {
        let mut subs = ListenerSubscriptions::new();
        let mut handler = subs.handler();
        handler(WatchDiff {
            adds: vec![row("i1")],
            removes: vec![],
        });
        let mut dir = directory_with("i1");
        assert_eq!(subs.drain(&mut dir), 1);
        assert!(hover(&dir, "i1"));
        assert_eq!(subs.drain(&mut dir), 0);
    }

    #[test]
    fn adds_for_unrendered_instances_wait_for_the_instance() {
        let mut subs = ListenerSubscriptions::new();
        let mut handler = subs.handler();
        handler(WatchDiff {
            adds: vec![row("i1")],
            removes: vec![],
        });
        let mut dir = InstanceDirectory::new();
        assert_eq!(subs.drain(&mut dir), 1);
        assert_eq!(subs.parked().len(), 1);

        dir.insert(
            InstanceId::from("i1"),
            InstanceRecord::new(NodeKey(1), Value::from("e1")),
        );
        assert_eq!(subs.drain(&mut dir), 0);
        assert!(hover(&dir, "i1"));
        assert!(subs.parked().is_empty());
    }

    #[test]
    fn removal_cancels_a_parked_add() {
        let mut subs = ListenerSubscriptions::new();
        let mut dir = InstanceDirectory::new();
        subs.apply(
            &mut dir,
            &WatchDiff {
                adds: vec![row("i1")],
                removes: vec![],
            },
        );
        subs.apply(
            &mut dir,
            &WatchDiff {
                adds: vec![],
                removes: vec![row("i1")],
            },
        );
        assert!(subs.parked().is_empty());
        let mut dir = directory_with("i1");
        subs.drain(&mut dir);
        assert!(!hover(&dir, "i1"));
    }

    #[test]
    fn record_round_trips_through_row() {
        let record = ListenerRecord::new("hover", Value::from(5u64), InstanceId::from(9u64));
        assert_eq!(ListenerRecord::from_record(&record.to_record()), Some(record));
        assert_eq!(ListenerRecord::from_record(&Record::new()), None);
    }
}
