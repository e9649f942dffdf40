//! Work pushed to the next turn of the host's event loop.
//!
//! Sizing and focusing an input while a batch is being applied can observe a
//! node that is not attached yet; those requests queue here until the host
//! calls [`Bridge::run_deferred`](crate::Bridge::run_deferred). Queued work is
//! never cancelled, but it re-resolves its instance when it runs.

use core_types::InstanceId;
use std::collections::VecDeque;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Deferred {
    Autosize(InstanceId),
    Focus(InstanceId),
}

#[derive(Debug, Default)]
pub struct DeferredQueue {
    queue: VecDeque<Deferred>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Deferred) {
        self.queue.push_back(task);
    }

    /// Everything queued before this turn began. Work queued while the turn
    /// runs waits for the next one.
    pub fn take_turn(&mut self) -> Vec<Deferred> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
