//! Outbound seam between the bridge and the rule engine.
//!
//! Every batch handed to a [`FactSink`] is one indivisible unit: the engine
//! either sees all of its facts or none of them.

use core_types::FactBatch;
use std::sync::mpsc::{self, Receiver, Sender};

/// Destination for synthesized fact batches. Delivery is fire-and-forget.
pub trait FactSink {
    fn send(&mut self, batch: FactBatch);
}

impl FactSink for Sender<FactBatch> {
    fn send(&mut self, batch: FactBatch) {
        if Sender::send(self, batch).is_err() {
            log::debug!(target: "bus", "engine receiver gone; dropping fact batch");
        }
    }
}

impl FactSink for Vec<FactBatch> {
    fn send(&mut self, batch: FactBatch) {
        self.push(batch);
    }
}

impl<T: FactSink + ?Sized> FactSink for &mut T {
    fn send(&mut self, batch: FactBatch) {
        (**self).send(batch);
    }
}

pub struct Bus {
    pub batch_tx: Sender<FactBatch>, // shareable for event sources
    pub batch_rx: Receiver<FactBatch>,
}

impl Bus {
    pub fn new() -> Self {
        let (batch_tx, batch_rx) = mpsc::channel();
        Self { batch_tx, batch_rx }
    }

    /// Everything delivered so far, without blocking.
    pub fn drain(&self) -> Vec<FactBatch> {
        self.batch_rx.try_iter().collect()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
