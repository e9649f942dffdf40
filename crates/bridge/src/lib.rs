//! Bridge between an EAV fact store and a visual document tree.
//!
//! Inbound, render operations derived from `element`/`instance`/`attribute`
//! facts mutate a [`HostSurface`]. Outbound, native events on that surface
//! become fact batches handed to a [`FactSink`]. All of it runs on one thread;
//! the only suspension point is the deferred queue drained by
//! [`Bridge::run_deferred`].

pub mod config;
pub mod deferred;
pub mod directory;
pub mod ids;
pub mod keys;
pub mod listeners;
pub mod pending;
pub mod render;
pub mod rules;
pub mod subscriptions;
pub mod translate;

pub use config::{BridgeConfig, KeyName, TagNames, tag_to_class};
pub use deferred::{Deferred, DeferredQueue};
pub use directory::{InstanceDirectory, InstanceRecord, ListenerFlags};
pub use ids::{IdGenerator, SequentialIds, UuidIds};
pub use keys::KeyNames;
pub use listeners::{ListenerRecord, ListenerSubscriptions};
pub use pending::PendingInputs;
pub use render::{RenderAdapter, RenderCtx, RenderError, RenderOp};
pub use rules::{DiffHandler, Program, Query, Rule, install_rules};
pub use subscriptions::NativeSubscriptions;
pub use translate::{EventTranslator, TranslateCtx, event_name};

use bus::FactSink;
use core_types::{InstanceId, Interner, NoInterner, WatchDiff};
use dom::{HostSurface, NativeEvent, NodeKey};

/// Owns the surface, the side tables, and the outbound sink for one renderer.
pub struct Bridge<S: HostSurface, K: FactSink> {
    config: BridgeConfig,
    surface: S,
    sink: K,
    directory: InstanceDirectory,
    pending: PendingInputs,
    deferred: DeferredQueue,
    renderer: RenderAdapter,
    translator: EventTranslator,
    listeners: ListenerSubscriptions,
    subscriptions: NativeSubscriptions,
}

impl<S: HostSurface, K: FactSink> Bridge<S, K> {
    pub fn new(surface: S, sink: K, config: BridgeConfig) -> Self {
        let names = config.tag_names();
        let keys = KeyNames::new(&config.key_names);
        Self {
            renderer: RenderAdapter::new(names.clone(), Box::new(NoInterner)),
            translator: EventTranslator::new(names, keys, Box::new(UuidIds)),
            config,
            surface,
            sink,
            directory: InstanceDirectory::new(),
            pending: PendingInputs::new(),
            deferred: DeferredQueue::new(),
            listeners: ListenerSubscriptions::new(),
            subscriptions: NativeSubscriptions::new(),
        }
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.translator.set_ids(Box::new(ids));
        self
    }

    /// Resolves numeric handles in attribute values before they are written.
    pub fn with_interner(mut self, interner: impl Interner + 'static) -> Self {
        self.renderer.set_interner(Box::new(interner));
        self
    }

    /// Installs the bridge's rules into `program` and subscribes to native
    /// events on the surface.
    pub fn setup(&mut self, program: &mut dyn Program) {
        let handler = self.listeners.handler();
        install_rules(program, &self.config.tag_names(), Box::new(handler));
        self.subscriptions.subscribe_all(&mut self.surface);
        log::debug!(
            target: "bridge",
            "setup complete: {} native subscriptions",
            self.subscriptions.len()
        );
    }

    pub fn teardown(&mut self) {
        self.subscriptions.unsubscribe_all(&mut self.surface);
        log::debug!(target: "bridge", "teardown complete");
    }

    /// Applies one render batch in order. A batch that would create a root for
    /// an unallocated instance is rejected before anything is mutated.
    pub fn apply(&mut self, ops: &[RenderOp]) -> Result<(), RenderError> {
        self.sync_listeners();
        let mut ctx = RenderCtx {
            surface: &mut self.surface,
            directory: &mut self.directory,
            deferred: &mut self.deferred,
            pending: &self.pending,
        };
        let result = self.renderer.apply(&mut ctx, ops);
        // Parked listener rows for instances this batch created land now.
        self.sync_listeners();
        result
    }

    /// Translates one native event and sends the resulting batch, if any.
    /// Returns `true` when a batch was sent.
    pub fn dispatch(&mut self, event: &NativeEvent) -> bool {
        self.sync_listeners();
        if !self.subscriptions.is_subscribed(event.class) {
            log::debug!(target: "bridge", "{:?} not subscribed; ignoring", event.class);
            return false;
        }
        let mut ctx = TranslateCtx {
            surface: &mut self.surface,
            directory: &self.directory,
            pending: &mut self.pending,
        };
        match self.translator.translate(&mut ctx, event) {
            Some(batch) => {
                self.sink.send(batch);
                true
            }
            None => false,
        }
    }

    /// Runs every task queued by earlier render batches. Returns how many ran.
    pub fn run_deferred(&mut self) -> usize {
        let tasks = self.deferred.take_turn();
        for task in &tasks {
            self.renderer
                .run_deferred(&mut self.surface, &self.directory, task);
        }
        tasks.len()
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Applies a listener watch diff directly, bypassing the channel.
    pub fn apply_listener_diff(&mut self, diff: &WatchDiff) {
        self.listeners.apply(&mut self.directory, diff);
    }

    /// Applies listener diffs the engine has delivered since the last call.
    pub fn sync_listeners(&mut self) -> usize {
        self.listeners.drain(&mut self.directory)
    }

    pub fn node_of(&self, instance: &InstanceId) -> Option<NodeKey> {
        self.directory.node_of(instance)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn directory(&self) -> &InstanceDirectory {
        &self.directory
    }

    pub fn pending(&self) -> &PendingInputs {
        &self.pending
    }

    pub fn into_parts(self) -> (S, K) {
        (self.surface, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{FactBatch, Record};
    use dom::{MemorySurface, NativeEventClass};

    #[derive(Default)]
    struct Recorder {
        names: Vec<String>,
        handlers: Vec<DiffHandler>,
    }

    impl Program for Recorder {
        fn bind(&mut self, name: &str, _rule: Rule) {
            self.names.push(format!("bind: {name}"));
        }

        fn commit(&mut self, name: &str, _rule: Rule) {
            self.names.push(format!("commit: {name}"));
        }

        fn watch(&mut self, name: &str, _query: Query, handler: DiffHandler) {
            self.names.push(format!("watch: {name}"));
            self.handlers.push(handler);
        }
    }

    fn bridge() -> Bridge<MemorySurface, Vec<FactBatch>> {
        Bridge::new(MemorySurface::new(), Vec::new(), BridgeConfig::default())
            .with_ids(SequentialIds::new("ev"))
    }

    fn mount(bridge: &mut Bridge<MemorySurface, Vec<FactBatch>>) -> NodeKey {
        bridge
            .apply(&[
                RenderOp::create_instance("i1", "e1", "div"),
                RenderOp::create_root("i1"),
            ])
            .unwrap();
        bridge.node_of(&InstanceId::from("i1")).unwrap()
    }

    #[test]
    fn setup_installs_rules_and_subscribes() {
        let mut bridge = bridge();
        let mut program = Recorder::default();
        bridge.setup(&mut program);
        assert_eq!(program.names.len(), 7);
        assert_eq!(program.handlers.len(), 1);
        assert_eq!(
            bridge.surface().listener_count(),
            NativeEventClass::ALL.len()
        );
        bridge.teardown();
        assert_eq!(bridge.surface().listener_count(), 0);
    }

    #[test]
    fn events_before_setup_are_ignored() {
        let mut bridge = bridge();
        let node = mount(&mut bridge);
        assert!(!bridge.dispatch(&NativeEvent::new(NativeEventClass::Click, node)));
        assert!(bridge.sink().is_empty());
    }

    #[test]
    fn dispatch_sends_one_batch_per_event() {
        let mut bridge = bridge();
        bridge.setup(&mut Recorder::default());
        let node = mount(&mut bridge);
        assert!(bridge.dispatch(&NativeEvent::new(NativeEventClass::Click, node)));
        assert_eq!(bridge.sink().len(), 1);
    }

    #[test]
    fn watch_diffs_reach_flags_before_dispatch() {
        let mut bridge = bridge();
        let mut program = Recorder::default();
        bridge.setup(&mut program);
        let node = mount(&mut bridge);
        let enter = NativeEvent::new(NativeEventClass::MouseEnter, node);
        assert!(!bridge.dispatch(&enter));

        let row = Record::new()
            .with("listener", "hover")
            .with("element", "e1")
            .with("instance", "i1");
        (program.handlers[0])(WatchDiff {
            adds: vec![row],
            removes: vec![],
        });
        assert!(bridge.dispatch(&enter));
    }

    #[test]
    fn listener_rows_ahead_of_their_instance_apply_after_render() {
        let mut bridge = bridge();
        bridge.setup(&mut Recorder::default());
        let row = ListenerRecord::new("hover", "e1".into(), InstanceId::from("i1"));
        bridge.apply_listener_diff(&WatchDiff {
            adds: vec![row.to_record()],
            removes: vec![],
        });
        let node = mount(&mut bridge);
        assert!(bridge.dispatch(&NativeEvent::new(NativeEventClass::MouseEnter, node)));
    }

    #[test]
    fn orphan_root_is_reported() {
        let mut bridge = bridge();
        let err = bridge.apply(&[RenderOp::create_root("nope")]).unwrap_err();
        assert_eq!(err, RenderError::OrphanedInstance(InstanceId::from("nope")));
        assert!(bridge.surface().roots().is_empty());
    }

    #[test]
    fn deferred_tasks_run_on_the_next_turn() {
        let mut bridge = bridge();
        bridge
            .apply(&[
                RenderOp::create_instance("i1", "e1", "input"),
                RenderOp::create_root("i1"),
                RenderOp::add_attribute("i1", "tag", "html/trigger-focus"),
            ])
            .unwrap();
        let node = bridge.node_of(&InstanceId::from("i1")).unwrap();
        assert!(bridge.has_deferred());
        assert_ne!(bridge.surface().focused(), Some(node));
        assert_eq!(bridge.run_deferred(), 1);
        assert_eq!(bridge.surface().focused(), Some(node));
        assert_eq!(bridge.run_deferred(), 0);
    }
}
