//! Headless replay: drives a bridge over an in-memory surface from a TOML
//! scenario and prints every fact batch it emits.
//!
//! Usage: `eavdom <scenario.toml>`; `RUST_LOG=trace` shows the bridge's flow.

mod scenario;

use bridge::{Bridge, DiffHandler, Program, Query, RenderError, RenderOp, Rule, SequentialIds};
use bus::Bus;
use core_types::{FactBatch, InstanceId};
use dom::{HostSurface, MemorySurface, NativeEvent, NativeEventClass, NodeKey};
use mimalloc::MiMalloc;
use scenario::{Scenario, Step};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::mpsc::Sender;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Debug, thiserror::Error)]
enum ReplayError {
    #[error("usage: eavdom <scenario.toml>")]
    Usage,
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("step {step}: {source}")]
    Render {
        step: usize,
        #[source]
        source: RenderError,
    },
    #[error("step {step}: unknown instance '{instance}'")]
    UnknownInstance { step: usize, instance: InstanceId },
    #[error("step {step}: unknown event class '{class}'")]
    UnknownEventClass { step: usize, class: String },
}

/// Stands in for the rule engine; registrations are only logged.
struct DetachedProgram;

impl Program for DetachedProgram {
    fn bind(&mut self, name: &str, _rule: Rule) {
        log::debug!(target: "replay", "bind: {name}");
    }

    fn commit(&mut self, name: &str, _rule: Rule) {
        log::debug!(target: "replay", "commit: {name}");
    }

    fn watch(&mut self, name: &str, _query: Query, _handler: DiffHandler) {
        log::debug!(target: "replay", "watch: {name} (diffs are scripted)");
    }
}

type ReplayBridge = Bridge<MemorySurface, Sender<FactBatch>>;

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!(target: "replay", "{err}");
            eprintln!("eavdom: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ReplayError> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .ok_or(ReplayError::Usage)?;
    let source = std::fs::read_to_string(&path).map_err(|source| ReplayError::Io {
        path: path.clone(),
        source,
    })?;
    let scenario: Scenario = toml::from_str(&source)?;
    log::info!(
        target: "replay",
        "{}: {} steps, prefix {}",
        path.display(),
        scenario.steps.len(),
        scenario.bridge.tag_prefix
    );

    let bus = Bus::new();
    let mut bridge = Bridge::new(MemorySurface::new(), bus.batch_tx.clone(), scenario.bridge)
        .with_ids(SequentialIds::default());
    bridge.setup(&mut DetachedProgram);

    let mut emitted = 0;
    for (index, step) in scenario.steps.into_iter().enumerate() {
        let step_no = index + 1;
        run_step(&mut bridge, step_no, step)?;
        for batch in bus.drain() {
            emitted += 1;
            println!("batch {emitted} (step {step_no})");
            for fact in batch.iter() {
                println!("  {fact}");
            }
        }
    }

    bridge.teardown();
    log::info!(
        target: "replay",
        "done: {emitted} batches, {} live instances, {} buffered input values",
        bridge.directory().len(),
        bridge.pending().total()
    );
    let (surface, _tx) = bridge.into_parts();
    log::debug!(target: "replay", "{} roots left on the surface", surface.roots().len());
    Ok(())
}

fn run_step(bridge: &mut ReplayBridge, step_no: usize, step: Step) -> Result<(), ReplayError> {
    match step {
        Step::Render(ops) => {
            let ops: Vec<RenderOp> = ops.into_iter().map(RenderOp::from).collect();
            bridge
                .apply(&ops)
                .map_err(|source| ReplayError::Render {
                    step: step_no,
                    source,
                })?;
        }
        Step::Event(event) => {
            let class = event
                .native_class()
                .ok_or_else(|| ReplayError::UnknownEventClass {
                    step: step_no,
                    class: event.class.clone(),
                })?;
            let target = resolve(bridge, step_no, &event.target)?;
            if !bridge.dispatch(&event.to_native(class, target)) {
                log::info!(target: "replay", "step {step_no}: {} produced no facts", event.class);
            }
        }
        Step::Type { target, value } => {
            let node = resolve(bridge, step_no, &target)?;
            bridge.surface_mut().set_value(node, &value);
            bridge.dispatch(&NativeEvent::new(NativeEventClass::Input, node));
        }
        Step::Listener(listener) => bridge.apply_listener_diff(&listener.to_diff()),
        Step::RunDeferred {} => {
            let ran = bridge.run_deferred();
            log::debug!(target: "replay", "step {step_no}: ran {ran} deferred tasks");
        }
    }
    Ok(())
}

fn resolve(
    bridge: &ReplayBridge,
    step: usize,
    instance: &InstanceId,
) -> Result<NodeKey, ReplayError> {
    bridge
        .node_of(instance)
        .ok_or_else(|| ReplayError::UnknownInstance {
            step,
            instance: instance.clone(),
        })
}
