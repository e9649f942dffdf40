//! Minimal in-memory rule engine for exercising installed rules.
//!
//! Evaluation order per cycle: binds run to a fixpoint over the base facts,
//! commits run once against that view and their changes land in the base,
//! binds run again, and every watch is diffed against its previous rows.

use bridge::{DiffHandler, Program, Query, Rule};
use core_types::{Fact, FactBatch, FactChange, FactSet, Record, WatchDiff};

/// Fixpoint iterations before a bind set is considered divergent.
const MAX_BIND_ROUNDS: usize = 64;

struct Watch {
    name: String,
    query: Query,
    handler: DiffHandler,
    rows: Vec<Record>,
}

#[derive(Default)]
pub struct MiniProgram {
    base: FactSet,
    binds: Vec<(String, Rule)>,
    commits: Vec<(String, Rule)>,
    watches: Vec<Watch>,
}

impl MiniProgram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, facts: impl IntoIterator<Item = Fact>) {
        self.base.extend(facts);
    }

    pub fn remove(&mut self, fact: &Fact) {
        self.base.remove(fact);
    }

    /// Merges one outbound batch and runs a cycle, as the engine would.
    pub fn ingest(&mut self, batch: FactBatch) -> FactSet {
        self.insert(batch);
        self.evaluate()
    }

    pub fn base(&self) -> &FactSet {
        &self.base
    }

    /// Base facts plus everything the binds derive from them.
    pub fn view(&self) -> FactSet {
        let mut view = self.base.clone();
        for round in 0.. {
            if round == MAX_BIND_ROUNDS {
                log::warn!(target: "mini_program", "binds did not settle");
                break;
            }
            let mut changed = false;
            for (name, rule) in &self.binds {
                for change in rule(&view) {
                    match change {
                        FactChange::Add(fact) => changed |= view.insert(fact),
                        other => log::debug!(
                            target: "mini_program",
                            "bind '{name}' produced non-additive {other:?}"
                        ),
                    }
                }
            }
            if !changed {
                break;
            }
        }
        view
    }

    pub fn evaluate(&mut self) -> FactSet {
        let view = self.view();
        let changes: Vec<FactChange> = self
            .commits
            .iter()
            .flat_map(|(_, rule)| rule(&view))
            .collect();
        for change in &changes {
            self.base.apply(change);
        }
        let view = self.view();
        for watch in &mut self.watches {
            let rows = (watch.query)(&view);
            let diff = WatchDiff {
                adds: rows
                    .iter()
                    .filter(|r| !watch.rows.contains(r))
                    .cloned()
                    .collect(),
                removes: watch
                    .rows
                    .iter()
                    .filter(|r| !rows.contains(r))
                    .cloned()
                    .collect(),
            };
            if !diff.is_empty() {
                log::trace!(target: "mini_program", "watch '{}': {diff:?}", watch.name);
                (watch.handler)(diff);
            }
            watch.rows = rows;
        }
        view
    }
}

impl Program for MiniProgram {
    fn bind(&mut self, name: &str, rule: Rule) {
        self.binds.push((name.to_string(), rule));
    }

    fn commit(&mut self, name: &str, rule: Rule) {
        self.commits.push((name.to_string(), rule));
    }

    fn watch(&mut self, name: &str, query: Query, handler: DiffHandler) {
        self.watches.push(Watch {
            name: name.to_string(),
            query,
            handler,
            rows: Vec::new(),
        });
    }
}
