//! Fact-space types shared by every crate in the workspace.

mod fact;
mod intern;
mod value;
mod view;

pub use fact::{Fact, FactBatch, FactChange};
pub use intern::{Interner, NoInterner, StringInterner, maybe_intern};
pub use value::{InstanceId, Value};
pub use view::{FactSet, FactView, Record, WatchDiff};
