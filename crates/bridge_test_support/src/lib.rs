pub mod fixture;
pub mod program;
pub mod tree;

pub use fixture::{FactFixture, facts_from_toml};
pub use program::MiniProgram;
pub use tree::format_tree;

use bridge::TagNames;
use core_types::{Fact, FactBatch, InstanceId, Value};

/// One line per fact, in batch order.
pub fn format_batch(batch: &FactBatch) -> Vec<String> {
    batch.iter().map(Fact::to_string).collect()
}

/// Snapshot assertion over a batch with a readable diff on mismatch.
#[track_caller]
pub fn assert_batch(batch: &FactBatch, expected: &[&str]) {
    let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    assert_lines(&expected, &format_batch(batch));
}

#[track_caller]
pub fn assert_lines(expected: &[String], actual: &[String]) {
    if expected != actual {
        panic!("snapshot mismatch\n{}", diff_lines(expected, actual));
    }
}

/// Facts the lifecycle manager asserts for a live instance rendering `element`.
pub fn instance_facts(names: &TagNames, instance: &str, element: &str) -> Vec<Fact> {
    let id = InstanceId::from(instance);
    vec![
        Fact::new(id.value().clone(), "tag", names.instance.as_str()),
        Fact::new(id.value().clone(), "element", Value::from(element)),
    ]
}

pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    let max = expected.len().max(actual.len());
    let mut out = String::new();
    use std::fmt::Write;
    let mismatch = (0..max).find(|&i| line(expected, i) != line(actual, i));
    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for idx in start..end {
            let marker = if idx == i { ">" } else { " " };
            let _ = writeln!(&mut out, "{marker} {:>4}  expected: {}", idx + 1, line(expected, idx));
            let _ = writeln!(&mut out, "{marker} {:>4}    actual: {}", idx + 1, line(actual, idx));
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

fn line(lines: &[String], i: usize) -> &str {
    lines.get(i).map(String::as_str).unwrap_or("<missing>")
}
