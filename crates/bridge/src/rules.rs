//! Engine boundary and the rules the bridge installs at setup.
//!
//! The rule engine itself lives elsewhere; [`Program`] is the registration
//! surface it exposes. Rule bodies are plain functions over a read-only
//! [`FactView`], so they run the same against the real engine or an in-memory
//! fact set.

use crate::config::{TagNames, tag_to_class};
use core_types::{FactChange, FactView, Record, Value, WatchDiff};

pub type Rule = Box<dyn Fn(&dyn FactView) -> Vec<FactChange>>;
pub type Query = Box<dyn Fn(&dyn FactView) -> Vec<Record>>;
pub type DiffHandler = Box<dyn FnMut(WatchDiff)>;

/// Rule registration primitives of the engine.
pub trait Program {
    /// Derivation: output holds while the rule's pattern matches.
    fn bind(&mut self, name: &str, rule: Rule);
    /// Output is committed as authoritative fact changes.
    fn commit(&mut self, name: &str, rule: Rule);
    /// Result set is observed; `handler` receives added and removed rows.
    fn watch(&mut self, name: &str, query: Query, handler: DiffHandler);
}

pub fn install_rules(program: &mut dyn Program, names: &TagNames, listener_diffs: DiffHandler) {
    program.bind(
        "All elements add their tags as classes",
        tags_as_classes(names),
    );
    program.commit("Remove events", remove_events(names));
    program.bind(
        "Inputs with an initial but no value use the initial",
        initial_value(names),
    );
    program.commit("Apply input value changes", apply_value_changes(names));
    program.commit("When an element is entered, mark it hovered", hover_in(names));
    program.commit("When an element is left, clear its hovered", hover_out(names));
    program.watch(
        "Hover listeners subscribe their instances",
        hover_listeners(names),
        listener_diffs,
    );
    log::debug!(target: "bridge.rules", "installed rules for prefix {}", names.prefix);
}

pub fn tags_as_classes(names: &TagNames) -> Rule {
    let element = names.element.clone();
    Box::new(move |view: &dyn FactView| {
        let mut out = Vec::new();
        for entity in view.find(&element) {
            for tag in view.values(&entity, "tag") {
                let Some(tag) = tag.as_text() else { continue };
                if tag == element {
                    continue;
                }
                out.push(FactChange::add(&entity, "class", tag_to_class(tag)));
            }
        }
        out
    })
}

/// Event facts live for one evaluation cycle.
pub fn remove_events(names: &TagNames) -> Rule {
    let event = names.event.clone();
    Box::new(move |view: &dyn FactView| {
        view.find(&event)
            .into_iter()
            .map(FactChange::RemoveEntity)
            .collect()
    })
}

pub fn initial_value(names: &TagNames) -> Rule {
    let element = names.element.clone();
    let input = Value::from("input");
    Box::new(move |view: &dyn FactView| {
        let mut out = Vec::new();
        for entity in view.find(&element) {
            if !view.has(&entity, "tagname", &input) || view.first(&entity, "value").is_some() {
                continue;
            }
            if let Some(initial) = view.first(&entity, "initial") {
                out.push(FactChange::add(&entity, "value", initial));
            }
        }
        out
    })
}

/// A change event atomically replaces the element's `value`.
pub fn apply_value_changes(names: &TagNames) -> Rule {
    let change = names.event_class("change");
    Box::new(move |view: &dyn FactView| {
        let mut out = Vec::new();
        for event in view.find(&change) {
            let (Some(element), Some(value)) =
                (view.first(&event, "element"), view.first(&event, "value"))
            else {
                continue;
            };
            out.push(FactChange::remove_attribute(&element, "value"));
            out.push(FactChange::add(&element, "value", value));
        }
        out
    })
}

pub fn hover_in(names: &TagNames) -> Rule {
    let event = names.event_class("hover-in");
    let hovered = names.hovered.clone();
    Box::new(move |view: &dyn FactView| {
        event_elements(view, &event)
            .map(|element| FactChange::add(&element, "tag", hovered.as_str()))
            .collect()
    })
}

pub fn hover_out(names: &TagNames) -> Rule {
    let event = names.event_class("hover-out");
    let hovered = names.hovered.clone();
    Box::new(move |view: &dyn FactView| {
        event_elements(view, &event)
            .map(|element| FactChange::remove(&element, "tag", hovered.as_str()))
            .collect()
    })
}

/// Rows pair an element declared as a hover listener with each live instance
/// rendering it.
pub fn hover_listeners(names: &TagNames) -> Query {
    let listener = names.hover_listener.clone();
    let instance_tag = Value::from(names.instance.as_str());
    Box::new(move |view: &dyn FactView| {
        let mut rows = Vec::new();
        for element in view.find(&listener) {
            for instance in view.entities_with("element", &element) {
                if !view.has(&instance, "tag", &instance_tag) {
                    continue;
                }
                rows.push(
                    Record::new()
                        .with("listener", "hover")
                        .with("element", element.clone())
                        .with("instance", instance),
                );
            }
        }
        rows
    })
}

fn event_elements<'a>(view: &'a dyn FactView, tag: &str) -> impl Iterator<Item = Value> + 'a {
    view.find(tag)
        .into_iter()
        .filter_map(move |event| view.first(&event, "element"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{Fact, FactSet};

    fn names() -> TagNames {
        TagNames::new("html")
    }

    fn set(facts: &[(&str, &str, &str)]) -> FactSet {
        let mut set = FactSet::default();
        set.extend(facts.iter().map(|(e, a, v)| Fact::new(*e, a, *v)));
        set
    }

    #[test]
    fn tags_become_classes_except_the_element_tag() {
        let view = set(&[
            ("e1", "tag", "html/element"),
            ("e1", "tag", "html/autosize-input"),
            ("e2", "tag", "ui/button"),
        ]);
        let out = tags_as_classes(&names())(&view);
        assert_eq!(
            out,
            vec![FactChange::add(
                &Value::from("e1"),
                "class",
                "html-autosize-input"
            )]
        );
    }

    #[test]
    fn events_are_removed_whole() {
        let view = set(&[
            ("ev", "tag", "html/event"),
            ("ev", "tag", "html/event/click"),
        ]);
        assert_eq!(
            remove_events(&names())(&view),
            vec![FactChange::RemoveEntity(Value::from("ev"))]
        );
    }

    #[test]
    fn initial_fills_missing_input_value() {
        let view = set(&[
            ("a", "tag", "html/element"),
            ("a", "tagname", "input"),
            ("a", "initial", "hi"),
            ("b", "tag", "html/element"),
            ("b", "tagname", "input"),
            ("b", "initial", "hi"),
            ("b", "value", "set"),
            ("c", "tag", "html/element"),
            ("c", "tagname", "div"),
            ("c", "initial", "hi"),
        ]);
        assert_eq!(
            initial_value(&names())(&view),
            vec![FactChange::add(&Value::from("a"), "value", "hi")]
        );
    }

    #[test]
    fn change_replaces_value() {
        let view = set(&[
            ("ev", "tag", "html/event/change"),
            ("ev", "element", "a"),
            ("ev", "value", "new"),
        ]);
        let a = Value::from("a");
        assert_eq!(
            apply_value_changes(&names())(&view),
            vec![
                FactChange::remove_attribute(&a, "value"),
                FactChange::add(&a, "value", "new"),
            ]
        );
    }

    #[test]
    fn hover_events_toggle_hovered_tag() {
        let view = set(&[
            ("in", "tag", "html/event/hover-in"),
            ("in", "element", "a"),
            ("out", "tag", "html/event/hover-out"),
            ("out", "element", "b"),
        ]);
        assert_eq!(
            hover_in(&names())(&view),
            vec![FactChange::add(&Value::from("a"), "tag", "html/hovered")]
        );
        assert_eq!(
            hover_out(&names())(&view),
            vec![FactChange::remove(&Value::from("b"), "tag", "html/hovered")]
        );
    }

    #[test]
    fn hover_listener_rows_need_a_live_instance() {
        let view = set(&[
            ("a", "tag", "html/listener/hover"),
            ("i1", "tag", "html/instance"),
            ("i1", "element", "a"),
            ("stray", "element", "a"),
            ("b", "tag", "html/listener/hover"),
        ]);
        let rows = hover_listeners(&names())(&view);
        assert_eq!(
            rows,
            vec![
                Record::new()
                    .with("listener", "hover")
                    .with("element", "a")
                    .with("instance", "i1")
            ]
        );
    }

    #[test]
    fn prefix_flows_into_rules() {
        let names = TagNames::new("ui");
        let view = set(&[("ev", "tag", "ui/event"), ("x", "tag", "html/event")]);
        assert_eq!(
            remove_events(&names)(&view),
            vec![FactChange::RemoveEntity(Value::from("ev"))]
        );
    }
}
