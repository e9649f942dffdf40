//! Event Translator: native events in, fact batches out.
//!
//! Every batch describes exactly one event record: a generic event tag, a
//! class-specific tag, and `element` components. Pointer and key events carry
//! one `element` per managed ancestor, innermost first, with the origin marked
//! by a direct-target component; content, focus and hover events name only
//! their target. Events whose target is not a managed instance produce nothing.

use crate::config::TagNames;
use crate::directory::InstanceDirectory;
use crate::ids::IdGenerator;
use crate::keys::KeyNames;
use crate::pending::PendingInputs;
use crate::render::set_size_from_content;
use core_types::{Fact, FactBatch, Value};
use dom::{HostSurface, NativeEvent, NativeEventClass, NodeKey};

/// Name of the fact-level event class a native event class reports as.
pub fn event_name(class: NativeEventClass) -> &'static str {
    match class {
        NativeEventClass::Click => "click",
        NativeEventClass::DoubleClick => "double-click",
        NativeEventClass::MouseDown => "mouse-down",
        NativeEventClass::MouseUp => "mouse-up",
        NativeEventClass::Input => "change",
        NativeEventClass::KeyDown | NativeEventClass::KeyPress => "key-press",
        NativeEventClass::Focus => "focus",
        NativeEventClass::Blur => "blur",
        NativeEventClass::MouseEnter => "hover-in",
        NativeEventClass::MouseLeave => "hover-out",
    }
}

/// Borrowed state event translation reads and writes.
pub struct TranslateCtx<'a, S: HostSurface + ?Sized> {
    pub surface: &'a mut S,
    pub directory: &'a InstanceDirectory,
    pub pending: &'a mut PendingInputs,
}

pub struct EventTranslator {
    names: TagNames,
    keys: KeyNames,
    ids: Box<dyn IdGenerator>,
}

impl std::fmt::Debug for EventTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTranslator")
            .field("names", &self.names)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

impl EventTranslator {
    pub fn new(names: TagNames, keys: KeyNames, ids: Box<dyn IdGenerator>) -> Self {
        Self { names, keys, ids }
    }

    pub fn set_ids(&mut self, ids: Box<dyn IdGenerator>) {
        self.ids = ids;
    }

    /// Synthesizes the fact batch for one native event, or `None` when the
    /// event is ignored.
    pub fn translate<S: HostSurface + ?Sized>(
        &mut self,
        ctx: &mut TranslateCtx<'_, S>,
        event: &NativeEvent,
    ) -> Option<FactBatch> {
        let batch = match event.class {
            NativeEventClass::Click
            | NativeEventClass::DoubleClick
            | NativeEventClass::MouseDown
            | NativeEventClass::MouseUp => self.pointer(ctx, event),
            NativeEventClass::Input => self.input(ctx, event),
            NativeEventClass::KeyDown | NativeEventClass::KeyPress => self.key(ctx, event),
            NativeEventClass::Focus | NativeEventClass::Blur => self.focus(ctx, event),
            NativeEventClass::MouseEnter | NativeEventClass::MouseLeave => self.hover(ctx, event),
        };
        match &batch {
            Some(batch) => log::trace!(
                target: "bridge.events",
                "{:?} on {:?}: {} facts",
                event.class,
                event.target,
                batch.len()
            ),
            None => log::trace!(
                target: "bridge.events",
                "{:?} on {:?}: ignored",
                event.class,
                event.target
            ),
        }
        batch.filter(|b| !b.is_empty())
    }

    fn pointer<S: HostSurface + ?Sized>(
        &mut self,
        ctx: &mut TranslateCtx<'_, S>,
        event: &NativeEvent,
    ) -> Option<FactBatch> {
        if !ctx.directory.is_instance(event.target) {
            return None;
        }
        let (id, mut batch) = self.start(event.class);
        self.push_bubble_chain(&mut batch, ctx, &id, event.target);
        Some(batch)
    }

    fn key<S: HostSurface + ?Sized>(
        &mut self,
        ctx: &mut TranslateCtx<'_, S>,
        event: &NativeEvent,
    ) -> Option<FactBatch> {
        if event.key.repeat {
            return None;
        }
        if !ctx.directory.is_instance(event.target) {
            return None;
        }
        let key = match event.class {
            NativeEventClass::KeyPress => KeyNames::decode_char(event.key.char_code)?,
            _ => self.keys.name(event.key.key_code)?.to_string(),
        };
        let (id, mut batch) = self.start(event.class);
        batch.add(&id, "key", key);
        self.push_bubble_chain(&mut batch, ctx, &id, event.target);
        Some(batch)
    }

    fn input<S: HostSurface + ?Sized>(
        &mut self,
        ctx: &mut TranslateCtx<'_, S>,
        event: &NativeEvent,
    ) -> Option<FactBatch> {
        let (_, record) = ctx.directory.instance_at(event.target)?;
        let element = record.element.clone();
        let node = event.target;

        // Already inside a native event turn, so the node is attached.
        if ctx.surface.is_text_input(node) && ctx.surface.has_class(node, &self.names.autosize_class)
        {
            set_size_from_content(&mut *ctx.surface, node);
        }
        let value = ctx.surface.value(node).unwrap_or_default();
        ctx.pending.record(&element, &value);

        let (id, mut batch) = self.start(event.class);
        batch.add(&id, "element", element);
        batch.add(&id, "value", value);
        Some(batch)
    }

    fn focus<S: HostSurface + ?Sized>(
        &mut self,
        ctx: &mut TranslateCtx<'_, S>,
        event: &NativeEvent,
    ) -> Option<FactBatch> {
        let (_, record) = ctx.directory.instance_at(event.target)?;
        let element = record.element.clone();
        let (id, mut batch) = self.start(event.class);
        batch.add(&id, "element", element);
        if let Some(value) = ctx.surface.value(event.target) {
            batch.add(&id, "value", value);
        }
        Some(batch)
    }

    fn hover<S: HostSurface + ?Sized>(
        &mut self,
        ctx: &mut TranslateCtx<'_, S>,
        event: &NativeEvent,
    ) -> Option<FactBatch> {
        let (_, record) = ctx.directory.instance_at(event.target)?;
        if !record.listeners.get("hover") {
            return None;
        }
        let element = record.element.clone();
        let (id, mut batch) = self.start(event.class);
        batch.add(&id, "element", element);
        Some(batch)
    }

    fn start(&mut self, class: NativeEventClass) -> (Value, FactBatch) {
        let id = self.ids.next_id();
        let mut batch = FactBatch::new();
        batch.add(&id, "tag", self.names.event.as_str());
        batch.add(&id, "tag", self.names.event_class(event_name(class)));
        (id, batch)
    }

    /// One `element` component per managed node from `target` outwards.
    fn push_bubble_chain<S: HostSurface + ?Sized>(
        &self,
        batch: &mut FactBatch,
        ctx: &TranslateCtx<'_, S>,
        id: &Value,
        target: NodeKey,
    ) {
        let mut current = Some(target);
        while let Some(node) = current {
            if let Some((_, record)) = ctx.directory.instance_at(node) {
                let extra = if node == target {
                    vec![Value::from(self.names.direct_target.as_str())]
                } else {
                    Vec::new()
                };
                batch.push(Fact::compound(
                    id.clone(),
                    "element",
                    record.element.clone(),
                    extra,
                ));
            }
            current = ctx.surface.parent(node);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::directory::InstanceRecord;
    use crate::ids::SequentialIds;
    use core_types::InstanceId;
    use dom::MemorySurface;

    struct Harness {
        surface: MemorySurface,
        directory: InstanceDirectory,
        pending: PendingInputs,
        translator: EventTranslator,
    }

    impl Harness {
        fn new() -> Self {
            let config = BridgeConfig::default();
            Self {
                surface: MemorySurface::new(),
                directory: InstanceDirectory::new(),
                pending: PendingInputs::new(),
                translator: EventTranslator::new(
                    config.tag_names(),
                    KeyNames::new(&config.key_names),
                    Box::new(SequentialIds::new("ev")),
                ),
            }
        }

        fn instance(&mut self, id: &str, tag: &str, parent: Option<NodeKey>) -> NodeKey {
            let node = self.surface.create_element(tag);
            match parent {
                Some(parent) => self.surface.append_child(parent, node),
                None => self.surface.append_root(node),
            }
            self.directory.insert(
                InstanceId::from(id),
                InstanceRecord::new(node, Value::from(format!("e-{id}"))),
            );
            node
        }

        fn translate(&mut self, event: NativeEvent) -> Option<FactBatch> {
            let mut ctx = TranslateCtx {
                surface: &mut self.surface,
                directory: &self.directory,
                pending: &mut self.pending,
            };
            self.translator.translate(&mut ctx, &event)
        }
    }

    fn lines(batch: &FactBatch) -> Vec<String> {
        batch.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn click_replicates_bubble_chain_innermost_first() {
        let mut h = Harness::new();
        let gp = h.instance("gp", "div", None);
        let p = h.instance("p", "div", Some(gp));
        let c = h.instance("c", "span", Some(p));
        let batch = h
            .translate(NativeEvent::new(NativeEventClass::MouseDown, c))
            .unwrap();
        assert_eq!(
            lines(&batch),
            vec![
                "[ev-1 tag html/event]",
                "[ev-1 tag html/event/mouse-down]",
                "[ev-1 element e-c html/direct-target]",
                "[ev-1 element e-p]",
                "[ev-1 element e-gp]",
            ]
        );
    }

    #[test]
    fn unmanaged_ancestors_are_skipped() {
        let mut h = Harness::new();
        let outer = h.instance("outer", "div", None);
        let wrapper = h.surface.create_element("div");
        h.surface.append_child(outer, wrapper);
        let inner = h.instance("inner", "button", Some(wrapper));
        let batch = h
            .translate(NativeEvent::new(NativeEventClass::Click, inner))
            .unwrap();
        let elements: Vec<_> = batch.values_of("element").cloned().collect();
        assert_eq!(elements, vec![Value::from("e-inner"), Value::from("e-outer")]);
    }

    #[test]
    fn unmanaged_target_is_ignored() {
        let mut h = Harness::new();
        let stray = h.surface.create_element("div");
        h.surface.append_root(stray);
        assert!(h.translate(NativeEvent::new(NativeEventClass::Click, stray)).is_none());
        assert!(h.translate(NativeEvent::key_down(stray, 13, false)).is_none());
    }

    #[test]
    fn double_click_uses_hyphenated_class() {
        let mut h = Harness::new();
        let n = h.instance("a", "div", None);
        let batch = h
            .translate(NativeEvent::new(NativeEventClass::DoubleClick, n))
            .unwrap();
        assert!(lines(&batch).contains(&"[ev-1 tag html/event/double-click]".to_string()));
    }

    #[test]
    fn key_down_names_control_codes() {
        let mut h = Harness::new();
        let form = h.instance("form", "div", None);
        let input = h.instance("input", "input", Some(form));
        let batch = h.translate(NativeEvent::key_down(input, 13, false)).unwrap();
        assert_eq!(
            lines(&batch),
            vec![
                "[ev-1 tag html/event]",
                "[ev-1 tag html/event/key-press]",
                "[ev-1 key enter]",
                "[ev-1 element e-input html/direct-target]",
                "[ev-1 element e-form]",
            ]
        );
    }

    #[test]
    fn key_down_without_name_is_dropped() {
        let mut h = Harness::new();
        let n = h.instance("a", "input", None);
        assert!(h.translate(NativeEvent::key_down(n, 65, false)).is_none());
    }

    #[test]
    fn key_repeat_is_suppressed() {
        let mut h = Harness::new();
        let n = h.instance("a", "input", None);
        assert!(h.translate(NativeEvent::key_down(n, 16, false)).is_some());
        assert!(h.translate(NativeEvent::key_down(n, 16, true)).is_none());
    }

    #[test]
    fn key_press_decodes_character() {
        let mut h = Harness::new();
        let n = h.instance("a", "input", None);
        let batch = h.translate(NativeEvent::key_press(n, 'x' as u32)).unwrap();
        assert_eq!(batch.values_of("key").next(), Some(&Value::from("x")));
    }

    #[test]
    fn input_reports_value_and_buffers_it() {
        let mut h = Harness::new();
        let n = h.instance("a", "input", None);
        h.surface.set_value(n, "hey");
        let batch = h.translate(NativeEvent::new(NativeEventClass::Input, n)).unwrap();
        assert_eq!(
            lines(&batch),
            vec![
                "[ev-1 tag html/event]",
                "[ev-1 tag html/event/change]",
                "[ev-1 element e-a]",
                "[ev-1 value hey]",
            ]
        );
        assert_eq!(h.pending.sent(&Value::from("e-a")), &["hey"]);
    }

    #[test]
    fn input_resizes_autosize_inputs_immediately() {
        let mut h = Harness::new();
        let n = h.instance("a", "input", None);
        h.surface.add_class(n, "html-autosize-input");
        h.surface.set_value(n, "abc");
        h.translate(NativeEvent::new(NativeEventClass::Input, n));
        assert_eq!(h.surface.size(n), Some(3));
        h.surface.set_value(n, "");
        h.translate(NativeEvent::new(NativeEventClass::Input, n));
        assert_eq!(h.surface.size(n), Some(1));
    }

    #[test]
    fn focus_names_only_target_with_value() {
        let mut h = Harness::new();
        let outer = h.instance("outer", "div", None);
        let input = h.instance("in", "input", Some(outer));
        h.surface.set_value(input, "v");
        let batch = h.translate(NativeEvent::new(NativeEventClass::Focus, input)).unwrap();
        let elements: Vec<_> = batch.values_of("element").cloned().collect();
        assert_eq!(elements, vec![Value::from("e-in")]);
        assert_eq!(batch.values_of("value").next(), Some(&Value::from("v")));

        let batch = h.translate(NativeEvent::new(NativeEventClass::Blur, outer)).unwrap();
        assert!(lines(&batch).contains(&"[ev-2 tag html/event/blur]".to_string()));
        assert_eq!(batch.values_of("value").count(), 0);
    }

    #[test]
    fn hover_requires_listener_flag() {
        let mut h = Harness::new();
        let n = h.instance("a", "div", None);
        assert!(h.translate(NativeEvent::new(NativeEventClass::MouseEnter, n)).is_none());
        h.directory
            .get_mut(&InstanceId::from("a"))
            .unwrap()
            .listeners
            .set("hover", true);
        let batch = h
            .translate(NativeEvent::new(NativeEventClass::MouseLeave, n))
            .unwrap();
        assert_eq!(
            lines(&batch),
            vec![
                "[ev-1 tag html/event]",
                "[ev-1 tag html/event/hover-out]",
                "[ev-1 element e-a]",
            ]
        );
    }
}
