//! Replay scenario file format.
//!
//! ```toml
//! [bridge]
//! tag_prefix = "html"
//!
//! [[steps]]
//! render = [
//!   { op = "create-instance", instance = "i1", element = "e1", tag-name = "div" },
//!   { op = "create-root", instance = "i1" },
//! ]
//!
//! [[steps]]
//! event = { class = "click", target = "i1" }
//! ```

use bridge::{BridgeConfig, ListenerRecord, RenderOp};
use core_types::{InstanceId, Value, WatchDiff};
use dom::{KeyInfo, NativeEvent, NativeEventClass, NodeKey};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    pub bridge: BridgeConfig,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub enum Step {
    /// One render batch, applied atomically.
    Render(Vec<ScriptOp>),
    Event(ScriptEvent),
    /// Replace an input's content, then deliver the native input event.
    Type { target: InstanceId, value: String },
    Listener(ScriptListener),
    RunDeferred {},
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case", deny_unknown_fields)]
pub enum ScriptOp {
    #[serde(rename_all = "kebab-case")]
    CreateInstance {
        instance: InstanceId,
        element: Value,
        tag_name: String,
    },
    CreateRoot {
        instance: InstanceId,
    },
    AttachChild {
        parent: InstanceId,
        child: InstanceId,
        #[serde(default)]
        sort: Option<Value>,
    },
    AddAttribute {
        instance: InstanceId,
        attribute: String,
        value: Value,
    },
    RemoveAttribute {
        instance: InstanceId,
        attribute: String,
        value: Value,
    },
    DestroyInstance {
        instance: InstanceId,
    },
}

impl From<ScriptOp> for RenderOp {
    fn from(op: ScriptOp) -> Self {
        match op {
            ScriptOp::CreateInstance {
                instance,
                element,
                tag_name,
            } => RenderOp::create_instance(instance, element, &tag_name),
            ScriptOp::CreateRoot { instance } => RenderOp::create_root(instance),
            ScriptOp::AttachChild {
                parent,
                child,
                sort,
            } => RenderOp::attach_child(parent, child, sort),
            ScriptOp::AddAttribute {
                instance,
                attribute,
                value,
            } => RenderOp::add_attribute(instance, &attribute, value),
            ScriptOp::RemoveAttribute {
                instance,
                attribute,
                value,
            } => RenderOp::remove_attribute(instance, &attribute, value),
            ScriptOp::DestroyInstance { instance } => RenderOp::destroy_instance(instance),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ScriptEvent {
    /// Host event name: `click`, `dblclick`, `keydown`, `mouseenter`, ...
    pub class: String,
    pub target: InstanceId,
    #[serde(default)]
    pub key_code: u32,
    #[serde(default)]
    pub char_code: u32,
    #[serde(default)]
    pub repeat: bool,
}

impl ScriptEvent {
    pub fn native_class(&self) -> Option<NativeEventClass> {
        let class = match self.class.as_str() {
            "click" => NativeEventClass::Click,
            "dblclick" => NativeEventClass::DoubleClick,
            "mousedown" => NativeEventClass::MouseDown,
            "mouseup" => NativeEventClass::MouseUp,
            "input" => NativeEventClass::Input,
            "keydown" => NativeEventClass::KeyDown,
            "keypress" => NativeEventClass::KeyPress,
            "focus" => NativeEventClass::Focus,
            "blur" => NativeEventClass::Blur,
            "mouseenter" => NativeEventClass::MouseEnter,
            "mouseleave" => NativeEventClass::MouseLeave,
            _ => return None,
        };
        Some(class)
    }

    pub fn to_native(&self, class: NativeEventClass, target: NodeKey) -> NativeEvent {
        NativeEvent {
            class,
            target,
            key: KeyInfo {
                key_code: self.key_code,
                char_code: self.char_code,
                repeat: self.repeat,
            },
        }
    }
}

/// A scripted row entering or leaving the hover listener watch.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptListener {
    #[serde(default = "default_listener")]
    pub listener: String,
    pub element: Value,
    pub instance: InstanceId,
    #[serde(default)]
    pub remove: bool,
}

fn default_listener() -> String {
    "hover".to_string()
}

impl ScriptListener {
    pub fn to_diff(&self) -> WatchDiff {
        let row =
            ListenerRecord::new(&self.listener, self.element.clone(), self.instance.clone())
                .to_record();
        if self.remove {
            WatchDiff {
                adds: Vec::new(),
                removes: vec![row],
            }
        } else {
            WatchDiff {
                adds: vec![row],
                removes: Vec::new(),
            }
        }
    }
}
