use serde::Deserialize;

/// Construction-time configuration for a [`Bridge`](crate::Bridge).
///
/// Every reserved tag the bridge reads or writes is derived from `tag_prefix`,
/// so a specialised renderer picks its namespace here instead of overriding a
/// field after the fact.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub tag_prefix: String,
    /// Readable names for control key codes delivered on key-down.
    pub key_names: Vec<KeyName>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct KeyName {
    pub code: u32,
    pub name: String,
}

impl KeyName {
    fn new(code: u32, name: &str) -> Self {
        Self {
            code,
            name: name.to_string(),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tag_prefix: "html".to_string(),
            key_names: vec![
                KeyName::new(13, "enter"),
                KeyName::new(16, "shift"),
                KeyName::new(17, "control"),
                KeyName::new(18, "alt"),
                KeyName::new(27, "escape"),
                KeyName::new(91, "meta"),
            ],
        }
    }
}

impl BridgeConfig {
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    pub fn tag_names(&self) -> TagNames {
        TagNames::new(&self.tag_prefix)
    }
}

/// Reserved tag and class strings for one prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagNames {
    pub prefix: String,
    pub element: String,
    pub instance: String,
    pub event: String,
    pub direct_target: String,
    pub autosize_input: String,
    pub trigger_focus: String,
    /// Class the tag-to-class rule derives from `autosize_input`.
    pub autosize_class: String,
    pub hover_listener: String,
    pub hovered: String,
}

impl TagNames {
    pub fn new(prefix: &str) -> Self {
        let autosize_input = format!("{prefix}/autosize-input");
        Self {
            prefix: prefix.to_string(),
            element: format!("{prefix}/element"),
            instance: format!("{prefix}/instance"),
            event: format!("{prefix}/event"),
            direct_target: format!("{prefix}/direct-target"),
            autosize_class: tag_to_class(&autosize_input),
            autosize_input,
            trigger_focus: format!("{prefix}/trigger-focus"),
            hover_listener: format!("{prefix}/listener/hover"),
            hovered: format!("{prefix}/hovered"),
        }
    }

    /// Tag carried by events of one class, e.g. `html/event/click`.
    pub fn event_class(&self, class: &str) -> String {
        format!("{}/{class}", self.event)
    }
}

/// Display class derived from a tag: every `/` becomes `-`.
pub fn tag_to_class(tag: &str) -> String {
    tag.replace('/', "-")
}
