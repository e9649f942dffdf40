use crate::config::KeyName;
use std::collections::HashMap;
use std::sync::Arc;

/// Key naming for key events.
///
/// Key-down only reports codes present in the override table; key-press
/// reports the printable character the host delivered.
#[derive(Clone, Debug, Default)]
pub struct KeyNames {
    names: HashMap<u32, Arc<str>>,
}

impl KeyNames {
    pub fn new(overrides: &[KeyName]) -> Self {
        Self {
            names: overrides
                .iter()
                .map(|k| (k.code, Arc::from(k.name.as_str())))
                .collect(),
        }
    }

    pub fn name(&self, key_code: u32) -> Option<&str> {
        self.names.get(&key_code).map(|n| &**n)
    }

    /// Printable character for a key-press char code. Code 0 means the host
    /// had no character for the press.
    pub fn decode_char(char_code: u32) -> Option<String> {
        if char_code == 0 {
            return None;
        }
        char::from_u32(char_code).map(String::from)
    }
}
