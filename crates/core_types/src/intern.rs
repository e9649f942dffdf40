//! Value interning shim.
//!
//! The store may hand out numeric handles in place of strings. Anything that
//! ends up as element content or an attribute goes through [`maybe_intern`]
//! first so the visual tree only ever sees stable text.

use crate::value::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves store handles back to the text they stand for.
pub trait Interner {
    fn resolve(&self, handle: u64) -> Option<Arc<str>>;
}

/// Interner that knows no handles; every handle renders as its number.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInterner;

impl Interner for NoInterner {
    fn resolve(&self, _handle: u64) -> Option<Arc<str>> {
        None
    }
}

/// Bidirectional string table handing out sequential handles.
#[derive(Clone, Debug, Default)]
pub struct StringInterner {
    by_text: HashMap<Arc<str>, u64>,
    texts: Vec<Arc<str>>,
}

impl StringInterner {
    pub fn new() -> Self {
        Self {
            by_text: HashMap::new(),
            texts: Vec::new(),
        }
    }

    pub fn intern(&mut self, text: &str) -> Value {
        if let Some(&handle) = self.by_text.get(text) {
            return Value::Handle(handle);
        }
        let handle = self.texts.len() as u64;
        let text: Arc<str> = Arc::from(text);
        self.texts.push(Arc::clone(&text));
        self.by_text.insert(text, handle);
        Value::Handle(handle)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl Interner for StringInterner {
    fn resolve(&self, handle: u64) -> Option<Arc<str>> {
        usize::try_from(handle)
            .ok()
            .and_then(|i| self.texts.get(i))
            .cloned()
    }
}

/// Stable text for a value: text passes through, known handles resolve,
/// unknown handles fall back to their decimal form.
pub fn maybe_intern<'a>(value: &'a Value, interner: &dyn Interner) -> Cow<'a, str> {
    match value {
        Value::Text(s) => Cow::Borrowed(s),
        Value::Handle(h) => match interner.resolve(*h) {
            Some(text) => Cow::Owned(text.to_string()),
            None => Cow::Owned(h.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_passes_through() {
        let v = Value::from("hello");
        assert_eq!(maybe_intern(&v, &NoInterner), "hello");
    }

    #[test]
    fn unknown_handle_renders_as_number() {
        assert_eq!(maybe_intern(&Value::Handle(42), &NoInterner), "42");
    }

    #[test]
    fn interned_handle_resolves() {
        let mut interner = StringInterner::new();
        let a = interner.intern("alpha");
        let b = interner.intern("beta");
        assert_eq!(interner.intern("alpha"), a);
        assert_ne!(a, b);
        assert_eq!(maybe_intern(&b, &interner), "beta");
        assert_eq!(interner.len(), 2);
    }
}
