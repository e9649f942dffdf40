use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Entity or value slot of a fact.
///
/// The store hands out either interned text or opaque numeric handles; the two
/// never compare equal to each other, even when the handle would intern to the
/// same text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawValue")]
pub enum Value {
    Text(Arc<str>),
    Handle(u64),
}

impl Value {
    pub fn text(s: impl Into<Arc<str>>) -> Self {
        Value::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Handle(_) => None,
        }
    }

    pub fn is_text(&self, s: &str) -> bool {
        self.as_text() == Some(s)
    }

    /// Ordering used for sibling sort keys: numeric when both sides read as
    /// numbers, lexicographic otherwise. Handles sort before text.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Handle(a), Value::Handle(b)) => a.cmp(b),
            (Value::Handle(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Handle(_)) => Ordering::Greater,
            (Value::Text(a), Value::Text(b)) => {
                match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
                    (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                    _ => a.cmp(b),
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Handle(h) => write!(f, "#{h}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(Arc::from(s))
    }
}

impl From<u64> for Value {
    fn from(h: u64) -> Self {
        Value::Handle(h)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Handle(u64),
    Text(String),
}

impl From<RawValue> for Value {
    fn from(raw: RawValue) -> Self {
        match raw {
            RawValue::Handle(h) => Value::Handle(h),
            RawValue::Text(s) => Value::from(s),
        }
    }
}

/// Identifier the instance-lifecycle manager assigns to a live visual instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(pub Value);

impl InstanceId {
    pub fn value(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        InstanceId(Value::from(s))
    }
}

impl From<u64> for InstanceId {
    fn from(h: u64) -> Self {
        InstanceId(Value::Handle(h))
    }
}

impl From<Value> for InstanceId {
    fn from(v: Value) -> Self {
        InstanceId(v)
    }
}
