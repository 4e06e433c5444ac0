//! The immutable access-attempt record presented to the [`crate::policy`]
//! matching machinery.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// `subject`, `action`, and `resource` are each either a bare scalar or an
/// attribute map — mirroring the shape a policy's match elements can take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InquiryValue {
    Scalar(Value),
    Attributes(BTreeMap<String, Value>),
}

impl InquiryValue {
    /// The scalar this inquiry value represents, if it is one.
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            InquiryValue::Scalar(v) => Some(v),
            InquiryValue::Attributes(_) => None,
        }
    }

    /// The attribute map this inquiry value represents, if it is one.
    pub fn as_attributes(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            InquiryValue::Attributes(m) => Some(m),
            InquiryValue::Scalar(_) => None,
        }
    }

    /// Render this inquiry value as a plain string, for checkers that only
    /// deal in strings (the string-exact and string-fuzzy checkers). Only
    /// scalar strings render; anything else is `None`.
    pub fn as_plain_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Value::as_str)
    }
}

impl From<&str> for InquiryValue {
    fn from(s: &str) -> Self {
        InquiryValue::Scalar(Value::from(s))
    }
}

impl From<Value> for InquiryValue {
    fn from(v: Value) -> Self {
        InquiryValue::Scalar(v)
    }
}

/// A concrete access attempt: who, doing what, to which resource, under what
/// context. Immutable once constructed — nothing in the engine mutates an
/// `Inquiry` after it is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub subject: InquiryValue,
    pub action: InquiryValue,
    pub resource: InquiryValue,
    #[serde(default)]
    pub context: BTreeMap<String, Value>,
}

impl Inquiry {
    /// Build an inquiry from three plain strings and an empty context — the
    /// common case exercised by most tests and the CLI demo.
    pub fn new(subject: impl Into<String>, action: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            subject: InquiryValue::from(subject.into().as_str()),
            action: InquiryValue::from(action.into().as_str()),
            resource: InquiryValue::from(resource.into().as_str()),
            context: BTreeMap::new(),
        }
    }

    /// Attach a context attribute, builder-style.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}
