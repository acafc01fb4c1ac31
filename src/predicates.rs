//! Property matchers and named element predicates
//!
//! A [`Matcher`] is always evaluated against `Option<&PropertyValue>`, where
//! `None` means the element does not carry the property. Only [`Matcher::Absent`]
//! matches a missing property; a [`Matcher::Predicate`] decides for itself.

use crate::condition::Condition;
use crate::element::{ControlType, Pattern, PropertyId, PropertyValue};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Test applied to a single property value
#[derive(Clone)]
pub enum Matcher {
    /// Value equals the given value
    Equals(PropertyValue),

    /// Value equals one of the given values
    OneOf(Vec<PropertyValue>),

    /// Property is present with any value
    Exists,

    /// Property is not present
    Absent,

    /// String value with at least one non-whitespace character
    NonEmpty,

    /// String or enum value matches the regex
    Regex(Regex),

    /// Arbitrary test over the (possibly absent) value
    Predicate(PropertyPredicate),
}

/// Named closure over an optional property value
#[derive(Clone)]
pub struct PropertyPredicate {
    label: String,
    test: Arc<dyn Fn(Option<&PropertyValue>) -> bool + Send + Sync>,
}

impl Matcher {
    pub fn equals(value: impl Into<PropertyValue>) -> Self {
        Matcher::Equals(value.into())
    }

    pub fn one_of<V: Into<PropertyValue>>(values: impl IntoIterator<Item = V>) -> Self {
        Matcher::OneOf(values.into_iter().map(Into::into).collect())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Matcher::Regex(Regex::new(pattern)?))
    }

    pub fn predicate<F>(label: &str, test: F) -> Self
    where
        F: Fn(Option<&PropertyValue>) -> bool + Send + Sync + 'static,
    {
        Matcher::Predicate(PropertyPredicate {
            label: label.to_string(),
            test: Arc::new(test),
        })
    }

    pub fn matches(&self, value: Option<&PropertyValue>) -> bool {
        match self {
            Matcher::Equals(expected) => value == Some(expected),
            Matcher::OneOf(expected) => value.is_some_and(|v| expected.contains(v)),
            Matcher::Exists => value.is_some(),
            Matcher::Absent => value.is_none(),
            Matcher::NonEmpty => value
                .and_then(|v| v.as_str())
                .is_some_and(|s| !s.trim().is_empty()),
            Matcher::Regex(regex) => match value {
                Some(PropertyValue::Str(s)) => regex.is_match(s),
                Some(PropertyValue::Enum { name }) => regex.is_match(name),
                _ => false,
            },
            Matcher::Predicate(predicate) => (predicate.test)(value),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            Matcher::OneOf(v) => f.debug_tuple("OneOf").field(v).finish(),
            Matcher::Exists => f.write_str("Exists"),
            Matcher::Absent => f.write_str("Absent"),
            Matcher::NonEmpty => f.write_str("NonEmpty"),
            Matcher::Regex(r) => f.debug_tuple("Regex").field(&r.as_str()).finish(),
            Matcher::Predicate(p) => f.debug_tuple("Predicate").field(&p.label).finish(),
        }
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Equals(v) => write!(f, "== {}", v),
            Matcher::OneOf(values) => {
                let list: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "in [{}]", list.join(", "))
            }
            Matcher::Exists => f.write_str("exists"),
            Matcher::Absent => f.write_str("is absent"),
            Matcher::NonEmpty => f.write_str("is not empty"),
            Matcher::Regex(r) => write!(f, "=~ /{}/", r.as_str()),
            Matcher::Predicate(p) => write!(f, "satisfies {}", p.label),
        }
    }
}

/// Boolean property equals `value`; absent never matches
pub fn bool_property(id: PropertyId, value: bool) -> Condition {
    Condition::property(id, Matcher::equals(value))
}

pub fn name_not_empty() -> Condition {
    Condition::property(PropertyId::Name, Matcher::NonEmpty)
}

pub fn is_keyboard_focusable() -> Condition {
    bool_property(PropertyId::IsKeyboardFocusable, true)
}

/// Elements are control elements unless they say otherwise
pub fn is_control_element() -> Condition {
    !bool_property(PropertyId::IsControlElement, false)
}

pub fn is_offscreen() -> Condition {
    bool_property(PropertyId::IsOffscreen, true)
}

/// A spreadsheet container, by role or by pattern
pub fn is_spreadsheet() -> Condition {
    Condition::control_type(ControlType::Spreadsheet) | Condition::pattern(Pattern::Spreadsheet)
}

/// Name ends in a common image file extension
pub fn name_looks_like_file_name() -> Result<Condition, regex::Error> {
    Ok(Condition::property(
        PropertyId::Name,
        Matcher::regex(r"(?i)\.(bmp|gif|ico|jpe?g|png|svg|tiff?|webp)$")?,
    ))
}
