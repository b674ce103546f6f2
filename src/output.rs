//! Ordered, style-tagged output values and their YAML rendering.
//!
//! Every scalar carries the presentation style it should be written in, so the
//! rendered document is stable byte for byte. Rendering follows the layout of a
//! block-style PyYAML dump with explicit document markers, which is what the
//! downstream typesetting templates were written against.
//!
//! # Example
//!
//! ```
//! use ojs_meta::{Mapping, Value};
//!
//! let mut mapping = Mapping::new();
//! mapping.insert("title", Value::single_quoted("Minds"));
//! mapping.insert("keywords", Value::Flow(vec!["mind".into(), "brain".into()]));
//!
//! assert_eq!(
//!     mapping.to_yaml(),
//!     "---\ntitle: 'Minds'\nkeywords: [mind, brain]\n...\n"
//! );
//! ```

mod emit;

use serde::{Deserialize, Serialize};

/// A value in the output document, tagged with its presentation style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    /// `null`
    Null,
    /// Unquoted where YAML allows it, quoted otherwise
    Plain(String),
    /// Integer-tagged text, unquoted when it reads as an integer
    Int(String),
    /// `'single quoted'`
    SingleQuoted(String),
    /// `|` literal block
    Literal(String),
    /// `[a, b, c]` list of plain scalars
    Flow(Vec<String>),
    /// Block list
    Seq(Vec<Value>),
    /// Nested block mapping
    Map(Mapping),
}

impl Value {
    pub fn plain(text: impl Into<String>) -> Self {
        Value::Plain(text.into())
    }

    pub fn single_quoted(text: impl Into<String>) -> Self {
        Value::SingleQuoted(text.into())
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Value::Literal(text.into())
    }

    pub fn int(text: impl Into<String>) -> Self {
        Value::Int(text.into())
    }
}

/// String-keyed mapping that keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    entries: Vec<(String, Value)>,
}

impl Mapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, keeping its original position if it is already present.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the mapping as a complete YAML document, from `---` to `...`.
    pub fn to_yaml(&self) -> String {
        emit::emit_document(self)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for (key, value) in iter {
            mapping.insert(key, value);
        }
        mapping
    }
}
