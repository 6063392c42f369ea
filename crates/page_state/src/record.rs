//! The page state record and its values.

use indexmap::IndexMap;
use indexmap::map::Iter;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A single state value. Fragment values are text; some keys coerce to flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StateValue {
    /// Plain text value, stored exactly as decoded.
    Text(String),
    /// Boolean flag (for example `debug`).
    Flag(bool),
}

impl StateValue {
    /// Borrow the text payload, if this is a text value.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }

    /// Return the flag payload, if this is a flag value.
    #[inline]
    pub const fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Text(_) => None,
        }
    }
}

impl Display for StateValue {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Text(text) => formatter.write_str(text),
            Self::Flag(flag) => write!(formatter, "{flag}"),
        }
    }
}

impl From<&str> for StateValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for StateValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for StateValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

/// Key/value page state. Iteration follows first-insertion order, which is
/// the order used when the record is encoded back into a fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateRecord {
    values: IndexMap<String, StateValue>,
}

impl StateRecord {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. An existing key keeps its position.
    #[inline]
    pub fn insert<K: Into<String>, V: Into<StateValue>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.values.get(key)
    }

    /// Text value for `key`, or `None` if absent or not text.
    #[inline]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(StateValue::as_text)
    }

    /// Flag value for `key`; absent or non-flag values read as `false`.
    #[inline]
    pub fn flag(&self, key: &str) -> bool {
        self.values
            .get(key)
            .and_then(StateValue::as_flag)
            .unwrap_or(false)
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_, String, StateValue> {
        self.values.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl<'record> IntoIterator for &'record StateRecord {
    type Item = (&'record String, &'record StateValue);
    type IntoIter = Iter<'record, String, StateValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<StateValue>> FromIterator<(K, V)> for StateRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}
