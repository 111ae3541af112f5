// src/dump/value.rs

//! One value parsed from a badging dump line

use std::collections::HashMap;

/// A single parsed badging value.
///
/// Each dump line produces exactly one of these shapes. Repeated keys are
/// combined with [`ParsedValue::merge`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedValue {
    /// A lone quoted token, e.g. `sdkVersion:'21'`.
    Scalar(String),
    /// Several quoted tokens, e.g. `locales: 'en' 'ja' 'de'`.
    List(Vec<String>),
    /// `name='value'` pairs, e.g. `package: name='com.example' versionCode='1'`.
    Map(HashMap<String, String>),
}

impl ParsedValue {
    /// The scalar view of this value: the string itself, or the first list
    /// element. Maps have no scalar view.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(items) => items.first().map(String::as_str),
            Self::Map(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&HashMap<String, String>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up an entry of a Map value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.as_map().and_then(|m| m.get(name)).map(String::as_str)
    }

    /// Combine this value with a later value parsed for the same key.
    ///
    /// Two Maps merge entrywise with the new entries winning. Every other
    /// pairing coerces the existing value to a List and appends the new one
    /// (concatenating elementwise when the new value is itself a List).
    pub fn merge(self, new: ParsedValue) -> ParsedValue {
        match (self, new) {
            (Self::Map(mut existing), Self::Map(new)) => {
                existing.extend(new);
                Self::Map(existing)
            }
            (existing, new) => {
                let mut items = existing.into_items();
                match new {
                    Self::List(more) => items.extend(more),
                    other => items.extend(other.into_items()),
                }
                Self::List(items)
            }
        }
    }

    /// Flatten into a list of strings. Map entries become `name='value'`
    /// tokens in key order, a shape that only arises when a Map key is
    /// later repeated with a non-Map value.
    fn into_items(self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s],
            Self::List(items) => items,
            Self::Map(entries) => {
                let mut pairs: Vec<_> = entries.into_iter().collect();
                pairs.sort();
                pairs
                    .into_iter()
                    .map(|(k, v)| format!("{}='{}'", k, v))
                    .collect()
            }
        }
    }
}
