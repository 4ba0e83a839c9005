use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::keys::ItemKey;

/// A backend-neutral stored record: attribute name to value.
pub type Item = BTreeMap<String, AttrValue>;

/// Continuation cursor for paged reads: the last key a page evaluated.
pub type Cursor = ItemKey;

/// The attribute value types the table uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    S(String),
    N(i64),
    Bool(bool),
    StrList(Vec<String>),
    Null,
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::N(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str_list(&self) -> Option<&[String]> {
        match self {
            Self::StrList(list) => Some(list),
            _ => None,
        }
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::S(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::S(value.to_string())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        Self::N(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(value: Vec<String>) -> Self {
        Self::StrList(value)
    }
}

impl<T: Into<AttrValue>> From<Option<T>> for AttrValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One page of a `query` or `scan`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Item>,
    /// Present when more results remain; pass it back to read the next page.
    pub cursor: Option<Cursor>,
}

/// Condition attached to a `put`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutCondition {
    /// Unconditional write; overwrites any existing record.
    Always,
    /// Only write if no record exists under the key.
    IfAbsent,
    /// Only write if a record exists and `name` currently equals `value`.
    IfAttributeEquals { name: String, value: AttrValue },
}

impl PutCondition {
    /// Evaluates the condition against the record currently stored under the key.
    pub fn holds(&self, existing: Option<&Item>) -> bool {
        match self {
            Self::Always => true,
            Self::IfAbsent => existing.is_none(),
            Self::IfAttributeEquals { name, value } => {
                existing.and_then(|item| item.get(name)) == Some(value)
            }
        }
    }
}
