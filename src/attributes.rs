//! Lazily-loaded resource data.
//!
//! [`Lazy`] is the two-state holder every resource uses for data that needs
//! an extra request; [`Attributes`] is the raw JSON bag kept alongside the
//! typed fields so callers can reach provider keys the models don't name.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ClcError, Result};
use crate::naming;

/// Data that is either not yet fetched or fetched and cached.
#[derive(Debug, Clone, Default)]
pub enum Lazy<T> {
    #[default]
    Unloaded,
    Loaded(T),
}

impl<T> Lazy<T> {
    /// Returns true once data has been stored.
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    /// Borrow the data if loaded.
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Unloaded => None,
        }
    }

    /// Mutably borrow the data if loaded.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Unloaded => None,
        }
    }

    /// Store freshly fetched data, replacing anything cached.
    pub fn set(&mut self, value: T) {
        *self = Self::Loaded(value);
    }

    /// Drop cached data so the next access fetches again.
    pub fn clear(&mut self) {
        *self = Self::Unloaded;
    }
}

/// Sparse attribute bag holding a resource's raw JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, Value>);

impl Attributes {
    /// Wrap a JSON value. Non-object values produce an empty bag.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Look up an attribute by its snake_case name.
    ///
    /// Every name returned by [`Attributes::names`] resolves, including
    /// those of keys starting upper-case. `kind` names the owning resource
    /// in the error when the key is absent.
    pub fn get(&self, kind: &'static str, name: &str) -> Result<&Value> {
        let key = naming::to_camel(name);
        self.0
            .get(&key)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(k, _)| naming::to_snake(k) == name)
                    .map(|(_, v)| v)
            })
            .ok_or(ClcError::AttributeNotFound {
                kind,
                attribute: name.to_string(),
            })
    }

    /// Look up a raw camelCase key.
    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a raw camelCase key.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    /// Attribute names in snake_case.
    pub fn names(&self) -> Vec<String> {
        self.0.keys().map(|k| naming::to_snake(k)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}
