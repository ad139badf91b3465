//! User variable table.
//!
//! Names are case-insensitive. The spelling used when a variable was first
//! set is kept for display.

use std::collections::BTreeMap;

/// A stored user variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default)]
pub struct Variables {
    entries: BTreeMap<String, Variable>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace a variable.
    pub fn set(&mut self, name: &str, value: &str) {
        let key = name.to_lowercase();
        match self.entries.get_mut(&key) {
            Some(var) => var.value = value.to_string(),
            None => {
                self.entries.insert(
                    key,
                    Variable {
                        name: name.to_string(),
                        value: value.to_string(),
                    },
                );
            },
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_lowercase())
            .map(|v| v.value.as_str())
    }

    /// Remove a variable. Returns `false` if it was not set.
    pub fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(&name.to_lowercase()).is_some()
    }

    /// Variables in case-insensitive name order.
    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display name to value, for session export.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries
            .values()
            .map(|v| (v.name.clone(), v.value.clone()))
            .collect()
    }
}
