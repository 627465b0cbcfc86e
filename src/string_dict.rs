//! String dictionary for interning property keys.
//!
//! Identifiers and static member names that occur many times in a program
//! share one `PropertyKey`: a single string allocation and a hash computed
//! once.

use rustc_hash::FxHashMap;

use crate::value::{CheapClone, PropertyKey};

/// A dictionary for deduplicating property keys.
pub struct StringDict {
    keys: FxHashMap<Box<str>, PropertyKey>,
}

impl StringDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self {
            keys: FxHashMap::default(),
        }
    }

    /// Create a dictionary pre-populated with common names.
    pub fn with_common_strings() -> Self {
        let mut dict = Self::new();
        for s in COMMON_STRINGS {
            dict.get_or_insert(s);
        }
        dict
    }

    /// Get an existing key or insert a new one.
    pub fn get_or_insert(&mut self, s: &str) -> PropertyKey {
        if let Some(existing) = self.keys.get(s) {
            return existing.cheap_clone();
        }
        let key = PropertyKey::from(s);
        self.keys.insert(s.into(), key.cheap_clone());
        key
    }

    /// Get an existing key without inserting.
    pub fn get(&self, s: &str) -> Option<PropertyKey> {
        self.keys.get(s).map(|k| k.cheap_clone())
    }

    /// Number of unique strings in the dictionary.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for StringDict {
    fn default() -> Self {
        Self::new()
    }
}

const COMMON_STRINGS: &[&str] = &[
    "length",
    "prototype",
    "constructor",
    "toString",
    "valueOf",
    "arguments",
    "callee",
    "message",
    "name",
    "undefined",
    "this",
];
