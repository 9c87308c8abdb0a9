//! Quill identifier storage utilities and wrappers.
use std::{
    borrow::Cow,
    fmt::{Debug, Display},
    sync::atomic::{AtomicU32, Ordering},
};

use dashmap::DashMap;
use fnv::FnvBuildHasher;
use lazy_static::lazy_static;

/// An interned name. Identifiers are cheap to copy and compare, the
/// underlying string is stored in the global [IDENTIFIER_MAP].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Identifier(u32);

impl Identifier {
    /// Get the string value of the identifier.
    pub fn as_str(self) -> &'static str {
        IDENTIFIER_MAP.get_ident(self)
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Debug for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Identifier").field(&self.as_str()).field(&self.0).finish()
    }
}

// Utility methods for converting from a String to an Identifier and vice versa.

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        IDENTIFIER_MAP.create_ident(name)
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        IDENTIFIER_MAP.create_ident(name.as_str())
    }
}

impl From<Identifier> for &str {
    fn from(ident: Identifier) -> Self {
        ident.as_str()
    }
}

impl From<Identifier> for Cow<'static, str> {
    fn from(ident: Identifier) -> Self {
        Cow::from(ident.as_str())
    }
}

lazy_static! {
    pub static ref IDENTIFIER_MAP: IdentifierMap = IdentifierMap::default();
}

/// Struct representing a globally accessible identifier map. The struct
/// contains a identifier map and another map for reverse lookups.
///
/// Interned strings live for the rest of the program.
#[derive(Debug, Default)]
pub struct IdentifierMap {
    reverse_identifiers: DashMap<&'static str, Identifier, FnvBuildHasher>,
    identifiers: DashMap<Identifier, &'static str, FnvBuildHasher>,
    counter: AtomicU32,
}

impl IdentifierMap {
    /// Create an [Identifier] for the given string, re-using the existing
    /// one if the string has been interned before.
    pub fn create_ident(&self, name: &str) -> Identifier {
        if let Some(ident) = self.reverse_identifiers.get(name) {
            return *ident;
        }

        let value: &'static str = Box::leak(name.to_owned().into_boxed_str());

        // Another thread may have raced us to intern the same string, the
        // entry API makes sure only one of the identifiers survives.
        *self.reverse_identifiers.entry(value).or_insert_with(|| {
            let ident = Identifier(self.counter.fetch_add(1, Ordering::Relaxed));
            self.identifiers.insert(ident, value);
            ident
        })
    }

    /// Get the string associated with the [Identifier].
    pub fn get_ident(&self, ident: Identifier) -> &'static str {
        match self.identifiers.get(&ident) {
            Some(value) => *value,
            None => panic!("identifier `{}` was never interned", ident.0),
        }
    }
}
