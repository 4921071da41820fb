//! Extension identity.
//!
//! Extension identifiers are case-insensitive: `Publisher.Name` and
//! `publisher.name` refer to the same extension. The spelling given at
//! construction is kept for display and for host notifications.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of an extension (`publisher.name`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionIdentifier {
    value: String,
}

impl ExtensionIdentifier {
    /// Create an identifier from its string form.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// The identifier as given.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Lowercased key used for comparisons.
    pub fn to_key(&self) -> String {
        self.value.to_lowercase()
    }
}

impl PartialEq for ExtensionIdentifier {
    fn eq(&self, other: &Self) -> bool {
        self.to_key() == other.to_key()
    }
}

impl Eq for ExtensionIdentifier {}

impl fmt::Display for ExtensionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl From<&str> for ExtensionIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ExtensionIdentifier {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Set of extension identifiers, compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ExtensionIdentifierSet {
    keys: HashSet<String>,
}

impl ExtensionIdentifierSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identifier. Returns `false` if it was already present.
    pub fn add(&mut self, id: &ExtensionIdentifier) -> bool {
        self.keys.insert(id.to_key())
    }

    /// Remove an identifier. Returns `true` if it was present.
    pub fn delete(&mut self, id: &ExtensionIdentifier) -> bool {
        self.keys.remove(&id.to_key())
    }

    /// Check membership.
    pub fn has(&self, id: &ExtensionIdentifier) -> bool {
        self.keys.contains(&id.to_key())
    }

    /// Number of identifiers in the set.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// The parts of an extension's manifest the URL service needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionDescription {
    /// Extension identifier.
    pub identifier: ExtensionIdentifier,
    /// Manifest `name`.
    pub name: String,
    /// Manifest `displayName`.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl ExtensionDescription {
    /// Create a description without a display name.
    pub fn new(identifier: impl Into<ExtensionIdentifier>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            display_name: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Name shown to users: the display name if set and non-empty, else `name`.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(display_name) if !display_name.is_empty() => display_name,
            _ => &self.name,
        }
    }
}
