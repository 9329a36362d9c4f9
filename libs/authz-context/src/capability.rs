//! Capability tags granted to an authorized caller.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ContextError;
use crate::wire::WIRE_DELIMITER;

/// A single named capability (e.g. `evr`, `ctw`).
///
/// Tags are opaque to the authorizer. A tag is non-empty and contains neither
/// whitespace nor the wire delimiter, so a set of them can always be encoded
/// as a delimited list and decoded back.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capability(String);

impl Capability {
    /// Validate and wrap a capability tag.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidCapability`] if the tag is empty or
    /// contains whitespace or the delimiter.
    pub fn new(tag: impl Into<String>) -> Result<Self, ContextError> {
        let tag = tag.into();
        if tag.is_empty() {
            return Err(ContextError::InvalidCapability {
                tag,
                reason: "tag is empty",
            });
        }
        if tag.contains(WIRE_DELIMITER) {
            return Err(ContextError::InvalidCapability {
                tag,
                reason: "tag contains the list delimiter",
            });
        }
        if tag.chars().any(char::is_whitespace) {
            return Err(ContextError::InvalidCapability {
                tag,
                reason: "tag contains whitespace",
            });
        }
        Ok(Self(tag))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Capability {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered set of capabilities.
///
/// Insertion order is kept so the encoded list is stable and matches the
/// order the capabilities were granted in; duplicates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    items: Vec<Capability>,
}

impl CapabilitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from raw tags.
    ///
    /// # Errors
    ///
    /// Returns the first [`ContextError::InvalidCapability`] encountered.
    pub fn from_tags<I, S>(tags: I) -> Result<Self, ContextError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for tag in tags {
            set.insert(Capability::new(tag)?);
        }
        Ok(set)
    }

    /// Decode a delimited list (`"evr,evw,evs"`).
    ///
    /// Items are trimmed and empty items are skipped, so `""` decodes to an
    /// empty set.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::InvalidCapability`] if an item is not a valid tag.
    pub fn parse_wire(value: &str) -> Result<Self, ContextError> {
        Self::from_tags(
            value
                .split(WIRE_DELIMITER)
                .map(str::trim)
                .filter(|item| !item.is_empty()),
        )
    }

    /// Insert a capability. Returns `false` if it was already present.
    pub fn insert(&mut self, capability: Capability) -> bool {
        if self.items.contains(&capability) {
            return false;
        }
        self.items.push(capability);
        true
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.items.iter().any(|c| c.as_str() == tag)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.items.iter()
    }

    /// Encode as a delimited list.
    #[must_use]
    pub fn to_wire(&self) -> String {
        let mut out = String::new();
        for (i, cap) in self.items.iter().enumerate() {
            if i > 0 {
                out.push(WIRE_DELIMITER);
            }
            out.push_str(cap.as_str());
        }
        out
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a Capability;
    type IntoIter = std::slice::Iter<'a, Capability>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_wire())
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse_wire(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_tag() {
        assert!(matches!(
            Capability::new(""),
            Err(ContextError::InvalidCapability { .. })
        ));
    }

    #[test]
    fn rejects_delimiter_and_whitespace() {
        assert!(Capability::new("ev,r").is_err());
        assert!(Capability::new("ev r").is_err());
        assert!(Capability::new("evr\n").is_err());
    }

    #[test]
    fn insert_ignores_duplicates_and_keeps_order() {
        let mut set = CapabilitySet::new();
        assert!(set.insert(Capability::new("ctw").unwrap()));
        assert!(set.insert(Capability::new("evr").unwrap()));
        assert!(!set.insert(Capability::new("ctw").unwrap()));

        assert_eq!(set.len(), 2);
        assert_eq!(set.to_wire(), "ctw,evr");
    }

    #[test]
    fn parse_wire_trims_and_skips_empty_items() {
        let set = CapabilitySet::parse_wire(" evr, evw,,evs ").unwrap();
        assert_eq!(set.to_wire(), "evr,evw,evs");
        assert!(set.contains("evw"));
        assert!(!set.contains("dvr"));
    }

    #[test]
    fn parse_wire_of_empty_string_is_empty_set() {
        let set = CapabilitySet::parse_wire("").unwrap();
        assert!(set.is_empty());
        assert_eq!(set.to_wire(), "");
    }

    #[test]
    fn serializes_as_delimited_string() {
        let set = CapabilitySet::from_tags(["pg", "pp"]).unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "\"pg,pp\"");

        let back: CapabilitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
