use std::collections::BTreeMap;

use crate::capability::CapabilitySet;
use crate::error::ContextError;
use crate::wire::{
    ACCESS_INFO_KEY, ENTITIES_WITH_ACCESS_KEY, RESERVED_KEYS, TARGET_ORGANIZATION_IDS_KEY,
    WIRE_DELIMITER,
};

/// `ResolverContext` carries the facts an authorization decision produced.
///
/// Built by a token verifier when a request is allowed and attached to that
/// single request only; resolvers read it but never mutate it. A context is
/// always complete: it names at least one entity and at least one target
/// scope. Capabilities may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverContext {
    /// Entities the caller acts for (`entitiesWithAccess`).
    entities_with_access: Vec<String>,
    /// Capabilities granted to the caller (`accessInfo`).
    capabilities: CapabilitySet,
    /// Scopes the caller may target (`targetOrganizationIDs`).
    target_organization_ids: Vec<String>,
    /// Additional string facts forwarded verbatim.
    extra: BTreeMap<String, String>,
}

impl ResolverContext {
    #[must_use]
    pub fn builder() -> ResolverContextBuilder {
        ResolverContextBuilder::default()
    }

    #[must_use]
    pub fn entities_with_access(&self) -> &[String] {
        &self.entities_with_access
    }

    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    #[must_use]
    pub fn target_organization_ids(&self) -> &[String] {
        &self.target_organization_ids
    }

    #[must_use]
    pub fn extra(&self) -> &BTreeMap<String, String> {
        &self.extra
    }

    /// Encode as the flat string map resolvers receive.
    #[must_use]
    pub fn to_wire(&self) -> BTreeMap<String, String> {
        let mut out = self.extra.clone();
        out.insert(
            ENTITIES_WITH_ACCESS_KEY.to_owned(),
            join(&self.entities_with_access),
        );
        out.insert(ACCESS_INFO_KEY.to_owned(), self.capabilities.to_wire());
        out.insert(
            TARGET_ORGANIZATION_IDS_KEY.to_owned(),
            join(&self.target_organization_ids),
        );
        out
    }

    /// Decode the flat string map produced by [`Self::to_wire`].
    ///
    /// Unknown keys are kept as extra fields.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError`] if a required field is missing or a value is invalid.
    pub fn from_wire(map: &BTreeMap<String, String>) -> Result<Self, ContextError> {
        let mut builder = Self::builder();

        if let Some(entities) = map.get(ENTITIES_WITH_ACCESS_KEY) {
            builder = builder.entities_with_access(split(entities));
        }
        if let Some(access_info) = map.get(ACCESS_INFO_KEY) {
            builder = builder.capabilities(CapabilitySet::parse_wire(access_info)?);
        }
        if let Some(targets) = map.get(TARGET_ORGANIZATION_IDS_KEY) {
            builder = builder.target_organization_ids(split(targets));
        }
        for (key, value) in map {
            if !RESERVED_KEYS.contains(&key.as_str()) {
                builder = builder.extra(key.clone(), value.clone());
            }
        }

        builder.build()
    }
}

fn join(items: &[String]) -> String {
    items.join(&WIRE_DELIMITER.to_string())
}

fn split(value: &str) -> Vec<String> {
    value
        .split(WIRE_DELIMITER)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[derive(Default)]
pub struct ResolverContextBuilder {
    entities_with_access: Vec<String>,
    capabilities: CapabilitySet,
    target_organization_ids: Vec<String>,
    extra: BTreeMap<String, String>,
}

impl ResolverContextBuilder {
    #[must_use]
    pub fn entity(mut self, id: impl Into<String>) -> Self {
        self.entities_with_access.push(id.into());
        self
    }

    #[must_use]
    pub fn entities_with_access<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities_with_access.extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    #[must_use]
    pub fn target_organization(mut self, id: impl Into<String>) -> Self {
        self.target_organization_ids.push(id.into());
        self
    }

    #[must_use]
    pub fn target_organization_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_organization_ids
            .extend(ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Validate and build the context.
    ///
    /// # Errors
    ///
    /// - [`ContextError::MissingField`] if no entity or no target scope was given
    /// - [`ContextError::InvalidIdentifier`] if an identifier is empty, has
    ///   surrounding whitespace, or contains the delimiter
    /// - [`ContextError::ReservedKey`] if an extra field shadows a context field
    pub fn build(self) -> Result<ResolverContext, ContextError> {
        let entities_with_access = dedup(self.entities_with_access);
        let target_organization_ids = dedup(self.target_organization_ids);

        validate_ids(ENTITIES_WITH_ACCESS_KEY, &entities_with_access)?;
        validate_ids(TARGET_ORGANIZATION_IDS_KEY, &target_organization_ids)?;

        if let Some(key) = self
            .extra
            .keys()
            .find(|k| RESERVED_KEYS.contains(&k.as_str()))
        {
            return Err(ContextError::ReservedKey { key: key.clone() });
        }

        Ok(ResolverContext {
            entities_with_access,
            capabilities: self.capabilities,
            target_organization_ids,
            extra: self.extra,
        })
    }
}

fn dedup(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

fn validate_ids(field: &'static str, ids: &[String]) -> Result<(), ContextError> {
    if ids.is_empty() {
        return Err(ContextError::MissingField { field });
    }
    if let Some(bad) = ids
        .iter()
        .find(|id| id.is_empty() || id.trim() != id.as_str() || id.contains(WIRE_DELIMITER))
    {
        return Err(ContextError::InvalidIdentifier {
            field,
            value: bad.clone(),
        });
    }
    Ok(())
}
