//! Verified claims to resolver context.

use authorizer_sdk::{AuthorizerError, CapabilitySet, ResolverContext};
use serde_json::{Map, Value};

use crate::config::ClaimMappingConfig;

/// Build the resolver context from verified token claims.
///
/// Every mapped claim may be a JSON array of strings or a single delimited
/// string. A missing capabilities claim yields an empty capability set.
pub(crate) fn context_from_claims(
    claims: &Map<String, Value>,
    mapping: &ClaimMappingConfig,
) -> Result<ResolverContext, AuthorizerError> {
    let entities = claims
        .get(&mapping.entities_claim)
        .and_then(string_list)
        .filter(|ids| !ids.is_empty())
        .ok_or_else(|| missing(&mapping.entities_claim))?;

    let capabilities = match claims.get(&mapping.capabilities_claim) {
        None | Some(Value::Null) => CapabilitySet::new(),
        Some(Value::String(s)) => CapabilitySet::parse_wire(s)?,
        Some(value) => {
            let tags = string_list(value).ok_or_else(|| malformed(&mapping.capabilities_claim))?;
            CapabilitySet::from_tags(tags)?
        }
    };

    let targets = match claims.get(&mapping.target_scope_claim).and_then(string_list) {
        Some(ids) if !ids.is_empty() => ids,
        _ => mapping
            .fallback_target_scope
            .clone()
            .ok_or_else(|| missing(&mapping.target_scope_claim))?,
    };

    Ok(ResolverContext::builder()
        .entities_with_access(entities)
        .capabilities(capabilities)
        .target_organization_ids(targets)
        .build()?)
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_owned)
                .collect(),
        ),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(|s| s.trim().to_owned()))
            .collect(),
        _ => None,
    }
}

fn missing(claim: &str) -> AuthorizerError {
    AuthorizerError::unauthorized(format!("token has no '{claim}' claim"))
}

fn malformed(claim: &str) -> AuthorizerError {
    AuthorizerError::unauthorized(format!("claim '{claim}' is not a string list"))
}
