//! Configuration for the scheme-prefix verifier.

use serde::Deserialize;

/// Capabilities granted by the fixture identity unless configured otherwise.
pub const DEFAULT_ACCESS_INFO: &str =
    "evr,evw,evs,dvr,dvw,dte,dsw,dvo,dvc,ota,otd,oto,msr,sts,usr,uss,usw,orr,oru,ord,ctr,ctw,pg,pp";

/// Plugin configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemePrefixConfig {
    /// Identity granted to every accepted credential.
    pub identity: FixedIdentityConfig,
}

/// Fixed resolver context fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FixedIdentityConfig {
    pub entities_with_access: Vec<String>,
    /// Delimited capability list.
    pub access_info: String,
    pub target_organization_ids: Vec<String>,
}

impl Default for FixedIdentityConfig {
    fn default() -> Self {
        Self {
            entities_with_access: vec!["a".to_owned()],
            access_info: DEFAULT_ACCESS_INFO.to_owned(),
            target_organization_ids: vec!["a".to_owned()],
        }
    }
}
