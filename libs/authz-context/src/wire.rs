//! Field names and delimiter of the resolver context wire format.
//!
//! The gateway hands resolvers a flat `string -> string` map. List-valued
//! fields are encoded as delimited strings only here, at the boundary.

/// Entities the caller acts for.
pub const ENTITIES_WITH_ACCESS_KEY: &str = "entitiesWithAccess";

/// Capability list.
pub const ACCESS_INFO_KEY: &str = "accessInfo";

/// Target-scope identifiers.
pub const TARGET_ORGANIZATION_IDS_KEY: &str = "targetOrganizationIDs";

/// Delimiter for list-valued fields.
pub const WIRE_DELIMITER: char = ',';

pub(crate) const RESERVED_KEYS: [&str; 3] = [
    ENTITIES_WITH_ACCESS_KEY,
    ACCESS_INFO_KEY,
    TARGET_ORGANIZATION_IDS_KEY,
];
