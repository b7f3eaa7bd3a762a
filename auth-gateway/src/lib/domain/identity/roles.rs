use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::domain::identity::models::RawGroup;

/// Role granted to every authenticated identity.
pub const BASELINE_ROLE: &str = "USER";

const FALLBACK_PREFIX: &str = "ROLE_";

/// External group name to canonical role name.
///
/// Keys are either a bare group name or `"{category} / {name}"`.
/// Loaded once from configuration, read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct RoleMappingTable {
    mappings: HashMap<String, String>,
}

impl RoleMappingTable {
    pub fn new<I, K, V>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            mappings: mappings
                .into_iter()
                .map(|(group, role)| (group.into(), role.into()))
                .collect(),
        }
    }

    pub fn get(&self, group_key: &str) -> Option<&str> {
        self.mappings.get(group_key).map(String::as_str)
    }
}

/// Maps raw directory group memberships to canonical roles.
#[derive(Debug, Clone, Default)]
pub struct RoleResolver {
    table: RoleMappingTable,
}

impl RoleResolver {
    pub fn new(table: RoleMappingTable) -> Self {
        Self { table }
    }

    /// Resolve the role set for a user's groups.
    ///
    /// Always contains [`BASELINE_ROLE`]. Each group contributes its mapped
    /// role when the table knows its key, otherwise a `ROLE_` fallback
    /// derived from the group name.
    pub fn resolve_roles(&self, raw_groups: &[RawGroup]) -> BTreeSet<String> {
        let mut roles = BTreeSet::from([BASELINE_ROLE.to_string()]);

        for group in raw_groups {
            let key = group_key(group);
            let role = match self.table.get(&key) {
                Some(mapped) => mapped.to_string(),
                None => fallback_role(&group.name),
            };
            roles.insert(role);
        }

        roles
    }
}

/// Lookup key of a group: `"{category} / {name}"`, or the bare name.
pub fn group_key(group: &RawGroup) -> String {
    match &group.category {
        Some(category) => format!("{} / {}", category, group.name),
        None => group.name.clone(),
    }
}

/// `ROLE_` followed by the upper-cased group name, whitespace as underscores.
pub fn fallback_role(group_name: &str) -> String {
    let mut role = String::with_capacity(FALLBACK_PREFIX.len() + group_name.len());
    role.push_str(FALLBACK_PREFIX);

    for c in group_name.chars() {
        if c.is_whitespace() {
            role.push('_');
        } else {
            role.extend(c.to_uppercase());
        }
    }

    role
}
