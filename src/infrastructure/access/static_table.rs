//! Capability table fixed at startup

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::config::AccessConfig;
use crate::domain::{Capability, CapabilityChecker, DomainError, GroupId};

/// Capability checker backed by an explicit group -> capabilities table
///
/// Grants are exact: a group holds only what was granted to it directly.
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilityTable {
    grants: HashMap<GroupId, HashSet<Capability>>,
}

impl StaticCapabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `core.admin` to every configured super user group
    pub fn from_config(config: &AccessConfig) -> Self {
        config
            .super_user_groups
            .iter()
            .fold(Self::new(), |table, group| {
                table.with_grant(*group, Capability::core_admin())
            })
    }

    /// Grant a capability to a group (builder pattern)
    pub fn with_grant(mut self, group: GroupId, capability: Capability) -> Self {
        self.grants.entry(group).or_default().insert(capability);
        self
    }

    pub fn holds(&self, group: GroupId, capability: &Capability) -> bool {
        self.grants
            .get(&group)
            .is_some_and(|granted| granted.contains(capability))
    }
}

#[async_trait]
impl CapabilityChecker for StaticCapabilityTable {
    async fn group_has_capability(
        &self,
        group: GroupId,
        capability: &Capability,
    ) -> Result<bool, DomainError> {
        Ok(self.holds(group, capability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_grants_core_admin() {
        let table = StaticCapabilityTable::from_config(&AccessConfig::default());

        assert!(table.holds(GroupId::new(8), &Capability::core_admin()));
        assert!(!table.holds(GroupId::new(7), &Capability::core_admin()));
        assert!(!table.holds(GroupId::new(8), &Capability::new("core.manage")));
    }

    #[test]
    fn test_group_has_capability() {
        let table = StaticCapabilityTable::new()
            .with_grant(GroupId::new(6), Capability::new("core.manage"))
            .with_grant(GroupId::new(6), Capability::core_admin());

        let admin = tokio_test::block_on(
            table.group_has_capability(GroupId::new(6), &Capability::core_admin()),
        )
        .unwrap();
        let other = tokio_test::block_on(
            table.group_has_capability(GroupId::new(2), &Capability::core_admin()),
        )
        .unwrap();

        assert!(admin);
        assert!(!other);
    }
}
