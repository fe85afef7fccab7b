//! Capabilities and the group capability predicate

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::domain::group::GroupId;

#[cfg(test)]
use mockall::automock;

/// Named permission a group may hold, e.g. `core.admin`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(String);

impl Capability {
    /// Site-wide super user permission
    pub const CORE_ADMIN: &'static str = "core.admin";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn core_admin() -> Self {
        Self(Self::CORE_ADMIN.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// RBAC predicate: does a group hold a capability
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CapabilityChecker: Send + Sync + Debug {
    async fn group_has_capability(
        &self,
        group: GroupId,
        capability: &Capability,
    ) -> Result<bool, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_admin_capability() {
        let capability = Capability::core_admin();
        assert_eq!(capability.as_str(), "core.admin");
        assert_eq!(capability, Capability::new("core.admin"));
    }
}
