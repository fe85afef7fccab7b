//! Super user detection across a list of users

use std::sync::Arc;

use tracing::debug;

use crate::domain::{Capability, CapabilityChecker, DomainError, UserId};
use crate::infrastructure::membership::MembershipService;

/// Evaluates capabilities of users through their groups
#[derive(Debug, Clone)]
pub struct AccessEvaluator {
    membership: Arc<MembershipService>,
    checker: Arc<dyn CapabilityChecker>,
}

impl AccessEvaluator {
    pub fn new(membership: Arc<MembershipService>, checker: Arc<dyn CapabilityChecker>) -> Self {
        Self {
            membership,
            checker,
        }
    }

    /// Whether any of `user_ids` belongs to a group holding `core.admin`
    ///
    /// Users are checked in order and evaluation stops at the first hit.
    /// Unknown users have no groups.
    pub async fn check_super_user_in_users(&self, user_ids: &[UserId]) -> Result<bool, DomainError> {
        let capability = Capability::core_admin();

        for user_id in user_ids {
            let groups = self.membership.get_user_groups(*user_id).await?;

            for group in groups.iter() {
                if self.checker.group_has_capability(group, &capability).await? {
                    debug!(user_id = %user_id, group_id = %group, "Found super user");
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }
}
