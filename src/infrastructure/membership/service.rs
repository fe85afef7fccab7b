//! Membership service: add, remove and replace a user's groups

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{
    DomainError, GroupChange, GroupId, GroupRepository, GroupSet, IdentityCache, User, UserId,
    UserRepository,
};
use crate::infrastructure::identity::{current_groups, propagate};

/// Membership service
///
/// Every mutation is applied by the store against the stored groups, and the
/// cached copies are refreshed only after it succeeds, so a failed save leaves
/// the caches untouched.
#[derive(Debug, Clone)]
pub struct MembershipService {
    users: Arc<dyn UserRepository>,
    groups: Arc<dyn GroupRepository>,
    identity: Arc<dyn IdentityCache>,
}

impl MembershipService {
    /// Create a new membership service
    pub fn new(
        users: Arc<dyn UserRepository>,
        groups: Arc<dyn GroupRepository>,
        identity: Arc<dyn IdentityCache>,
    ) -> Self {
        Self {
            users,
            groups,
            identity,
        }
    }

    /// Add a user to a group
    ///
    /// Adding an existing membership is a no-op.
    pub async fn add_user_to_group(
        &self,
        user_id: UserId,
        group_id: GroupId,
    ) -> Result<GroupSet, DomainError> {
        let user = self.load(user_id).await?;

        if user.is_member_of(group_id) {
            debug!(user_id = %user_id, group_id = %group_id, "User already in group");
            propagate(self.identity.as_ref(), &user).await;
            return Ok(user.groups().clone());
        }

        if !self.groups.exists(group_id).await? {
            return Err(DomainError::group_not_found(group_id));
        }

        let saved = self.apply(user_id, GroupChange::Add(group_id)).await?;

        info!(user_id = %user_id, group_id = %group_id, "Added user to group");
        Ok(saved.groups().clone())
    }

    /// Remove a user from a group
    ///
    /// Removing a membership the user does not hold is a no-op.
    pub async fn remove_user_from_group(
        &self,
        user_id: UserId,
        group_id: GroupId,
    ) -> Result<GroupSet, DomainError> {
        let user = self.load(user_id).await?;

        if !user.is_member_of(group_id) {
            debug!(user_id = %user_id, group_id = %group_id, "User not in group");
            propagate(self.identity.as_ref(), &user).await;
            return Ok(user.groups().clone());
        }

        let saved = self.apply(user_id, GroupChange::Remove(group_id)).await?;

        info!(user_id = %user_id, group_id = %group_id, "Removed user from group");
        Ok(saved.groups().clone())
    }

    /// Replace every membership of a user
    ///
    /// All ids must name existing groups; otherwise nothing is stored.
    pub async fn set_user_groups(
        &self,
        user_id: UserId,
        group_ids: &[GroupId],
    ) -> Result<GroupSet, DomainError> {
        self.load(user_id).await?;

        let titles = self.groups.titles(group_ids).await?;
        if let Some(missing) = group_ids.iter().find(|id| !titles.contains_key(*id)) {
            return Err(DomainError::group_not_found(*missing));
        }

        let replacement = group_ids.iter().copied().collect();
        let saved = self.apply(user_id, GroupChange::Replace(replacement)).await?;

        info!(
            user_id = %user_id,
            groups = ?titles.values().collect::<Vec<_>>(),
            "Replaced user groups"
        );
        Ok(saved.groups().clone())
    }

    /// Current groups of a user; unknown users have none
    pub async fn get_user_groups(&self, user_id: UserId) -> Result<GroupSet, DomainError> {
        current_groups(self.identity.as_ref(), self.users.as_ref(), user_id).await
    }

    async fn load(&self, user_id: UserId) -> Result<User, DomainError> {
        self.users
            .get(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", user_id)))
    }

    async fn apply(&self, user_id: UserId, change: GroupChange) -> Result<User, DomainError> {
        let (saved, changed) = self.users.change_groups(user_id, &change).await?;

        if !changed {
            debug!(user_id = %user_id, change = ?change, "Membership already applied");
        }

        propagate(self.identity.as_ref(), &saved).await;
        Ok(saved)
    }
}
