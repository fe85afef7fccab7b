//! Identity cache implementations and fan-out of fresh user state

mod in_memory;

pub use in_memory::InMemoryIdentityCache;

use tracing::debug;

use crate::domain::{DomainError, GroupSet, IdentityCache, User, UserId, UserRepository};

/// Overwrite every live copy of `user` with its freshly persisted state
///
/// Copies already holding a later `updated_at` are left alone, so a slow
/// writer cannot roll a copy back. Returns the number of copies refreshed.
pub async fn propagate(identity: &dyn IdentityCache, user: &User) -> usize {
    let copies = identity.cached_copies(user.id()).await;
    let mut refreshed = 0;

    for copy in &copies {
        let mut copy = copy.write().await;

        if copy.updated_at() > user.updated_at() {
            continue;
        }

        copy.sync_from(user);
        refreshed += 1;
    }

    debug!(user_id = %user.id(), copies = copies.len(), refreshed, "Propagated user state to cached copies");
    refreshed
}

/// Current groups of a user, preferring a live cached copy over the store
///
/// Unknown users have no groups.
pub async fn current_groups(
    identity: &dyn IdentityCache,
    users: &dyn UserRepository,
    id: UserId,
) -> Result<GroupSet, DomainError> {
    if let Some(cached) = identity.cached_copies(id).await.first() {
        return Ok(cached.read().await.groups().clone());
    }

    Ok(users
        .get(id)
        .await?
        .map(|user| user.groups().clone())
        .unwrap_or_default())
}
