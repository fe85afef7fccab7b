//! In-memory identity cache using moka
//!
//! Holds preloaded user instances keyed by id plus the current session user.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache as MokaCache;
use moka::notification::RemovalCause;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::IdentityCacheConfig;
use crate::domain::{IdentityCache, SharedUser, User, UserId};

type Evicted = Arc<Mutex<HashMap<UserId, Weak<RwLock<User>>>>>;

/// Identity cache backed by a bounded moka cache
///
/// Instances dropped by the size or idle policy are remembered weakly. While
/// anyone still holds one it is listed by `cached_copies`, so it keeps
/// receiving propagated state, and a later `preload` adopts it again instead
/// of creating a second instance.
#[derive(Debug)]
pub struct InMemoryIdentityCache {
    instances: MokaCache<UserId, SharedUser>,
    evicted: Evicted,
    session: RwLock<Option<SharedUser>>,
}

impl InMemoryIdentityCache {
    pub fn new() -> Self {
        Self::with_config(&IdentityCacheConfig::default())
    }

    pub fn with_config(config: &IdentityCacheConfig) -> Self {
        let evicted = Evicted::default();
        let listener_evicted = evicted.clone();

        let instances = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_idle(Duration::from_secs(config.ttl_secs))
            .eviction_listener(move |id: Arc<UserId>, user: SharedUser, cause: RemovalCause| {
                if !cause.was_evicted() {
                    return;
                }

                let mut evicted = listener_evicted.lock().unwrap_or_else(|e| e.into_inner());
                evicted.retain(|_, weak| weak.strong_count() > 0);
                evicted.insert(*id, Arc::downgrade(&user));
                debug!(user_id = %id, cause = ?cause, "Evicted cached user instance");
            })
            .build();

        Self {
            instances,
            evicted,
            session: RwLock::new(None),
        }
    }

    /// Live instance for a user, if one was preloaded
    pub async fn instance(&self, id: UserId) -> Option<SharedUser> {
        self.instances.get(&id).await
    }

    /// Preload a user, refreshing the existing instance in place if there is one
    pub async fn preload(&self, user: User) -> SharedUser {
        let id = user.id();

        if let Some(existing) = self.instances.get(&id).await {
            existing.write().await.sync_from(&user);
            return existing;
        }

        let shared = match self.take_evicted(id) {
            Some(orphan) => {
                orphan.write().await.sync_from(&user);
                orphan
            }
            None => Arc::new(RwLock::new(user)),
        };

        self.instances.insert(id, shared.clone()).await;
        shared
    }

    pub async fn evict(&self, id: UserId) {
        self.instances.invalidate(&id).await;
        self.lock_evicted().remove(&id);
    }

    /// Make a user the current session user
    pub async fn set_session_user(&self, user: SharedUser) {
        *self.session.write().await = Some(user);
    }

    pub async fn session_user(&self) -> Option<SharedUser> {
        self.session.read().await.clone()
    }

    pub async fn clear_session(&self) {
        *self.session.write().await = None;
    }

    fn lock_evicted(&self) -> MutexGuard<'_, HashMap<UserId, Weak<RwLock<User>>>> {
        self.evicted.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Evicted instance still held elsewhere
    fn evicted_instance(&self, id: UserId) -> Option<SharedUser> {
        let mut evicted = self.lock_evicted();
        let live = evicted.get(&id).and_then(Weak::upgrade);

        if live.is_none() {
            evicted.remove(&id);
        }
        live
    }

    fn take_evicted(&self, id: UserId) -> Option<SharedUser> {
        self.lock_evicted().remove(&id).and_then(|weak| weak.upgrade())
    }
}

impl Default for InMemoryIdentityCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityCache for InMemoryIdentityCache {
    async fn cached_copies(&self, id: UserId) -> Vec<SharedUser> {
        let mut copies = Vec::new();

        if let Some(instance) = self.instances.get(&id).await {
            copies.push(instance);
        }

        if let Some(orphan) = self.evicted_instance(id) {
            if !copies.iter().any(|c| Arc::ptr_eq(c, &orphan)) {
                copies.push(orphan);
            }
        }

        if let Some(session) = self.session_user().await {
            let is_same_user = session.read().await.id() == id;
            let already_listed = copies.iter().any(|c| Arc::ptr_eq(c, &session));

            if is_same_user && !already_listed {
                copies.push(session);
            }
        }

        copies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GroupSet;
    use crate::infrastructure::identity::propagate;

    fn user(id: i64) -> User {
        User::new(UserId::new(id).unwrap(), format!("user{}", id), "hash")
    }

    #[tokio::test]
    async fn test_no_copies_for_unknown_user() {
        let cache = InMemoryIdentityCache::new();
        assert!(cache.cached_copies(UserId::new(1).unwrap()).await.is_empty());
    }

    #[tokio::test]
    async fn test_preload_refreshes_in_place() {
        let cache = InMemoryIdentityCache::new();
        let first = cache.preload(user(1)).await;

        let mut fresher = user(1);
        fresher.set_password_hash("new-hash");
        let second = cache.preload(fresher).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.read().await.password_hash(), "new-hash");
    }

    #[tokio::test]
    async fn test_session_user_listed_only_for_matching_id() {
        let cache = InMemoryIdentityCache::new();
        cache
            .set_session_user(Arc::new(RwLock::new(user(2))))
            .await;

        assert_eq!(cache.cached_copies(UserId::new(2).unwrap()).await.len(), 1);
        assert!(cache.cached_copies(UserId::new(3).unwrap()).await.is_empty());
    }

    #[tokio::test]
    async fn test_shared_session_instance_listed_once() {
        let cache = InMemoryIdentityCache::new();
        let shared = cache.preload(user(4)).await;
        cache.set_session_user(shared).await;

        assert_eq!(cache.cached_copies(UserId::new(4).unwrap()).await.len(), 1);
    }

    #[tokio::test]
    async fn test_propagate_updates_every_copy() {
        let cache = InMemoryIdentityCache::new();
        let instance = cache.preload(user(5)).await;
        let session = Arc::new(RwLock::new(user(5)));
        cache.set_session_user(session.clone()).await;

        let mut fresh = user(5);
        fresh.set_groups([2i64, 8].into_iter().collect::<GroupSet>());

        let refreshed = propagate(&cache, &fresh).await;

        assert_eq!(refreshed, 2);
        assert_eq!(instance.read().await.groups().to_vec(), vec![2, 8]);
        assert_eq!(session.read().await.groups().to_vec(), vec![2, 8]);
    }

    #[tokio::test]
    async fn test_propagate_keeps_newer_copy() {
        let cache = InMemoryIdentityCache::new();
        let older = user(7);

        let mut newer = user(7);
        newer.set_groups([2i64, 8].into_iter().collect::<GroupSet>());
        let instance = cache.preload(newer).await;

        assert_eq!(propagate(&cache, &older).await, 0);
        assert_eq!(instance.read().await.groups().to_vec(), vec![2, 8]);
    }

    #[tokio::test]
    async fn test_instances_dropped_by_capacity_still_receive_updates() {
        let cache = InMemoryIdentityCache::with_config(&IdentityCacheConfig {
            max_capacity: 1,
            ttl_secs: 300,
        });
        let first = cache.preload(user(8)).await;
        let second = cache.preload(user(9)).await;
        cache.instances.run_pending_tasks().await;

        let resident = [8, 9]
            .into_iter()
            .filter(|id| cache.instances.contains_key(&UserId::new(*id).unwrap()))
            .count();
        assert!(resident <= 1);

        for (held, id) in [(&first, 8), (&second, 9)] {
            let mut fresh = user(id);
            fresh.set_groups([8i64].into_iter().collect::<GroupSet>());

            assert_eq!(propagate(&cache, &fresh).await, 1);
            assert_eq!(held.read().await.groups().to_vec(), vec![8]);
        }
    }

    #[tokio::test]
    async fn test_preload_adopts_evicted_instance() {
        let cache = InMemoryIdentityCache::with_config(&IdentityCacheConfig {
            max_capacity: 1,
            ttl_secs: 300,
        });
        let first = cache.preload(user(10)).await;
        let second = cache.preload(user(11)).await;
        cache.instances.run_pending_tasks().await;

        let again_first = cache.preload(user(10)).await;
        let again_second = cache.preload(user(11)).await;

        assert!(Arc::ptr_eq(&first, &again_first));
        assert!(Arc::ptr_eq(&second, &again_second));
    }

    #[tokio::test]
    async fn test_evict_and_clear_session() {
        let cache = InMemoryIdentityCache::new();
        let shared = cache.preload(user(6)).await;
        cache.set_session_user(shared).await;

        cache.evict(UserId::new(6).unwrap()).await;
        cache.clear_session().await;

        assert!(cache.instance(UserId::new(6).unwrap()).await.is_none());
        assert!(cache.session_user().await.is_none());
    }
}
