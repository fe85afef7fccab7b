//! Identity cache trait

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId};

/// A live user copy shared between request-scoped holders
pub type SharedUser = Arc<RwLock<User>>;

#[async_trait]
pub trait IdentityCache: Send + Sync + Debug {
    /// Every distinct live copy of the given user, possibly none
    async fn cached_copies(&self, id: UserId) -> Vec<SharedUser>;
}
