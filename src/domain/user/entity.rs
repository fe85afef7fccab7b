//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{UserValidationError, validate_user_id};
use crate::domain::group::{GroupId, GroupSet};

/// User identifier - positive integer assigned at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: i64) -> Result<Self, UserValidationError> {
        validate_user_id(id)?;
        Ok(Self(id))
    }

    /// Interpret a raw id where zero or negative means "no user"
    pub fn optional(id: i64) -> Option<Self> {
        Self::new(id).ok()
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for i64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block state of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    /// User can log in
    #[default]
    Active,
    /// User is blocked, either by an administrator or pending activation
    Blocked,
}

impl UserStatus {
    /// Check if the user can log in
    pub fn can_login(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Plain field bag used by store adapters to rebuild a [`User`]
#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: UserId,
    pub username: String,
    pub password_hash: String,
    pub groups: GroupSet,
    pub status: UserStatus,
    pub activation: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_visit_at: Option<DateTime<Utc>>,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    /// Encoded credential - never exposed in serialization
    #[serde(skip_serializing, default)]
    password_hash: String,
    groups: GroupSet,
    status: UserStatus,
    /// Pending activation token - never exposed in serialization
    #[serde(skip_serializing, default)]
    activation: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_visit_at: Option<DateTime<Utc>>,
}

impl User {
    /// Create a new active user with no groups
    pub fn new(id: UserId, username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        let now = Utc::now();

        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            groups: GroupSet::new(),
            status: UserStatus::Active,
            activation: None,
            created_at: now,
            updated_at: now,
            last_visit_at: None,
        }
    }

    /// Set the initial groups (builder pattern)
    pub fn with_groups(mut self, groups: GroupSet) -> Self {
        self.groups = groups;
        self
    }

    /// Mark the account as awaiting activation (builder pattern)
    pub fn pending_activation(mut self, token: impl Into<String>) -> Self {
        self.status = UserStatus::Blocked;
        self.activation = Some(token.into());
        self
    }

    // Getters

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn activation(&self) -> Option<&str> {
        self.activation.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn last_visit_at(&self) -> Option<DateTime<Utc>> {
        self.last_visit_at
    }

    pub fn is_member_of(&self, group: GroupId) -> bool {
        self.groups.contains(group)
    }

    pub fn is_active(&self) -> bool {
        self.status.can_login()
    }

    /// Blocked, never visited and waiting on exactly this token
    pub fn awaits_activation_with(&self, token: &str) -> bool {
        self.status == UserStatus::Blocked
            && self.last_visit_at.is_none()
            && self.activation.as_deref() == Some(token)
    }

    // Mutators

    pub fn set_password_hash(&mut self, password_hash: impl Into<String>) {
        self.password_hash = password_hash.into();
        self.touch();
    }

    /// Add a group, returning `false` if the user was already a member
    pub fn add_group(&mut self, group: GroupId) -> bool {
        let added = self.groups.insert(group);
        if added {
            self.touch();
        }
        added
    }

    /// Remove a group, returning `false` if the user was not a member
    pub fn remove_group(&mut self, group: GroupId) -> bool {
        let removed = self.groups.remove(group);
        if removed {
            self.touch();
        }
        removed
    }

    pub fn set_groups(&mut self, groups: GroupSet) {
        self.groups = groups;
        self.touch();
    }

    pub fn block(&mut self) {
        self.status = UserStatus::Blocked;
        self.touch();
    }

    /// Unblock the account and clear any pending activation token
    pub fn activate(&mut self) {
        self.status = UserStatus::Active;
        self.activation = None;
        self.touch();
    }

    pub fn record_visit(&mut self) {
        self.last_visit_at = Some(Utc::now());
    }

    /// Copy every mutable field from a fresher copy of the same user
    pub fn sync_from(&mut self, fresher: &User) {
        debug_assert_eq!(self.id, fresher.id);

        self.username.clone_from(&fresher.username);
        self.password_hash.clone_from(&fresher.password_hash);
        self.groups.clone_from(&fresher.groups);
        self.status = fresher.status;
        self.activation.clone_from(&fresher.activation);
        self.updated_at = fresher.updated_at;
        self.last_visit_at = fresher.last_visit_at;
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        Self {
            id: stored.id,
            username: stored.username,
            password_hash: stored.password_hash,
            groups: stored.groups,
            status: stored.status,
            activation: stored.activation,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
            last_visit_at: stored.last_visit_at,
        }
    }
}
