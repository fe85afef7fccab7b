//! Group entity and membership set

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Group identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(i64);

impl GroupId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for GroupId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for GroupId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for GroupId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

/// Group entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    id: GroupId,
    title: String,
}

impl Group {
    pub fn new(id: GroupId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

/// The set of groups a user belongs to
///
/// Ordered and gap-free: iteration always yields the ids in ascending order,
/// which keeps positional query binding stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSet(BTreeSet<GroupId>);

impl GroupSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.0.contains(&id)
    }

    /// Adds a group, returning `false` when it was already present
    pub fn insert(&mut self, id: GroupId) -> bool {
        self.0.insert(id)
    }

    /// Removes a group, returning `false` when it was not present
    pub fn remove(&mut self, id: GroupId) -> bool {
        self.0.remove(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = GroupId> + '_ {
        self.0.iter().copied()
    }

    /// Raw ids, ready to be bound as a query parameter array
    pub fn to_vec(&self) -> Vec<i64> {
        self.0.iter().map(GroupId::value).collect()
    }

    /// Id-to-id mapping used by callers that expect the keyed encoding
    pub fn as_map(&self) -> BTreeMap<GroupId, GroupId> {
        self.0.iter().map(|id| (*id, *id)).collect()
    }
}

impl FromIterator<GroupId> for GroupSet {
    fn from_iter<T: IntoIterator<Item = GroupId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<i64> for GroupSet {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self(iter.into_iter().map(GroupId::new).collect())
    }
}

impl<'a> IntoIterator for &'a GroupSet {
    type Item = GroupId;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, GroupId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
