//! Identity cache domain
//!
//! Live copies of a user held for the current unit of work, e.g. the
//! session user and preloaded instances. Mutating services refresh every copy
//! before they return.

mod cache;

pub use cache::{IdentityCache, SharedUser};
