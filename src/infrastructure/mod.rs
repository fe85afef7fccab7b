//! Infrastructure layer - concrete stores, handlers and services

pub mod access;
pub mod group;
pub mod identity;
pub mod logging;
pub mod membership;
pub mod password;
pub mod storage;
pub mod user;
