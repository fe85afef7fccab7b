//! Group membership management

mod service;

pub use service::MembershipService;
