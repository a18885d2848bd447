//! Database models.

pub mod company;
pub mod entry;
pub mod group;

pub use company::{Company, WILDCARD_HOST};
pub use entry::Entry;
pub use group::{Group, GroupMember, User};
