//! Database module exports.

mod models;
mod mongo;
mod repository;
mod store;

#[cfg(test)]
pub mod memory;

pub use models::*;
pub use mongo::Database;
pub use repository::{DirectoryRepository, EntryRepository};
pub use store::{Directory, EntryStore};
