//! Repository module - MongoDB data access layer.

mod directory_repository;
mod entry_repository;

pub use directory_repository::DirectoryRepository;
pub use entry_repository::EntryRepository;
