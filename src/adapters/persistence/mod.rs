//! Storage adapters for categories, conversations, participants and users.

pub mod memory_repo;
pub mod sqlite_repo;

pub use memory_repo::InMemoryRepo;
pub use sqlite_repo::SqliteRepo;
