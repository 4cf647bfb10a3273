pub mod database;
pub mod error;
pub mod json_file;
pub mod memory;
pub mod repository;
pub mod row_helpers;
pub mod schema;
pub mod seed;
pub mod sqlite;
pub mod store;

pub use database::Database;
pub use error::StoreError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use repository::TodoRepo;
pub use sqlite::SqliteStore;
pub use store::TodoStore;
