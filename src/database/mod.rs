pub mod collections;
pub mod columns;
pub mod manager;
pub mod repository;
pub mod row;

pub use manager::DatabaseError;
pub use repository::CollectionRepository;
