pub mod audit;
pub mod hash_password;
pub mod reorder;
