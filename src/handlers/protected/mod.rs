// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Admin panel operations. Every route here sits behind `jwt_auth_middleware`,
// which puts an `AuthUser` into the request extensions.

pub mod collections;
pub mod company;
pub mod upload;
pub mod users;

pub use collections::{collection_delete, collection_post, collection_put, reorder_put};
pub use company::company_post;
pub use upload::upload_post;
pub use users::{user_delete, user_put, users_get, users_post};
