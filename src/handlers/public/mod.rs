// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Everything the public website reads, the contact form and token acquisition.

pub mod contact;
pub mod content;
pub mod health;
pub mod login;

pub use contact::contacto_post;
pub use content::{collection_get, company_get};
pub use health::{health, root};
pub use login::login_post;
