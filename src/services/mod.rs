pub mod company_service;
pub mod contact_service;
pub mod user_service;

pub use company_service::CompanyService;
pub use contact_service::{store_message, ContactMessage, FieldErrors};
pub use user_service::{NewUser, UserRecord, UserService};
