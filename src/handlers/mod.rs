// handlers/mod.rs - two security tiers
//
// Public (no auth): website reads, contact form, login
// Protected (JWT auth): admin panel writes, reorder, users, uploads

pub mod protected;
pub mod public;

use crate::database::collections::{self, Collection};
use crate::error::ApiError;

/// Look up a collection by its route segment
pub(crate) fn resolve_collection(name: &str) -> Result<&'static Collection, ApiError> {
    collections::find(name).ok_or_else(|| ApiError::not_found(format!("Unknown collection '{}'", name)))
}
