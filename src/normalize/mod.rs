//! Normalization of loosely typed columns into stable API shapes.

pub mod list;
pub mod slugs;

pub use list::{encode_list_column, normalize_list_column, normalize_object_column};
pub use slugs::{numeric_ids, resolve_slugs, SlugLookup};
