//! Field extraction and canonical group key generation.

mod extract;
mod keys;

pub use extract::extract_field;
pub use keys::{FIELD_SEPARATOR, GroupKeys, VALUE_SEPARATOR, combination_fragments};
