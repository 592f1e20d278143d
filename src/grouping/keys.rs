use super::extract::extract_field;
use crate::error::FieldError;
use crate::record::{Record, Scalar};
use ahash::AHashMap;
use itertools::{Either, Itertools};
use std::iter;

/// Separator between the values of one combination within a field.
pub const VALUE_SEPARATOR: &str = "-";

/// Separator between the fragments of consecutive fields.
pub const FIELD_SEPARATOR: &str = "/";

/// The canonical group keys a record produces for an ordered list of fields.
///
/// All field values are extracted when the generator is created, so any
/// extraction error is reported before a single key is produced. Keys are
/// then enumerated lazily by [`GroupKeys::iter`], which may be called any
/// number of times.
#[derive(Debug, Clone)]
pub struct GroupKeys {
    fragments: Vec<Vec<String>>,
}

impl GroupKeys {
    /// Builds the key fragments of every field in `fields`.
    ///
    /// `max_combo` bounds the size of the value combinations taken from a
    /// repeated field; anything below 1 is treated as 1.
    pub fn new(record: &dyn Record, fields: &[String], max_combo: u32) -> Result<Self, FieldError> {
        let max_combo = max_combo.max(1) as usize;
        let mut memo: AHashMap<&str, Vec<String>> = AHashMap::new();
        let mut fragments = Vec::with_capacity(fields.len());

        for field in fields {
            if let Some(cached) = memo.get(field.as_str()) {
                fragments.push(cached.clone());
                continue;
            }
            let values = extract_field(record, field)?;
            let field_fragments = combination_fragments(&values, max_combo);
            memo.insert(field.as_str(), field_fragments.clone());
            fragments.push(field_fragments);
        }

        Ok(Self { fragments })
    }

    /// The fragments computed for each field, in field order.
    pub fn fragments(&self) -> &[Vec<String>] {
        &self.fragments
    }

    /// Returns `true` if no key can be produced, e.g. because a field has no values.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() || self.fragments.iter().any(Vec::is_empty)
    }

    /// Number of keys [`GroupKeys::iter`] yields.
    pub fn len(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.fragments.iter().map(Vec::len).product()
    }

    /// Enumerates the cross product of the per-field fragments, leftmost
    /// field outermost, joined with [`FIELD_SEPARATOR`].
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        if self.is_empty() {
            return Either::Left(iter::empty());
        }
        Either::Right(
            self.fragments
                .iter()
                .map(|fragments| fragments.iter())
                .multi_cartesian_product()
                .map(|parts| parts.into_iter().join(FIELD_SEPARATOR)),
        )
    }
}

/// Produces one canonical fragment per combination of 1 to `max_combo` values.
///
/// Combinations are taken by position in the order the values were
/// extracted; each one is then sorted by string value and joined with
/// [`VALUE_SEPARATOR`], so the same set of values always yields the same
/// fragment.
pub fn combination_fragments(values: &[Scalar<'_>], max_combo: usize) -> Vec<String> {
    let values: Vec<String> = values.iter().map(ToString::to_string).collect();
    (1..=max_combo.min(values.len()))
        .flat_map(|size| values.iter().combinations(size))
        .map(|mut combination| {
            combination.sort();
            combination.into_iter().join(VALUE_SEPARATOR)
        })
        .collect()
}
