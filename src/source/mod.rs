//! Metadata sources produce the `(item, record)` pairs a run groups.

use crate::error::{Diagnostics, Warning};
use crate::record::AnyRecord;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::DirEntry;

mod derived;
mod pattern;

pub use derived::DerivedSource;
pub use pattern::PatternSource;

/// An item together with the metadata describing it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedItem {
    pub item: PathBuf,
    pub record: AnyRecord,
}

/// Produces the items of a run and their metadata.
///
/// Conditions that only affect part of the scan (an empty root, an
/// unreadable file) are reported through `diagnostics`; the rest of the
/// scan carries on.
pub trait MetadataSource {
    fn scan(&mut self, diagnostics: &mut Diagnostics) -> Vec<ScannedItem>;
}

/// Unwraps one step of a directory walk, reporting entries that cannot be
/// read. A missing root is left to [`Warning::SourceEmpty`].
fn readable_entry(
    root: &Path,
    entry: walkdir::Result<DirEntry>,
    diagnostics: &mut Diagnostics,
) -> Option<DirEntry> {
    let error = match entry {
        Ok(entry) => return Some(entry),
        Err(error) => error,
    };
    let missing_root = error.depth() == 0
        && error
            .io_error()
            .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
    if !missing_root {
        diagnostics.warn(Warning::UnreadableEntry {
            path: error.path().unwrap_or(root).to_path_buf(),
            message: error.to_string(),
        });
    }
    None
}
