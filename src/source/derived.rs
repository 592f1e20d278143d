use super::{MetadataSource, ScannedItem, readable_entry};
use crate::config::ItemMode;
use crate::derivation::Derivation;
use crate::error::{Diagnostics, Warning};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Computes metadata for every matching entry under the source roots.
///
/// Symlinks are offered to the derivation like any other entry but are not
/// descended into.
pub struct DerivedSource {
    roots: Vec<PathBuf>,
    item_mode: ItemMode,
    derivation: Box<dyn Derivation>,
}

impl DerivedSource {
    pub fn new(roots: Vec<PathBuf>, item_mode: ItemMode, derivation: Box<dyn Derivation>) -> Self {
        Self {
            roots,
            item_mode,
            derivation,
        }
    }
}

impl MetadataSource for DerivedSource {
    fn scan(&mut self, diagnostics: &mut Diagnostics) -> Vec<ScannedItem> {
        let mut items = Vec::new();

        for root in &self.roots {
            let mut found = false;
            for entry in WalkDir::new(root).min_depth(1) {
                let Some(entry) = readable_entry(root, entry, diagnostics) else {
                    continue;
                };
                if !self.item_mode.accepts(entry.path()) {
                    continue;
                }
                found = true;
                match self.derivation.derive(entry.path()) {
                    Ok(record) => items.push(ScannedItem {
                        item: entry.path().to_path_buf(),
                        record,
                    }),
                    Err(error) => diagnostics.warn(Warning::DerivationFailed {
                        item: entry.path().to_path_buf(),
                        error,
                    }),
                }
            }

            if !found {
                diagnostics.warn(Warning::SourceEmpty { root: root.clone() });
            }
        }

        items
    }
}
