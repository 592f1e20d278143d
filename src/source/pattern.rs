use super::{MetadataSource, ScannedItem, readable_entry};
use crate::config::DEFAULT_METADATA_FILE_PATTERN;
use crate::error::{ConfigError, Diagnostics, Warning};
use crate::record::Metadata;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Reads metadata sidecar files found under the source roots.
///
/// Every regular file whose name matches one of the patterns (at the start
/// of the name) is parsed as a [`Metadata`] document describing the
/// directory that contains it.
#[derive(Debug)]
pub struct PatternSource {
    roots: Vec<PathBuf>,
    patterns: Vec<Regex>,
}

impl PatternSource {
    /// Compiles `patterns`; an empty list selects [`DEFAULT_METADATA_FILE_PATTERN`].
    pub fn new(roots: Vec<PathBuf>, patterns: &[String]) -> Result<Self, ConfigError> {
        let default = [DEFAULT_METADATA_FILE_PATTERN.to_string()];
        let patterns = if patterns.is_empty() { &default[..] } else { patterns };
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { roots, patterns })
    }

    fn matches(&self, file_name: &str) -> bool {
        self.patterns
            .iter()
            .any(|pattern| pattern.find(file_name).is_some_and(|m| m.start() == 0))
    }

    fn scan_root(&self, root: &Path, items: &mut Vec<ScannedItem>, diagnostics: &mut Diagnostics) {
        let mut found = false;
        for entry in WalkDir::new(root) {
            let Some(entry) = readable_entry(root, entry, diagnostics) else {
                continue;
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            if !self.matches(file_name) {
                continue;
            }
            found = true;

            let metadata = match Metadata::from_file(entry.path()) {
                Ok(metadata) => metadata,
                Err(e) => {
                    diagnostics.warn(Warning::UnreadableMetadata {
                        file: entry.path().to_path_buf(),
                        message: e.to_string(),
                    });
                    continue;
                }
            };
            let item = entry
                .path()
                .parent()
                .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
            log::debug!("Found metadata for {} in {}", item.display(), file_name);
            items.push(ScannedItem {
                item,
                record: metadata.data,
            });
        }

        if !found {
            diagnostics.warn(Warning::SourceEmpty {
                root: root.to_path_buf(),
            });
        }
    }
}

impl MetadataSource for PatternSource {
    fn scan(&mut self, diagnostics: &mut Diagnostics) -> Vec<ScannedItem> {
        let mut items = Vec::new();
        for root in &self.roots {
            self.scan_root(root, &mut items, diagnostics);
        }
        items
    }
}
