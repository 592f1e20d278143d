use crate::config::GroupSpec;
use crate::error::{Diagnostics, Warning};
use crate::grouping::GroupKeys;
use crate::record::{Record, TypeRegistry};
use crate::source::{MetadataSource, ScannedItem};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Group key → items filed under that key.
pub type GroupMapping = BTreeMap<String, BTreeSet<PathBuf>>;

/// Group name → group key → items.
pub type Mapping = BTreeMap<String, GroupMapping>;

/// Aggregates scanned items into a [`Mapping`] according to the group specs.
pub struct MappingBuilder<'a> {
    group_by: &'a [GroupSpec],
    types: &'a TypeRegistry,
}

impl<'a> MappingBuilder<'a> {
    pub fn new(group_by: &'a [GroupSpec], types: &'a TypeRegistry) -> Self {
        Self { group_by, types }
    }

    /// Scans `source` and groups every item it yields.
    ///
    /// Every group spec gets an entry as soon as one item has been scanned,
    /// even if that item contributes no key to it.
    /// Items whose record cannot be decoded, and (item, spec) pairs whose
    /// fields cannot be extracted, are reported and skipped.
    pub fn build(&self, source: &mut dyn MetadataSource, diagnostics: &mut Diagnostics) -> Mapping {
        let mut mapping = Mapping::new();

        for scanned in source.scan(diagnostics) {
            self.add_item(&mut mapping, scanned, diagnostics);
        }

        mapping
    }

    fn add_item(&self, mapping: &mut Mapping, scanned: ScannedItem, diagnostics: &mut Diagnostics) {
        let ScannedItem { item, record } = scanned;
        let record = match self.types.unpack(&record) {
            Ok(record) => record,
            Err(error) => {
                diagnostics.warn(Warning::UnknownRecordType { item, error });
                return;
            }
        };

        for spec in self.group_by {
            self.add_to_group(mapping, spec, &item, record.as_ref(), diagnostics);
        }
    }

    fn add_to_group(
        &self,
        mapping: &mut Mapping,
        spec: &GroupSpec,
        item: &Path,
        record: &dyn Record,
        diagnostics: &mut Diagnostics,
    ) {
        let group = mapping.entry(spec.name.clone()).or_default();
        let keys = match GroupKeys::new(record, &spec.fields, spec.max_combo) {
            Ok(keys) => keys,
            Err(error) => {
                diagnostics.warn(Warning::FieldExtraction {
                    group: spec.name.clone(),
                    item: item.to_path_buf(),
                    error,
                });
                return;
            }
        };

        for key in keys.iter() {
            log::debug!("{}: {} -> {}", spec.name, key, item.display());
            group.entry(key).or_default().insert(item.to_path_buf());
        }
    }
}
