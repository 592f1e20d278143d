//! Common test utilities: fixture paths, records and in-memory sources.
use std::fs;
use std::path::{Path, PathBuf};
use symfs::error::Diagnostics;
use symfs::mapping::{GroupMapping, Mapping};
use symfs::prelude::*;
use symfs::record::ext::{InnerTestMessage, Media, TestMessage};
use symfs::source::{MetadataSource, ScannedItem};

/// The `tests/data` fixture directory, canonicalized.
#[allow(dead_code)]
pub fn data_dir() -> PathBuf {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data");
    fs::canonicalize(&dir).expect("Fixture directory is missing")
}

/// Loads `tests/data/config.json` with the fixture directory as its only source.
#[allow(dead_code)]
pub fn load_config(output: &Path) -> Config {
    let mut config =
        Config::from_file(data_dir().join("config.json")).expect("Failed to load fixture config");
    config.path = output.to_path_buf();
    config.source_paths = vec![data_dir()];
    config
}

/// The record stored in `tests/data/metadata.json`.
#[allow(dead_code)]
pub fn test_message() -> TestMessage {
    TestMessage {
        s: "s_value".to_string(),
        rs: vec!["rs_value_0".to_string(), "rs_value_1".to_string()],
        m: InnerTestMessage {
            value: "v_value".to_string(),
        },
    }
}

#[allow(dead_code)]
pub fn media(title: &str, year: u32, tags: &[&str]) -> Media {
    Media {
        title: title.to_string(),
        kind: "film".to_string(),
        year,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[allow(dead_code)]
pub fn pack<T: RecordType>(record: &T) -> AnyRecord {
    AnyRecord::pack(record).expect("Failed to pack record")
}

/// Writes `record` as the `metadata.json` sidecar of `dir`, creating `dir`.
#[allow(dead_code)]
pub fn write_metadata<T: RecordType>(dir: &Path, record: &T) {
    fs::create_dir_all(dir).expect("Failed to create item directory");
    let json = serde_json::to_string_pretty(&Metadata::new(pack(record)))
        .expect("Failed to serialize metadata");
    fs::write(dir.join("metadata.json"), json).expect("Failed to write metadata");
}

/// Builds a mapping from `(group, key, items)` triples.
#[allow(dead_code)]
pub fn mapping_of(entries: &[(&str, &str, &[&Path])]) -> Mapping {
    let mut mapping = Mapping::new();
    for (group, key, items) in entries {
        let group: &mut GroupMapping = mapping.entry(group.to_string()).or_default();
        group
            .entry(key.to_string())
            .or_default()
            .extend(items.iter().map(|item| item.to_path_buf()));
    }
    mapping
}

/// The mapping `tests/data/config.json` plus a `by_m` group produces.
#[allow(dead_code)]
pub fn expected_mapping() -> Mapping {
    let dir = data_dir();
    let item: &[&Path] = &[dir.as_path()];
    mapping_of(&[
        ("by_s", "s_value", item),
        ("by_rs", "rs_value_0", item),
        ("by_rs", "rs_value_1", item),
        ("by_rs", "rs_value_0-rs_value_1", item),
        ("by_m", "v_value", item),
    ])
}

/// Reads a generated tree back into a mapping, resolving every link.
/// Only handles single-field keys.
#[allow(dead_code)]
pub fn read_tree(root: &Path) -> Mapping {
    let mut mapping = Mapping::new();
    for group in fs::read_dir(root).expect("Failed to read output root") {
        let group = group.expect("Failed to read group entry").path();
        let group_name = group.file_name().unwrap().to_string_lossy().to_string();
        let keys = mapping.entry(group_name).or_default();
        for key in fs::read_dir(&group).expect("Failed to read group") {
            let key = key.expect("Failed to read key entry").path();
            let key_name = key.file_name().unwrap().to_string_lossy().to_string();
            let items = keys.entry(key_name).or_default();
            for link in fs::read_dir(&key).expect("Failed to read key") {
                let link = link.expect("Failed to read link entry").path();
                items.insert(fs::read_link(&link).expect("Expected a symlink"));
            }
        }
    }
    mapping
}

/// A metadata source that hands out a fixed list of items.
#[allow(dead_code)]
pub struct StaticSource {
    pub items: Vec<ScannedItem>,
    pub scans: usize,
}

#[allow(dead_code)]
impl StaticSource {
    pub fn new(items: Vec<ScannedItem>) -> Self {
        Self { items, scans: 0 }
    }
}

impl MetadataSource for StaticSource {
    fn scan(&mut self, _diagnostics: &mut Diagnostics) -> Vec<ScannedItem> {
        self.scans += 1;
        self.items.clone()
    }
}

#[allow(dead_code)]
pub fn scanned<T: RecordType>(item: &str, record: &T) -> ScannedItem {
    ScannedItem {
        item: PathBuf::from(item),
        record: pack(record),
    }
}

/// Renders every warning, for substring assertions.
#[allow(dead_code)]
pub fn warning_messages(warnings: &[Warning]) -> Vec<String> {
    warnings.iter().map(ToString::to_string).collect()
}
