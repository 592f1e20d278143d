//! Run configuration: where to look, how to read metadata, how to group.
//!
//! Configuration is stored as JSON:
//!
//! ```json
//! {
//!   "path": "/srv/views/statements",
//!   "source_paths": ["/srv/archive/statements"],
//!   "metadata": {
//!     "derivation": {
//!       "item_mode": "files",
//!       "derivation_name": "financials.from_statement"
//!     }
//!   },
//!   "group_by": [
//!     { "name": "by_account", "fields": ["institution", "account", "date.year"] }
//!   ]
//! }
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Sidecar file pattern used when a file pattern source lists no patterns.
pub const DEFAULT_METADATA_FILE_PATTERN: &str = r"^metadata\.json$";

fn default_max_combo() -> u32 {
    1
}

/// One grouping axis: items are grouped under `name` by the values of `fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub name: String,
    #[serde(alias = "field")]
    pub fields: Vec<String>,
    /// Largest number of values of a repeated field combined into one key.
    #[serde(default = "default_max_combo", alias = "max_repeated_group")]
    pub max_combo: u32,
}

impl GroupSpec {
    pub fn new<S: Into<String>>(name: impl Into<String>, fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            name: name.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            max_combo: default_max_combo(),
        }
    }

    pub fn with_max_combo(mut self, max_combo: u32) -> Self {
        self.max_combo = max_combo;
        self
    }

    /// Checks that the spec names a group and at least one non-empty field path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: &str| ConfigError::InvalidGroupSpec {
            spec: format!("{}:{}", self.name, self.fields.join(",")),
            message: message.to_string(),
        };
        if self.name.is_empty() {
            return Err(invalid("group name is empty"));
        }
        if self.name.contains('/') || matches!(self.name.as_str(), "." | "..") {
            return Err(invalid("group name must be a single directory name"));
        }
        if self.fields.is_empty() {
            return Err(invalid("no fields given"));
        }
        if self
            .fields
            .iter()
            .any(|field| field.split('.').any(str::is_empty))
        {
            return Err(invalid("field paths must not contain empty segments"));
        }
        Ok(())
    }
}

/// Parses the command line form `name:field[,field...]`.
impl FromStr for GroupSpec {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, fields) = s.split_once(':').ok_or_else(|| ConfigError::InvalidGroupSpec {
            spec: s.to_string(),
            message: "expected `name:field[,field...]`".to_string(),
        })?;
        let spec = GroupSpec::new(name.trim(), fields.split(',').map(str::trim));
        spec.validate()?;
        Ok(spec)
    }
}

/// Which filesystem entries a derivation is run against.
///
/// Symlinks are classified by what they point at, so a link to a file is
/// a file. A dangling link is only accepted by [`ItemMode::All`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemMode {
    #[default]
    All,
    Files,
    Directories,
}

impl ItemMode {
    pub fn accepts(&self, path: &Path) -> bool {
        match self {
            ItemMode::All => true,
            ItemMode::Files => path.is_file(),
            ItemMode::Directories => path.is_dir(),
        }
    }
}

/// Selects a registered derivation and the parameters it is constructed with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivationConfig {
    #[serde(default)]
    pub item_mode: ItemMode,
    #[serde(alias = "function_name")]
    pub derivation_name: String,
    /// Opaque to the engine; interpreted by the derivation itself.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl DerivationConfig {
    pub fn new(derivation_name: impl Into<String>) -> Self {
        Self {
            item_mode: ItemMode::default(),
            derivation_name: derivation_name.into(),
            parameters: serde_json::Value::Null,
        }
    }

    pub fn with_item_mode(mut self, item_mode: ItemMode) -> Self {
        self.item_mode = item_mode;
        self
    }

    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = parameters;
        self
    }
}

/// How metadata is obtained for the items under the source paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSourceConfig {
    /// Read sidecar files whose names match any of these regular expressions.
    FilePatterns(Vec<String>),
    /// Compute metadata for each entry with a registered derivation.
    Derivation(DerivationConfig),
}

/// How list-valued overrides combine with the values from the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeMode {
    Append,
    #[default]
    Replace,
}

/// Values supplied on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub path: Option<PathBuf>,
    pub source_paths: Vec<PathBuf>,
    pub group_by: Vec<GroupSpec>,
    pub merge: MergeMode,
}

/// The fully resolved configuration of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Root of the generated tree.
    #[serde(default)]
    pub path: PathBuf,
    #[serde(default)]
    pub source_paths: Vec<PathBuf>,
    #[serde(default)]
    pub metadata: Option<MetadataSourceConfig>,
    #[serde(default)]
    pub group_by: Vec<GroupSpec>,
}

impl Config {
    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    /// Applies command line overrides. Empty list overrides leave the
    /// configured lists untouched regardless of the merge mode.
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.path {
            self.path = path;
        }
        merge_list(&mut self.source_paths, overrides.source_paths, overrides.merge);
        merge_list(&mut self.group_by, overrides.group_by, overrides.merge);
    }

    /// Returns the selected metadata source.
    pub fn metadata_source(&self) -> Result<&MetadataSourceConfig, ConfigError> {
        self.metadata.as_ref().ok_or(ConfigError::NoMetadataSource)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

fn merge_list<T>(target: &mut Vec<T>, values: Vec<T>, merge: MergeMode) {
    if values.is_empty() {
        return;
    }
    match merge {
        MergeMode::Append => target.extend(values),
        MergeMode::Replace => *target = values,
    }
}
