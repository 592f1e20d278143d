//! Prelude module for convenient imports
//!
//! Re-exports the types needed to configure and run SymFs.
//!
//! # Example
//!
//! ```rust,no_run
//! use symfs::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let config = Config::from_file("path/to/config.json")?;
//! let mut symfs = SymFs::new(config)?;
//! symfs.generate(true)?;
//! # Ok(())
//! # }
//! ```

// Engine
pub use crate::{SymFs, SymFsBuilder};
pub use crate::materialize::MaterializeReport;
pub use crate::mapping::{GroupMapping, Mapping};

// Configuration
pub use crate::config::{
    Config, ConfigOverrides, DerivationConfig, GroupSpec, ItemMode, MergeMode, MetadataSourceConfig,
};

// Records and derivations
pub use crate::derivation::{Derivation, DerivationRegistry};
pub use crate::record::{AnyRecord, Metadata, Record, RecordType, TypeRegistry};

// Error types
pub use crate::error::{ConfigError, DerivationError, RecordError, SymFsError, Warning};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
