//! # SymFs - Metadata-Driven Symlink Views
//!
//! **SymFs** builds alternative directory hierarchies over an existing
//! collection of files. Every item (a file or a directory) is described by a
//! metadata record; items are grouped by the values of chosen record fields
//! and the groups are written out as a tree of symbolic links, leaving the
//! original files where they are.
//!
//! ## Core Workflow
//!
//! 1.  **Configure**: Describe the output path, the source paths, where the
//!     metadata comes from and how to group in a [`config::Config`].
//! 2.  **Build**: Use [`SymFs::builder`] to register any custom record types
//!     or derivations and validate the configuration.
//! 3.  **Group**: [`SymFs::get_mapping`] scans the sources and computes the
//!     group name → group key → items mapping.
//! 4.  **Generate**: [`SymFs::generate`] materializes the mapping as
//!     `<path>/<group>/<key>/<item>` symlinks, optionally as a dry run.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use symfs::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let config = Config {
//!         path: "/srv/views/media".into(),
//!         source_paths: vec!["/srv/media".into()],
//!         metadata: Some(MetadataSourceConfig::FilePatterns(vec![])),
//!         group_by: vec![
//!             GroupSpec::new("by_year", ["year"]),
//!             GroupSpec::new("by_tags", ["tags"]).with_max_combo(2),
//!         ],
//!     };
//!
//!     let mut symfs = SymFs::new(config)?;
//!     for (group, keys) in symfs.get_mapping() {
//!         println!("{}: {} keys", group, keys.len());
//!     }
//!
//!     let report = symfs.generate(false)?;
//!     println!("{} links created", report.created_links);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod derivation;
pub mod error;
pub mod grouping;
pub mod mapping;
pub mod materialize;
pub mod prelude;
pub mod record;
pub mod source;
mod symfs;

pub use symfs::{SymFs, SymFsBuilder};
