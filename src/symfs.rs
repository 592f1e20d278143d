use crate::config::{Config, MetadataSourceConfig};
use crate::derivation::{Derivation, DerivationRegistry};
use crate::error::{ConfigError, DerivationError, Diagnostics, SymFsError, Warning};
use crate::mapping::{Mapping, MappingBuilder};
use crate::materialize::{MaterializeReport, TreeMaterializer};
use crate::record::{RecordType, TypeRegistry};
use crate::source::{DerivedSource, MetadataSource, PatternSource};

/// A configured run: scans the source paths, groups the items and writes
/// the symlink tree under the configured path.
pub struct SymFs {
    config: Config,
    types: TypeRegistry,
    source: Box<dyn MetadataSource>,
    mapping: Mapping,
    diagnostics: Diagnostics,
}

pub struct SymFsBuilder {
    config: Config,
    types: TypeRegistry,
    derivations: DerivationRegistry,
}

impl SymFsBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            types: TypeRegistry::with_builtin_types(),
            derivations: DerivationRegistry::with_builtin_derivations(),
        }
    }

    /// Makes records of type `T` decodable in addition to the built-in ones.
    pub fn with_record_type<T: RecordType>(mut self) -> Self {
        self.types.register::<T>();
        self
    }

    /// Registers a derivation factory under `name`.
    pub fn with_derivation<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&serde_json::Value) -> Result<Box<dyn Derivation>, DerivationError> + 'static,
    {
        self.derivations.register(name, factory);
        self
    }

    /// Replaces the type registry, built-in types included.
    pub fn with_type_registry(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Replaces the derivation registry, built-in derivations included.
    pub fn with_derivation_registry(mut self, derivations: DerivationRegistry) -> Self {
        self.derivations = derivations;
        self
    }

    /// Validates the configuration and sets up the metadata source.
    ///
    /// Relative output or source paths are accepted but reported, since the
    /// links they produce may not resolve from inside the generated tree.
    pub fn build(self) -> Result<SymFs, ConfigError> {
        let Self {
            config,
            types,
            derivations,
        } = self;

        if config.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingOutputPath);
        }
        for spec in &config.group_by {
            spec.validate()?;
        }

        let roots = config.source_paths.clone();
        let source: Box<dyn MetadataSource> = match config.metadata_source()? {
            MetadataSourceConfig::FilePatterns(patterns) => {
                Box::new(PatternSource::new(roots, patterns)?)
            }
            MetadataSourceConfig::Derivation(derivation) => {
                let resolved =
                    derivations.resolve(&derivation.derivation_name, &derivation.parameters)?;
                Box::new(DerivedSource::new(roots, derivation.item_mode, resolved))
            }
        };

        let mut diagnostics = Diagnostics::new();
        for path in std::iter::once(&config.path).chain(&config.source_paths) {
            if path.is_relative() {
                diagnostics.warn(Warning::RelativePath { path: path.clone() });
            }
        }

        Ok(SymFs {
            config,
            types,
            source,
            mapping: Mapping::new(),
            diagnostics,
        })
    }
}

impl SymFs {
    /// Builds an engine with the built-in record types and derivations.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    pub fn builder(config: Config) -> SymFsBuilder {
        SymFsBuilder::new(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the grouping of the source items.
    ///
    /// The first call scans the sources. Later calls reuse the result unless
    /// it came out empty, in which case the sources are scanned again.
    pub fn get_mapping(&mut self) -> &Mapping {
        if self.mapping.is_empty() {
            self.mapping = MappingBuilder::new(&self.config.group_by, &self.types)
                .build(self.source.as_mut(), &mut self.diagnostics);
        }
        &self.mapping
    }

    /// Materializes the mapping under the configured path. With `dry_run`
    /// set, everything is computed and logged but nothing is written.
    pub fn generate(&mut self, dry_run: bool) -> Result<MaterializeReport, SymFsError> {
        self.get_mapping();
        let materializer = TreeMaterializer::new(&self.config.path, dry_run);
        let report = materializer.materialize(&self.mapping, &mut self.diagnostics)?;
        log::info!(
            "{} directories and {} links created, {} links up to date, {} conflicts",
            report.created_dirs,
            report.created_links,
            report.unchanged_links,
            report.conflicts
        );
        Ok(report)
    }

    /// Every warning reported so far, in the order it was raised.
    pub fn warnings(&self) -> &[Warning] {
        self.diagnostics.warnings()
    }
}
