//! Pluggable derivations that compute metadata for a filesystem entry.
//!
//! A derivation is registered under a name in a [`DerivationRegistry`] and
//! resolved when the engine is built. Resolution constructs the derivation
//! with the parameters from the configuration, so one instance serves a
//! whole run and may keep state between items.

use crate::error::DerivationError;
use crate::record::AnyRecord;
use ahash::AHashMap;
use serde::de::DeserializeOwned;
use std::path::Path;

pub mod financials;
pub mod generic_values;

/// Computes the metadata record of one filesystem entry.
pub trait Derivation {
    fn derive(&mut self, path: &Path) -> Result<AnyRecord, DerivationError>;
}

/// A stateless derivation that receives its parameters on every call.
pub type DerivationFn = fn(&Path, &serde_json::Value) -> Result<AnyRecord, DerivationError>;

/// Constructs a derivation from its configured parameters.
pub type DerivationFactory =
    Box<dyn Fn(&serde_json::Value) -> Result<Box<dyn Derivation>, DerivationError>>;

struct FnDerivation {
    function: DerivationFn,
    parameters: serde_json::Value,
}

impl Derivation for FnDerivation {
    fn derive(&mut self, path: &Path) -> Result<AnyRecord, DerivationError> {
        (self.function)(path, &self.parameters)
    }
}

/// Name → factory table for derivations.
#[derive(Default)]
pub struct DerivationRegistry {
    factories: AHashMap<String, DerivationFactory>,
}

impl DerivationRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the derivations that ship with the crate.
    pub fn with_builtin_derivations() -> Self {
        let mut registry = Self::new();
        register_builtin_derivations(&mut registry);
        registry
    }

    /// Registers a factory under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&serde_json::Value) -> Result<Box<dyn Derivation>, DerivationError> + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// Registers a plain function as a derivation.
    pub fn register_fn(&mut self, name: impl Into<String>, function: DerivationFn) -> &mut Self {
        self.register(name, move |parameters| {
            Ok(Box::new(FnDerivation {
                function,
                parameters: parameters.clone(),
            }) as Box<dyn Derivation>)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Looks up `name` and constructs the derivation with `parameters`.
    pub fn resolve(
        &self,
        name: &str,
        parameters: &serde_json::Value,
    ) -> Result<Box<dyn Derivation>, DerivationError> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| DerivationError::UnknownDerivation(name.to_string()))?;
        factory(parameters)
    }
}

fn register_builtin_derivations(registry: &mut DerivationRegistry) {
    registry.register(financials::FROM_STATEMENT, |parameters| {
        let parameters = parse_parameters(financials::FROM_STATEMENT, parameters)?;
        Ok(Box::new(financials::FromStatement::new(parameters)?) as Box<dyn Derivation>)
    });
    registry.register(generic_values::FIXED_GROUPING, |parameters| {
        let parameters = parse_parameters(generic_values::FIXED_GROUPING, parameters)?;
        Ok(Box::new(generic_values::FixedGrouping::new(parameters)) as Box<dyn Derivation>)
    });
}

/// Decodes a derivation's parameters; `null` yields the defaults.
pub fn parse_parameters<P>(name: &str, parameters: &serde_json::Value) -> Result<P, DerivationError>
where
    P: DeserializeOwned + Default,
{
    if parameters.is_null() {
        return Ok(P::default());
    }
    serde_json::from_value(parameters.clone()).map_err(|source| DerivationError::InvalidParameters {
        name: name.to_string(),
        source,
    })
}
