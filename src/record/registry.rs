use super::{AnyRecord, Record, RecordType};
use crate::error::RecordError;
use ahash::AHashMap;
use serde::Deserialize;

type Decoder = fn(&serde_json::Value) -> Result<Box<dyn Record>, serde_json::Error>;

fn decode<T: RecordType>(value: &serde_json::Value) -> Result<Box<dyn Record>, serde_json::Error> {
    // An absent payload decodes as a record with every field at its default.
    let record: T = if value.is_null() {
        T::deserialize(&serde_json::Value::Object(serde_json::Map::new()))?
    } else {
        T::deserialize(value)?
    };
    Ok(Box::new(record))
}

/// Maps record type names to decoders for their concrete shape.
///
/// A registry is populated before a run starts and handed to the engine;
/// nothing is looked up from global state.
#[derive(Default)]
pub struct TypeRegistry {
    decoders: AHashMap<String, Decoder>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every record type shipped in [`crate::record::ext`].
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        super::ext::register_builtin_types(&mut registry);
        registry
    }

    /// Registers `T` under its type name, replacing any previous entry.
    pub fn register<T: RecordType>(&mut self) -> &mut Self {
        self.decoders.insert(T::TYPE_NAME.to_string(), decode::<T>);
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.decoders.contains_key(type_name)
    }

    /// Resolves the payload's type name and decodes it into a concrete record.
    pub fn unpack(&self, any: &AnyRecord) -> Result<Box<dyn Record>, RecordError> {
        let decoder = self
            .decoders
            .get(&any.type_name)
            .ok_or_else(|| RecordError::UnknownType(any.type_name.clone()))?;
        decoder(&any.value).map_err(|source| RecordError::Decode {
            type_name: any.type_name.clone(),
            source,
        })
    }
}
