//! Structured metadata records.
//!
//! A record is any value implementing [`Record`]: it has a type name and
//! exposes its fields by name as a [`FieldValue`]. Sources deliver records
//! as type-tagged [`AnyRecord`] payloads, which the [`TypeRegistry`] turns
//! back into concrete records before field extraction.

use crate::error::RecordError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Defines concrete record structs together with their [`Record`] and
/// [`RecordType`] implementations.
///
/// Every field type must implement [`AsFieldValue`]. Nested records are
/// declared in the same invocation so they get an implementation as well.
macro_rules! define_records {
    ( $( $(#[$meta:meta])* $name:ident => $type_name:literal { $( $(#[$fmeta:meta])* $field:ident : $ty:ty ),* $(,)? } )* ) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
            #[serde(default, deny_unknown_fields)]
            pub struct $name {
                $( $(#[$fmeta])* pub $field: $ty, )*
            }

            impl $crate::record::Record for $name {
                fn type_name(&self) -> &str {
                    $type_name
                }

                fn field(&self, name: &str) -> Option<$crate::record::FieldValue<'_>> {
                    match name {
                        $( stringify!($field) => Some($crate::record::AsFieldValue::as_field_value(&self.$field)), )*
                        _ => None,
                    }
                }
            }

            impl $crate::record::RecordType for $name {
                const TYPE_NAME: &'static str = $type_name;
            }

            impl $crate::record::AsFieldValue for $name {
                fn as_field_value(&self) -> $crate::record::FieldValue<'_> {
                    $crate::record::FieldValue::Message(self)
                }
            }
        )*

        /// Registers every record type declared alongside this function.
        pub(crate) fn register_builtin_types(registry: &mut $crate::record::TypeRegistry) {
            $( registry.register::<$name>(); )*
        }
    };
}

pub mod ext;
mod registry;

pub use registry::TypeRegistry;

/// A single atomic value. Strings are never split into characters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar<'a> {
    Str(&'a str),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Str(s) => write!(f, "{}", s),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::UInt(n) => write!(f, "{}", n),
            Scalar::Float(n) => write!(f, "{}", n),
            Scalar::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// The value found at a field of a record.
#[derive(Clone, Copy)]
pub enum FieldValue<'a> {
    Scalar(Scalar<'a>),
    Repeated(&'a dyn RepeatedScalars),
    Message(&'a dyn Record),
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(s) => f.debug_tuple("Scalar").field(s).finish(),
            FieldValue::Repeated(r) => f.debug_tuple("Repeated").field(&r.scalars()).finish(),
            FieldValue::Message(m) => f.debug_tuple("Message").field(&m.type_name()).finish(),
        }
    }
}

/// A structured metadata record with named, possibly nested fields.
pub trait Record: fmt::Debug {
    /// The fully qualified name of the record's type.
    fn type_name(&self) -> &str;

    /// Returns the field called `name`, or `None` if the type has no such field.
    fn field(&self, name: &str) -> Option<FieldValue<'_>>;
}

/// A record type that can be registered with a [`TypeRegistry`] and packed
/// into an [`AnyRecord`].
pub trait RecordType: Record + Serialize + DeserializeOwned + 'static {
    const TYPE_NAME: &'static str;
}

/// Converts a struct field into the [`FieldValue`] a record exposes for it.
pub trait AsFieldValue {
    fn as_field_value(&self) -> FieldValue<'_>;
}

/// A value usable as an element of a repeated field.
pub trait AsScalar {
    fn as_scalar(&self) -> Scalar<'_>;
}

/// Object-safe view over a repeated scalar field.
pub trait RepeatedScalars {
    fn scalars(&self) -> Vec<Scalar<'_>>;
}

impl<T: AsScalar> RepeatedScalars for Vec<T> {
    fn scalars(&self) -> Vec<Scalar<'_>> {
        self.iter().map(AsScalar::as_scalar).collect()
    }
}

impl<T: AsScalar> AsFieldValue for Vec<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Repeated(self)
    }
}

macro_rules! impl_scalar {
    ( $( $ty:ty => |$v:ident| $conv:expr ),* $(,)? ) => {
        $(
            impl AsScalar for $ty {
                fn as_scalar(&self) -> Scalar<'_> {
                    let $v = self;
                    $conv
                }
            }

            impl AsFieldValue for $ty {
                fn as_field_value(&self) -> FieldValue<'_> {
                    FieldValue::Scalar(self.as_scalar())
                }
            }
        )*
    };
}

impl_scalar! {
    String => |v| Scalar::Str(v.as_str()),
    bool => |v| Scalar::Bool(*v),
    i32 => |v| Scalar::Int(i64::from(*v)),
    i64 => |v| Scalar::Int(*v),
    u32 => |v| Scalar::UInt(u64::from(*v)),
    u64 => |v| Scalar::UInt(*v),
    f64 => |v| Scalar::Float(*v),
}

/// A type-tagged record payload whose concrete shape is resolved at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnyRecord {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

impl AnyRecord {
    /// Packs a concrete record, tagging it with its type name.
    pub fn pack<T: RecordType>(record: &T) -> Result<Self, RecordError> {
        let value = serde_json::to_value(record).map_err(|source| RecordError::Encode {
            type_name: T::TYPE_NAME.to_string(),
            source,
        })?;
        Ok(Self {
            type_name: T::TYPE_NAME.to_string(),
            value,
        })
    }

    /// Unpacks into `T` if the payload is tagged with `T`'s type name.
    pub fn unpack<T: RecordType>(&self) -> Result<T, RecordError> {
        if self.type_name != T::TYPE_NAME {
            return Err(RecordError::UnknownType(self.type_name.clone()));
        }
        serde_json::from_value(self.value.clone()).map_err(|source| RecordError::Decode {
            type_name: self.type_name.clone(),
            source,
        })
    }
}

/// A metadata sidecar document: `{ "data": { "type": ..., "value": {...} } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub data: AnyRecord,
}

impl Metadata {
    pub fn new(data: AnyRecord) -> Self {
        Self { data }
    }

    /// Loads a metadata document from a file.
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(content.parse()?)
    }
}

impl FromStr for Metadata {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s)
    }
}
