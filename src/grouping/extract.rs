use crate::error::FieldError;
use crate::record::{FieldValue, Record, Scalar};

/// Returns the values at a (possibly nested) field path as a sequence.
///
/// Every segment but the last must resolve to a nested record. A repeated
/// terminal field is returned in declaration order; a scalar terminal field
/// is wrapped in a single-element vector.
///
/// # Errors
///
/// * [`FieldError::NoSuchField`] if a segment does not exist.
/// * [`FieldError::NotARecord`] if a non-terminal segment is a scalar or repeated field.
/// * [`FieldError::NonScalarField`] if the terminal segment is a nested record.
pub fn extract_field<'a>(
    record: &'a dyn Record,
    path: &str,
) -> Result<Vec<Scalar<'a>>, FieldError> {
    let (parents, terminal) = match path.rsplit_once('.') {
        Some((parents, terminal)) => (Some(parents), terminal),
        None => (None, path),
    };

    let mut current = record;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        match lookup(current, segment)? {
            FieldValue::Message(inner) => current = inner,
            _ => {
                return Err(FieldError::NotARecord {
                    field: segment.to_string(),
                    type_name: current.type_name().to_string(),
                });
            }
        }
    }

    match lookup(current, terminal)? {
        FieldValue::Scalar(scalar) => Ok(vec![scalar]),
        FieldValue::Repeated(values) => Ok(values.scalars()),
        FieldValue::Message(_) => Err(FieldError::NonScalarField {
            field: terminal.to_string(),
            type_name: current.type_name().to_string(),
        }),
    }
}

fn lookup<'a>(record: &'a dyn Record, segment: &str) -> Result<FieldValue<'a>, FieldError> {
    record
        .field(segment)
        .ok_or_else(|| FieldError::NoSuchField {
            field: segment.to_string(),
            type_name: record.type_name().to_string(),
        })
}
