//! Value conversion: reconciling a dynamic value against a type descriptor.
//!
//! [`convert`] is a pure structural recursion over the two tagged variants
//! ([`DynamicValue`] × [`TypeDescriptor`]) and is the only place where shape
//! checking happens. It holds no state and performs no I/O, so it is safe to
//! call from any number of workers concurrently.
//!
//! Rules are applied in precedence order, cheapest first:
//!
//! 1. nil fits only an optional target (empty optional), anything else fails.
//! 2. already-typed (`Opaque`) values and trivially convertible scalars are
//!    used in place, no recursion.
//! 3. an optional target unwraps one indirection level, converts the pointee,
//!    and re-wraps; chained indirections repeat this case (terminates because
//!    the indirection depth strictly decreases).
//! 4./5. sequences and mappings convert element-wise, first failure aborts —
//!    no partial sequence or mapping is ever returned.
//! 6. records convert field by field in declaration order (embedded fields
//!    are promoted into the parent's key namespace, missing keys are fatal).
//! 7. anything left has no rule and is rejected.

use std::collections::BTreeMap;

use crate::domain::{
    ConvertError, DynamicValue, RecordDescriptor, RecordField, RecordValue, Scalar, ScalarKind,
    StrictValue, TypeDescriptor,
};

/// Convert one dynamic value into the shape `target` describes.
///
/// Errors are detected eagerly at the first offending element/field and
/// propagated as-is; on error nothing of the partially built result escapes.
pub fn convert(value: &DynamicValue, target: &TypeDescriptor) -> Result<StrictValue, ConvertError> {
    // Rule 1: nil は optional にしか入らない
    if matches!(value, DynamicValue::Nil) {
        return match target {
            TypeDescriptor::Optional(_) => Ok(StrictValue::Optional(None)),
            _ => Err(ConvertError::InvalidNilForNonOptional {
                target: target.kind(),
            }),
        };
    }

    // Rule 2: already-typed values are used as-is when assignable; otherwise
    // their dynamic rendition goes through the structural rules below.
    if let DynamicValue::Opaque(held) = value {
        if let Some(assigned) = assign(held, target) {
            return Ok(assigned);
        }
        return convert(&DynamicValue::from(held.clone()), target);
    }

    match target {
        // Rule 2 (scalar leg) / rule 7: in-place conversion is the only way
        // to produce a scalar, so a miss here means no rule exists.
        TypeDescriptor::Scalar(kind) => {
            match value.as_scalar().and_then(|s| convert_scalar(s, *kind)) {
                Some(scalar) => Ok(StrictValue::Scalar(scalar)),
                None => Err(ConvertError::UnsupportedElementKind {
                    found: value.kind(),
                    target: target.kind(),
                }),
            }
        }

        // Rule 3
        TypeDescriptor::Optional(pointee) => {
            let inner = convert(value, pointee)?;
            Ok(StrictValue::Optional(Some(Box::new(inner))))
        }

        // Rule 4
        TypeDescriptor::Seq(element) => {
            let DynamicValue::Seq(items) = value else {
                return Err(ConvertError::UnconvertibleKind {
                    found: value.kind(),
                    target: target.kind(),
                });
            };
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(convert(item, element)?);
            }
            Ok(StrictValue::Seq(out))
        }

        // Rule 5
        TypeDescriptor::Map(value_ty) => {
            let DynamicValue::Map(entries) = value else {
                return Err(ConvertError::UnconvertibleKind {
                    found: value.kind(),
                    target: target.kind(),
                });
            };
            let mut out = BTreeMap::new();
            for (key, entry) in entries {
                out.insert(key.clone(), convert(entry, value_ty)?);
            }
            Ok(StrictValue::Map(out))
        }

        // Rule 6
        TypeDescriptor::Record(descriptor) => {
            let DynamicValue::Map(entries) = value else {
                return Err(ConvertError::UnconvertibleKind {
                    found: value.kind(),
                    target: target.kind(),
                });
            };
            convert_record(value, entries, descriptor).map(StrictValue::Record)
        }
    }
}

/// Field-by-field record conversion.
///
/// `whole` is the record's entire source mapping; embedded fields recurse on
/// it directly (field-name promotion), non-embedded fields look up their key
/// in `entries`.
fn convert_record(
    whole: &DynamicValue,
    entries: &BTreeMap<String, DynamicValue>,
    descriptor: &RecordDescriptor,
) -> Result<RecordValue, ConvertError> {
    let mut out = RecordValue::new(descriptor.name());

    for field in descriptor.fields() {
        if field.is_skipped() {
            continue;
        }

        let value = if field.is_embedded() {
            convert(whole, field.ty())?
        } else {
            let key = field.lookup_key();
            let Some(found) = entries.get(key) else {
                return Err(ConvertError::MissingMapKey {
                    key: key.to_string(),
                    field: field.name().to_string(),
                    record: descriptor.name().to_string(),
                });
            };
            convert(found, field.ty())?
        };

        out.push_field(RecordField {
            name: field.name().to_string(),
            key: field.lookup_key().to_string(),
            embedded: field.is_embedded(),
            value,
        });
    }

    Ok(out)
}

/// In-place scalar conversion: same kind, checked `Int⇄UInt`, and widening
/// into `Float`. Nothing narrows and nothing wraps.
fn convert_scalar(source: Scalar, kind: ScalarKind) -> Option<Scalar> {
    match (source, kind) {
        (Scalar::Bool(b), ScalarKind::Bool) => Some(Scalar::Bool(b)),
        (Scalar::Str(s), ScalarKind::Str) => Some(Scalar::Str(s)),
        (Scalar::Int(i), ScalarKind::Int) => Some(Scalar::Int(i)),
        (Scalar::Int(i), ScalarKind::UInt) => u64::try_from(i).ok().map(Scalar::UInt),
        (Scalar::Int(i), ScalarKind::Float) => Some(Scalar::Float(i as f64)),
        (Scalar::UInt(u), ScalarKind::UInt) => Some(Scalar::UInt(u)),
        (Scalar::UInt(u), ScalarKind::Int) => i64::try_from(u).ok().map(Scalar::Int),
        (Scalar::UInt(u), ScalarKind::Float) => Some(Scalar::Float(u as f64)),
        (Scalar::Float(f), ScalarKind::Float) => Some(Scalar::Float(f)),
        _ => None,
    }
}

/// Structural assignability of an already-typed value to a target shape.
/// Records assign nominally (by record name); containers assign element-wise.
fn assign(held: &StrictValue, target: &TypeDescriptor) -> Option<StrictValue> {
    match (held, target) {
        (StrictValue::Scalar(s), TypeDescriptor::Scalar(kind)) => {
            convert_scalar(s.clone(), *kind).map(StrictValue::Scalar)
        }
        (StrictValue::Optional(None), TypeDescriptor::Optional(_)) => {
            Some(StrictValue::Optional(None))
        }
        (StrictValue::Optional(Some(inner)), TypeDescriptor::Optional(pointee)) => {
            assign(inner, pointee).map(|v| StrictValue::Optional(Some(Box::new(v))))
        }
        (StrictValue::Seq(items), TypeDescriptor::Seq(element)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(assign(item, element)?);
            }
            Some(StrictValue::Seq(out))
        }
        (StrictValue::Map(entries), TypeDescriptor::Map(value_ty)) => {
            let mut out = BTreeMap::new();
            for (key, entry) in entries {
                out.insert(key.clone(), assign(entry, value_ty)?);
            }
            Some(StrictValue::Map(out))
        }
        (StrictValue::Record(record), TypeDescriptor::Record(descriptor))
            if record.name() == descriptor.name() =>
        {
            Some(held.clone())
        }
        _ => None,
    }
}
