//! Value model: dynamic (wire-side) and strict (call-side) values.
//!
//! This module is transport-agnostic: it does not assume any broker or wire
//! format. It only defines the two value shapes the engine mediates between:
//!
//! - [`DynamicValue`]: what a decoded message gives us — shape known only at
//!   runtime (nil, scalar, sequence, mapping, or an already-typed value).
//! - [`StrictValue`]: what a handler receives — shape guaranteed to match a
//!   [`TypeDescriptor`](super::descriptor::TypeDescriptor).
//!
//! The converter (see `crate::convert`) is the only way a `StrictValue` with
//! a non-trivial shape comes into existence; neither type is ever mutated in
//! place by the engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::descriptor::ScalarKind;

/// Runtime shape of a [`DynamicValue`], used in error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Nil,
    Bool,
    Int,
    UInt,
    Float,
    Str,
    Seq,
    Map,
    Opaque,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Nil => "nil",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::UInt => "uint",
            ValueKind::Float => "float",
            ValueKind::Str => "string",
            ValueKind::Seq => "sequence",
            ValueKind::Map => "mapping",
            ValueKind::Opaque => "opaque",
        };
        f.write_str(s)
    }
}

/// A scalar carried by a [`StrictValue`].
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::UInt(_) => ScalarKind::UInt,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::Str(_) => ScalarKind::Str,
        }
    }
}

/// An untyped payload as it arrives from a loosely-typed channel.
///
/// 受信したメッセージを decode した直後の形。shape はここでは検証されず、
/// converter が TypeDescriptor と突き合わせて初めて確定します。
///
/// `Opaque` は呼び出し側がすでに型付きの値をそのまま渡すケース
/// （変換済みの結果を引数として再利用する、など）のための variant で、
/// target に代入可能ならそのまま使われます。
#[derive(Debug, Clone, PartialEq)]
pub enum DynamicValue {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Seq(Vec<DynamicValue>),
    Map(BTreeMap<String, DynamicValue>),
    Opaque(StrictValue),
}

impl DynamicValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            DynamicValue::Nil => ValueKind::Nil,
            DynamicValue::Bool(_) => ValueKind::Bool,
            DynamicValue::Int(_) => ValueKind::Int,
            DynamicValue::UInt(_) => ValueKind::UInt,
            DynamicValue::Float(_) => ValueKind::Float,
            DynamicValue::Str(_) => ValueKind::Str,
            DynamicValue::Seq(_) => ValueKind::Seq,
            DynamicValue::Map(_) => ValueKind::Map,
            DynamicValue::Opaque(_) => ValueKind::Opaque,
        }
    }

    /// Scalar view of this value, if it is one.
    pub fn as_scalar(&self) -> Option<Scalar> {
        match self {
            DynamicValue::Bool(b) => Some(Scalar::Bool(*b)),
            DynamicValue::Int(i) => Some(Scalar::Int(*i)),
            DynamicValue::UInt(u) => Some(Scalar::UInt(*u)),
            DynamicValue::Float(f) => Some(Scalar::Float(*f)),
            DynamicValue::Str(s) => Some(Scalar::Str(s.clone())),
            _ => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Decoder boundary: DynamicValue ⇄ serde_json::Value
// ────────────────────────────────────────────────────────────────────────────

impl From<serde_json::Value> for DynamicValue {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => DynamicValue::Nil,
            serde_json::Value::Bool(b) => DynamicValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    DynamicValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    DynamicValue::UInt(u)
                } else {
                    DynamicValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => DynamicValue::Str(s),
            serde_json::Value::Array(items) => {
                DynamicValue::Seq(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(entries) => DynamicValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, DynamicValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<DynamicValue> for serde_json::Value {
    fn from(v: DynamicValue) -> Self {
        match v {
            DynamicValue::Nil => serde_json::Value::Null,
            DynamicValue::Bool(b) => serde_json::Value::Bool(b),
            DynamicValue::Int(i) => serde_json::Value::Number(i.into()),
            DynamicValue::UInt(u) => serde_json::Value::Number(u.into()),
            DynamicValue::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            DynamicValue::Str(s) => serde_json::Value::String(s),
            DynamicValue::Seq(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            DynamicValue::Map(entries) => serde_json::Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
            // Opaque values re-enter the wire world through their dynamic form.
            DynamicValue::Opaque(strict) => serde_json::Value::from(DynamicValue::from(strict)),
        }
    }
}

impl Serialize for DynamicValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::Value::from(self.clone()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DynamicValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Into::into)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Convenience constructors（compose_task やテストの引数組み立て用）
// ────────────────────────────────────────────────────────────────────────────

impl From<bool> for DynamicValue {
    fn from(b: bool) -> Self {
        DynamicValue::Bool(b)
    }
}

impl From<i32> for DynamicValue {
    fn from(i: i32) -> Self {
        DynamicValue::Int(i64::from(i))
    }
}

impl From<i64> for DynamicValue {
    fn from(i: i64) -> Self {
        DynamicValue::Int(i)
    }
}

impl From<u32> for DynamicValue {
    fn from(u: u32) -> Self {
        DynamicValue::UInt(u64::from(u))
    }
}

impl From<u64> for DynamicValue {
    fn from(u: u64) -> Self {
        DynamicValue::UInt(u)
    }
}

impl From<f64> for DynamicValue {
    fn from(f: f64) -> Self {
        DynamicValue::Float(f)
    }
}

impl From<&str> for DynamicValue {
    fn from(s: &str) -> Self {
        DynamicValue::Str(s.to_string())
    }
}

impl From<String> for DynamicValue {
    fn from(s: String) -> Self {
        DynamicValue::Str(s)
    }
}

impl<T: Into<DynamicValue>> From<Option<T>> for DynamicValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => DynamicValue::Nil,
        }
    }
}

impl<T: Into<DynamicValue>> From<Vec<T>> for DynamicValue {
    fn from(items: Vec<T>) -> Self {
        DynamicValue::Seq(items.into_iter().map(Into::into).collect())
    }
}

/// A converted, strictly-typed value.
///
/// Shape mirrors [`TypeDescriptor`](super::descriptor::TypeDescriptor)
/// variant by variant. `Optional(None)` is the "empty optional" produced for
/// nil inputs; every other shape is built bottom-up by the converter.
#[derive(Debug, Clone, PartialEq)]
pub enum StrictValue {
    Scalar(Scalar),
    Optional(Option<Box<StrictValue>>),
    Seq(Vec<StrictValue>),
    Map(BTreeMap<String, StrictValue>),
    Record(RecordValue),
}

impl StrictValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StrictValue::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            StrictValue::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u64> {
        match self {
            StrictValue::Scalar(Scalar::UInt(u)) => Some(*u),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            StrictValue::Scalar(Scalar::Float(f)) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StrictValue::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    /// `Some(inner)` / `None` view of an optional value.
    pub fn as_optional(&self) -> Option<Option<&StrictValue>> {
        match self {
            StrictValue::Optional(inner) => Some(inner.as_deref()),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[StrictValue]> {
        match self {
            StrictValue::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, StrictValue>> {
        match self {
            StrictValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            StrictValue::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// A converted record: the populated fields of one
/// [`RecordDescriptor`](super::descriptor::RecordDescriptor), in declaration
/// order. Fields marked `skip` in the descriptor are absent here.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordValue {
    name: String,
    fields: Vec<RecordField>,
}

/// One populated field of a [`RecordValue`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub key: String,
    pub embedded: bool,
    pub value: StrictValue,
}

impl RecordValue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn push_field(&mut self, field: RecordField) {
        self.fields.push(field);
    }

    /// Field value by field name (declaration order lookup).
    pub fn get(&self, name: &str) -> Option<&StrictValue> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| &f.value)
    }

    pub fn fields(&self) -> &[RecordField] {
        &self.fields
    }
}

/// Lowering back to the dynamic world. Total: every strict shape has a
/// dynamic rendition. Records become mappings keyed by lookup key; embedded
/// fields splice their own fields into the parent mapping, mirroring the
/// promotion applied on the way in.
impl From<StrictValue> for DynamicValue {
    fn from(v: StrictValue) -> Self {
        match v {
            StrictValue::Scalar(Scalar::Bool(b)) => DynamicValue::Bool(b),
            StrictValue::Scalar(Scalar::Int(i)) => DynamicValue::Int(i),
            StrictValue::Scalar(Scalar::UInt(u)) => DynamicValue::UInt(u),
            StrictValue::Scalar(Scalar::Float(f)) => DynamicValue::Float(f),
            StrictValue::Scalar(Scalar::Str(s)) => DynamicValue::Str(s),
            StrictValue::Optional(None) => DynamicValue::Nil,
            StrictValue::Optional(Some(inner)) => DynamicValue::from(*inner),
            StrictValue::Seq(items) => {
                DynamicValue::Seq(items.into_iter().map(Into::into).collect())
            }
            StrictValue::Map(entries) => DynamicValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, DynamicValue::from(v)))
                    .collect(),
            ),
            StrictValue::Record(record) => {
                let mut out = BTreeMap::new();
                for field in record.fields {
                    if field.embedded {
                        if let DynamicValue::Map(inner) = DynamicValue::from(field.value) {
                            out.extend(inner);
                        }
                    } else {
                        out.insert(field.key, DynamicValue::from(field.value));
                    }
                }
                DynamicValue::Map(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_preserves_shape() {
        let json = serde_json::json!({
            "name": "ada",
            "age": 36,
            "scores": [1.5, 2.5],
            "meta": { "active": true, "note": null }
        });

        let value = DynamicValue::from(json.clone());
        assert_eq!(value.kind(), ValueKind::Map);

        let back: serde_json::Value = value.into();
        assert_eq!(back, json);
    }

    #[test]
    fn numbers_decode_to_narrowest_kind() {
        assert_eq!(DynamicValue::from(serde_json::json!(-3)).kind(), ValueKind::Int);
        assert_eq!(
            DynamicValue::from(serde_json::json!(u64::MAX)).kind(),
            ValueKind::UInt
        );
        assert_eq!(DynamicValue::from(serde_json::json!(1.25)).kind(), ValueKind::Float);
    }

    #[test]
    fn option_and_vec_constructors() {
        let none: Option<i64> = None;
        assert_eq!(DynamicValue::from(none), DynamicValue::Nil);
        assert_eq!(DynamicValue::from(Some(7i64)), DynamicValue::Int(7));
        assert_eq!(
            DynamicValue::from(vec![1i64, 2]),
            DynamicValue::Seq(vec![DynamicValue::Int(1), DynamicValue::Int(2)])
        );
    }

    #[test]
    fn record_lowers_to_mapping_by_lookup_key() {
        let mut record = RecordValue::new("User");
        record.push_field(RecordField {
            name: "display_name".to_string(),
            key: "name".to_string(),
            embedded: false,
            value: StrictValue::Scalar(Scalar::Str("ada".to_string())),
        });

        let lowered = DynamicValue::from(StrictValue::Record(record));
        let DynamicValue::Map(entries) = lowered else {
            panic!("record must lower to a mapping");
        };
        assert_eq!(entries.get("name"), Some(&DynamicValue::Str("ada".to_string())));
        assert!(!entries.contains_key("display_name"));
    }

    #[test]
    fn embedded_fields_splice_into_parent_on_lowering() {
        let mut inner = RecordValue::new("Coords");
        inner.push_field(RecordField {
            name: "x".to_string(),
            key: "x".to_string(),
            embedded: false,
            value: StrictValue::Scalar(Scalar::Int(1)),
        });

        let mut outer = RecordValue::new("Point");
        outer.push_field(RecordField {
            name: "coords".to_string(),
            key: "coords".to_string(),
            embedded: true,
            value: StrictValue::Record(inner),
        });

        let DynamicValue::Map(entries) = DynamicValue::from(StrictValue::Record(outer)) else {
            panic!("record must lower to a mapping");
        };
        assert_eq!(entries.get("x"), Some(&DynamicValue::Int(1)));
        assert!(!entries.contains_key("coords"));
    }
}
