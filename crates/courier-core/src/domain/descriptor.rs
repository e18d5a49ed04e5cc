//! TypeDescriptor - 変換先の形を表す静的な記述
//!
//! # 二層構造
//! - **表層（Signature）**: ハンドラの引数・戻り値の並び
//! - **内部（TypeDescriptor）**: 個々の値の形（scalar / optional / seq / map / record）
//!
//! 実行時 introspection の代わりに、ハンドラ登録時に一度だけ組み立てる
//! 明示的なテーブルとして持ちます。変換のホットパスでは読み取り専用で
//! 共有され、ロックは不要です。

use std::fmt;

/// 変換先 scalar の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Int,
    UInt,
    Float,
    Str,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::UInt => "uint",
            ScalarKind::Float => "float",
            ScalarKind::Str => "string",
        };
        f.write_str(s)
    }
}

/// TypeDescriptor の大分類（エラーメッセージ用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptorKind {
    Scalar(ScalarKind),
    Optional,
    Seq,
    Map,
    Record,
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorKind::Scalar(kind) => kind.fmt(f),
            DescriptorKind::Optional => f.write_str("optional"),
            DescriptorKind::Seq => f.write_str("sequence"),
            DescriptorKind::Map => f.write_str("mapping"),
            DescriptorKind::Record => f.write_str("record"),
        }
    }
}

/// 変換先の形の記述
///
/// # 使用例
/// ```ignore
/// // Vec<Option<i64>> に相当する形
/// let ty = TypeDescriptor::seq(TypeDescriptor::optional(TypeDescriptor::int()));
/// ```
///
/// Optional の入れ子（pointer-to-pointer 相当）は `optional(optional(..))`
/// で表現し、converter が一段ずつ剥がして変換します。
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Scalar(ScalarKind),
    Optional(Box<TypeDescriptor>),
    Seq(Box<TypeDescriptor>),
    Map(Box<TypeDescriptor>),
    Record(RecordDescriptor),
}

impl TypeDescriptor {
    pub fn bool() -> Self {
        TypeDescriptor::Scalar(ScalarKind::Bool)
    }

    pub fn int() -> Self {
        TypeDescriptor::Scalar(ScalarKind::Int)
    }

    pub fn uint() -> Self {
        TypeDescriptor::Scalar(ScalarKind::UInt)
    }

    pub fn float() -> Self {
        TypeDescriptor::Scalar(ScalarKind::Float)
    }

    pub fn string() -> Self {
        TypeDescriptor::Scalar(ScalarKind::Str)
    }

    pub fn optional(pointee: TypeDescriptor) -> Self {
        TypeDescriptor::Optional(Box::new(pointee))
    }

    pub fn seq(element: TypeDescriptor) -> Self {
        TypeDescriptor::Seq(Box::new(element))
    }

    /// 文字列キーの mapping（値の形のみ指定）
    pub fn map(value: TypeDescriptor) -> Self {
        TypeDescriptor::Map(Box::new(value))
    }

    pub fn record(record: RecordDescriptor) -> Self {
        TypeDescriptor::Record(record)
    }

    pub fn kind(&self) -> DescriptorKind {
        match self {
            TypeDescriptor::Scalar(kind) => DescriptorKind::Scalar(*kind),
            TypeDescriptor::Optional(_) => DescriptorKind::Optional,
            TypeDescriptor::Seq(_) => DescriptorKind::Seq,
            TypeDescriptor::Map(_) => DescriptorKind::Map,
            TypeDescriptor::Record(_) => DescriptorKind::Record,
        }
    }
}

/// Record（名前付きフィールドの複合型）の記述
///
/// # 使用例
/// ```ignore
/// let user = RecordDescriptor::new("User")
///     .with_field(FieldDescriptor::new("name", TypeDescriptor::string()))
///     .with_field(
///         FieldDescriptor::new("mail_address", TypeDescriptor::string()).with_key("email"),
///     );
/// ```
///
/// フィールドは宣言順に変換されます。
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDescriptor {
    name: String,
    fields: Vec<FieldDescriptor>,
}

impl RecordDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }
}

/// Record の 1 フィールドの記述
///
/// - `key`: mapping から値を引くキー。未指定ならフィールド名。
/// - `embedded`: 自身のフィールドを親のキー空間に昇格させる
///   （入れ子のキーを掘らず、外側の mapping から直接引く）。
/// - `skip`: 外部から設定できないフィールド。変換時に黙って飛ばされる。
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    name: String,
    key: Option<String>,
    embedded: bool,
    skip: bool,
    ty: TypeDescriptor,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            key: None,
            embedded: false,
            skip: false,
            ty,
        }
    }

    /// mapping 上のキーをフィールド名と別に指定する
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 実際に mapping を引くキー（未指定ならフィールド名）
    pub fn lookup_key(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.name)
    }

    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_key_defaults_to_field_name() {
        let field = FieldDescriptor::new("name", TypeDescriptor::string());
        assert_eq!(field.lookup_key(), "name");

        let field = FieldDescriptor::new("mail_address", TypeDescriptor::string()).with_key("email");
        assert_eq!(field.lookup_key(), "email");
    }

    #[test]
    fn descriptor_kind_display_names() {
        assert_eq!(TypeDescriptor::int().kind().to_string(), "int");
        assert_eq!(
            TypeDescriptor::optional(TypeDescriptor::int()).kind().to_string(),
            "optional"
        );
        assert_eq!(
            TypeDescriptor::seq(TypeDescriptor::string()).kind().to_string(),
            "sequence"
        );
        assert_eq!(
            TypeDescriptor::record(RecordDescriptor::new("User")).kind().to_string(),
            "record"
        );
    }
}
