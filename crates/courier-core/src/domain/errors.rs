//! Error types for conversion and dispatch.

use thiserror::Error;

use super::descriptor::DescriptorKind;
use super::task_type::TaskType;
use super::value::ValueKind;

/// A single failed step of value conversion.
///
/// Detected eagerly at the first offending argument/field/element and
/// propagated as-is; conversion results are never partially applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("can't pass nil for non-optional target {target}")]
    InvalidNilForNonOptional { target: DescriptorKind },

    #[error("a {found} value is not convertible to {target}")]
    UnconvertibleKind {
        found: ValueKind,
        target: DescriptorKind,
    },

    #[error("missing key '{key}' for field '{field}' of record '{record}'")]
    MissingMapKey {
        key: String,
        field: String,
        record: String,
    },

    #[error("unsupported element kind {target} for a {found} value")]
    UnsupportedElementKind {
        found: ValueKind,
        target: DescriptorKind,
    },
}

#[derive(Debug, Error)]
pub enum CourierError {
    #[error("parameter count mismatch: got {actual}, handler declares {expected}")]
    ArgumentCountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("handler not found for task_type={0}")]
    HandlerNotFound(TaskType),

    #[error("duplicate handler for task_type={0}")]
    DuplicateHandler(TaskType),

    #[error("{0}")]
    Other(String),
}
