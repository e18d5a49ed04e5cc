//! Domain model (ids, task type, values, descriptors, errors).

pub mod descriptor;
pub mod errors;
pub mod ids;
pub mod task;
pub mod task_type;
pub mod value;

pub use descriptor::{
    DescriptorKind, FieldDescriptor, RecordDescriptor, ScalarKind, TypeDescriptor,
};
pub use errors::{ConvertError, CourierError};
pub use ids::TaskId;
pub use task::Task;
pub use task_type::TaskType;
pub use value::{DynamicValue, RecordField, RecordValue, Scalar, StrictValue, ValueKind};
