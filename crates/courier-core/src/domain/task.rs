use serde::{Deserialize, Serialize};

use super::ids::TaskId;
use super::task_type::TaskType;
use super::value::DynamicValue;

/// TaskId + TaskType + 引数列の"運搬用"データ。
///
/// compose されたあとは不変で、引数列が書き換わることはありません。
/// transport に渡した側が所有権を手放します。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    task_id: TaskId,
    task_type: TaskType,
    args: Vec<DynamicValue>,
}

impl Task {
    pub fn new(task_id: TaskId, task_type: TaskType, args: Vec<DynamicValue>) -> Self {
        Self {
            task_id,
            task_type,
            args,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn task_type(&self) -> &TaskType {
        &self.task_type
    }

    pub fn args(&self) -> &[DynamicValue] {
        &self.args
    }
}
