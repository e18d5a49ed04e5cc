//! TaskType - ハンドラを名前で識別するキー

use serde::{Deserialize, Serialize};
use std::fmt;

/// TaskType はハンドラを引くための名前
///
/// # 命名規約
/// - `{namespace}.{domain}.{action}.v{major}`
/// - 例: `acme.billing.charge.v1`
///
/// レジストリのキーとして使われ、Task の `task_type` と
/// 登録済みハンドラを対応付けます。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
