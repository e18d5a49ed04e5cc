//! Signature - ハンドラの引数・戻り値の宣言
//!
//! 引数・戻り値の形を実行時に関数から読み取るのではなく、ハンドラ登録時に
//! 一度だけ組み立てる明示的なテーブルとして持ちます。
//! 1 つのハンドラ signature につき 1 つ、以後は読み取り専用で共有されます。

use crate::domain::TypeDescriptor;

/// ハンドラの引数・戻り値の並び
///
/// # 使用例
/// ```ignore
/// let signature = Signature::new()
///     .with_param(TypeDescriptor::int())
///     .with_param(TypeDescriptor::int())
///     .with_return(TypeDescriptor::int());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    params: Vec<TypeDescriptor>,
    returns: Vec<TypeDescriptor>,
}

impl Signature {
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            returns: Vec::new(),
        }
    }

    pub fn with_param(mut self, ty: TypeDescriptor) -> Self {
        self.params.push(ty);
        self
    }

    pub fn with_return(mut self, ty: TypeDescriptor) -> Self {
        self.returns.push(ty);
        self
    }

    pub fn params(&self) -> &[TypeDescriptor] {
        &self.params
    }

    pub fn returns(&self) -> &[TypeDescriptor] {
        &self.returns
    }

    /// 宣言された引数の個数
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::new()
    }
}
