//! Handler trait - 変換済み引数を受け取るハンドラの定義
//!
//! # 二層構造
//! - **表層（FnHandler）**: クロージャ + Signature の組で登録する
//! - **内部（Handler）**: object-safe な trait。`Arc<dyn Handler>` として
//!   レジストリに格納できる

use async_trait::async_trait;

use super::signature::Signature;
use crate::domain::{CourierError, StrictValue};

/// 1 回の呼び出しのために組み立てられた変換済み引数の束
///
/// Invoke の間だけ存在し、呼び出し後は破棄されます。呼び出しをまたいで
/// 共有されることはなく、所有権もこの呼び出し限りです。
#[derive(Debug)]
pub struct CallFrame {
    args: Vec<StrictValue>,
}

impl CallFrame {
    pub(crate) fn new(args: Vec<StrictValue>) -> Self {
        Self { args }
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// index 番目の引数（範囲外はエラー）
    pub fn arg(&self, index: usize) -> Result<&StrictValue, CourierError> {
        self.args
            .get(index)
            .ok_or_else(|| CourierError::Other(format!("no argument at index {index}")))
    }

    pub fn int(&self, index: usize) -> Result<i64, CourierError> {
        self.arg(index)?
            .as_int()
            .ok_or_else(|| CourierError::Other(format!("argument {index} is not an int")))
    }

    pub fn uint(&self, index: usize) -> Result<u64, CourierError> {
        self.arg(index)?
            .as_uint()
            .ok_or_else(|| CourierError::Other(format!("argument {index} is not a uint")))
    }

    pub fn float(&self, index: usize) -> Result<f64, CourierError> {
        self.arg(index)?
            .as_float()
            .ok_or_else(|| CourierError::Other(format!("argument {index} is not a float")))
    }

    pub fn boolean(&self, index: usize) -> Result<bool, CourierError> {
        self.arg(index)?
            .as_bool()
            .ok_or_else(|| CourierError::Other(format!("argument {index} is not a bool")))
    }

    pub fn str(&self, index: usize) -> Result<&str, CourierError> {
        self.arg(index)?
            .as_str()
            .ok_or_else(|| CourierError::Other(format!("argument {index} is not a string")))
    }

    pub fn into_args(self) -> Vec<StrictValue> {
        self.args
    }
}

/// Handler は変換済みの CallFrame を受け取り、戻り値の列を返す
///
/// # 使用例
/// ```ignore
/// struct AddHandler {
///     signature: Signature,
/// }
///
/// #[async_trait]
/// impl Handler for AddHandler {
///     fn signature(&self) -> &Signature {
///         &self.signature
///     }
///
///     async fn call(&self, frame: CallFrame) -> Result<Vec<StrictValue>, CourierError> {
///         let sum = frame.int(0)? + frame.int(1)?;
///         Ok(vec![StrictValue::Scalar(Scalar::Int(sum))])
///     }
/// }
/// ```
///
/// ハンドラ内部の panic はこの層では捕捉しません。障害の隔離は
/// 呼び出し側（worker 層）の責務です。
#[async_trait]
pub trait Handler: Send + Sync {
    /// 宣言された引数・戻り値の形
    fn signature(&self) -> &Signature;

    async fn call(&self, frame: CallFrame) -> Result<Vec<StrictValue>, CourierError>;
}

/// FnHandler はクロージャを Handler に適合させる
///
/// # 使用例
/// ```ignore
/// let add = FnHandler::new(
///     Signature::new()
///         .with_param(TypeDescriptor::int())
///         .with_param(TypeDescriptor::int())
///         .with_return(TypeDescriptor::int()),
///     |frame| {
///         let sum = frame.int(0)? + frame.int(1)?;
///         Ok(vec![StrictValue::Scalar(Scalar::Int(sum))])
///     },
/// );
/// ```
pub struct FnHandler {
    signature: Signature,
    func: Box<dyn Fn(CallFrame) -> Result<Vec<StrictValue>, CourierError> + Send + Sync>,
}

impl FnHandler {
    pub fn new<F>(signature: Signature, func: F) -> Self
    where
        F: Fn(CallFrame) -> Result<Vec<StrictValue>, CourierError> + Send + Sync + 'static,
    {
        Self {
            signature,
            func: Box::new(func),
        }
    }
}

#[async_trait]
impl Handler for FnHandler {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    async fn call(&self, frame: CallFrame) -> Result<Vec<StrictValue>, CourierError> {
        (self.func)(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Scalar, TypeDescriptor};

    #[tokio::test]
    async fn fn_handler_calls_the_closure() {
        let handler = FnHandler::new(
            Signature::new()
                .with_param(TypeDescriptor::int())
                .with_param(TypeDescriptor::int())
                .with_return(TypeDescriptor::int()),
            |frame| {
                let sum = frame.int(0)? + frame.int(1)?;
                Ok(vec![StrictValue::Scalar(Scalar::Int(sum))])
            },
        );

        let frame = CallFrame::new(vec![
            StrictValue::Scalar(Scalar::Int(3)),
            StrictValue::Scalar(Scalar::Int(4)),
        ]);
        let outputs = handler.call(frame).await.unwrap();
        assert_eq!(outputs, vec![StrictValue::Scalar(Scalar::Int(7))]);
    }

    #[tokio::test]
    async fn call_frame_getters_check_kind_and_index() {
        let frame = CallFrame::new(vec![StrictValue::Scalar(Scalar::Str("hi".to_string()))]);

        assert_eq!(frame.str(0).unwrap(), "hi");
        assert!(frame.int(0).is_err());
        assert!(frame.arg(1).is_err());
    }
}
