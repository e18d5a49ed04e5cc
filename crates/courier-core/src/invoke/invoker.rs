//! Invoker - 1 回の呼び出しのオーケストレーション
//!
//! arity 検査 → 引数変換 → 呼び出し → 戻り値の動的値化、を 1 往復だけ
//! 行います。内部状態は ID 生成器のみで、呼び出しごとの可変状態は
//! CallFrame に閉じているため、複数 worker から同時に呼んで安全です。

use tracing::trace;

use super::handler::{CallFrame, Handler};
use crate::convert::convert;
use crate::domain::{CourierError, DynamicValue, Task, TaskType};
use crate::ports::{IdGenerator, SystemClock, UlidGenerator};

/// Invoker は動的引数列をハンドラの宣言に合わせて変換し、呼び出す
///
/// # 使用例
/// ```ignore
/// let invoker = Invoker::new();
/// let results = invoker.invoke(&add_handler, &[3.into(), 4.into()]).await?;
/// ```
pub struct Invoker {
    ids: Box<dyn IdGenerator>,
}

impl Invoker {
    pub fn new() -> Self {
        Self::with_id_generator(Box::new(UlidGenerator::new(SystemClock)))
    }

    /// テスト用: ID 生成器を差し替える
    pub fn with_id_generator(ids: Box<dyn IdGenerator>) -> Self {
        Self { ids }
    }

    /// ハンドラを 1 回呼び出す
    ///
    /// 変換は全引数が揃って初めて適用されます。最初の変換エラーが
    /// そのまま返り、以降の引数は変換されず、ハンドラも呼ばれません。
    /// ハンドラ自身のエラーは翻訳せずそのまま伝播します。
    pub async fn invoke(
        &self,
        handler: &dyn Handler,
        args: &[DynamicValue],
    ) -> Result<Vec<DynamicValue>, CourierError> {
        let params = handler.signature().params();

        if args.len() != params.len() {
            return Err(CourierError::ArgumentCountMismatch {
                expected: params.len(),
                actual: args.len(),
            });
        }

        let mut converted = Vec::with_capacity(params.len());
        for (arg, ty) in args.iter().zip(params) {
            converted.push(convert(arg, ty)?);
        }

        trace!(arity = params.len(), "arguments converted, invoking handler");
        let outputs = handler.call(CallFrame::new(converted)).await?;

        Ok(outputs.into_iter().map(DynamicValue::from).collect())
    }

    /// Task を組み立てる
    ///
    /// 一意な TaskId を採番し、名前と引数列を不変の Task に束ねます。
    /// 通常運転では失敗しません（ID 生成は infallible）。
    pub fn compose_task<I, V>(&self, task_type: impl Into<TaskType>, args: I) -> Task
    where
        I: IntoIterator<Item = V>,
        V: Into<DynamicValue>,
    {
        Task::new(
            self.ids.generate_task_id(),
            task_type.into(),
            args.into_iter().map(Into::into).collect(),
        )
    }
}

impl Default for Invoker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::domain::{ConvertError, Scalar, StrictValue, TypeDescriptor};
    use crate::invoke::signature::Signature;

    /// 呼び出し回数を数えるハンドラ（arity 検査の検証用）
    struct CountingAdd {
        signature: Signature,
        calls: Arc<AtomicU32>,
    }

    impl CountingAdd {
        fn new() -> Self {
            Self {
                signature: Signature::new()
                    .with_param(TypeDescriptor::int())
                    .with_param(TypeDescriptor::int())
                    .with_return(TypeDescriptor::int()),
                calls: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    #[async_trait]
    impl Handler for CountingAdd {
        fn signature(&self) -> &Signature {
            &self.signature
        }

        async fn call(&self, frame: CallFrame) -> Result<Vec<StrictValue>, CourierError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let sum = frame.int(0)? + frame.int(1)?;
            Ok(vec![StrictValue::Scalar(Scalar::Int(sum))])
        }
    }

    fn greet_handler() -> crate::invoke::handler::FnHandler {
        crate::invoke::handler::FnHandler::new(
            Signature::new()
                .with_param(TypeDescriptor::string())
                .with_return(TypeDescriptor::string()),
            |frame| {
                let greeting = format!("Hello, {}!", frame.str(0)?);
                Ok(vec![StrictValue::Scalar(Scalar::Str(greeting))])
            },
        )
    }

    #[tokio::test]
    async fn invoke_converts_calls_and_lowers_results() {
        let invoker = Invoker::new();
        let handler = CountingAdd::new();

        let results = invoker
            .invoke(&handler, &[DynamicValue::Int(3), DynamicValue::Int(4)])
            .await
            .unwrap();

        assert_eq!(results, vec![DynamicValue::Int(7)]);
        assert_eq!(handler.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn arity_mismatch_never_reaches_the_handler() {
        let invoker = Invoker::new();
        let handler = CountingAdd::new();

        for args in [
            vec![],
            vec![DynamicValue::Int(3)],
            vec![
                DynamicValue::Int(1),
                DynamicValue::Int(2),
                DynamicValue::Int(3),
            ],
        ] {
            let err = invoker.invoke(&handler, &args).await.unwrap_err();
            assert!(matches!(
                err,
                CourierError::ArgumentCountMismatch {
                    expected: 2,
                    actual
                } if actual == args.len()
            ));
        }

        // ハンドラは一度も呼ばれていない
        assert_eq!(handler.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn nil_for_non_optional_string_fails() {
        let invoker = Invoker::new();
        let handler = greet_handler();

        let err = invoker
            .invoke(&handler, &[DynamicValue::Nil])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CourierError::Convert(ConvertError::InvalidNilForNonOptional { .. })
        ));
    }

    #[tokio::test]
    async fn first_conversion_error_wins() {
        let invoker = Invoker::new();
        let handler = CountingAdd::new();

        // 両方の引数が不正でも、返るのは最初の引数のエラー
        let err = invoker
            .invoke(
                &handler,
                &[DynamicValue::Nil, DynamicValue::Str("x".to_string())],
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CourierError::Convert(ConvertError::InvalidNilForNonOptional { .. })
        ));
        assert_eq!(handler.calls.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn handler_errors_propagate_untouched() {
        let invoker = Invoker::new();
        let failing = crate::invoke::handler::FnHandler::new(
            Signature::new(),
            |_frame| Err(CourierError::Other("boom".to_string())),
        );

        let err = invoker.invoke(&failing, &[]).await.unwrap_err();
        assert!(matches!(err, CourierError::Other(msg) if msg == "boom"));
    }

    #[test]
    fn composed_tasks_have_distinct_ids() {
        let invoker = Invoker::new();

        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let task = invoker.compose_task("demo.noop.v1", Vec::<DynamicValue>::new());
            seen.insert(task.task_id());
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn composed_task_carries_name_and_args_verbatim() {
        let invoker = Invoker::new();
        let task = invoker.compose_task("demo.math.add.v1", [3i64, 4]);

        assert_eq!(task.task_type().as_str(), "demo.math.add.v1");
        assert_eq!(
            task.args(),
            &[DynamicValue::Int(3), DynamicValue::Int(4)]
        );
    }
}
