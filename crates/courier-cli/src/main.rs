use std::sync::Arc;

use async_trait::async_trait;

use courier_core::domain::{
    CourierError, DynamicValue, FieldDescriptor, RecordDescriptor, Scalar, StrictValue,
    TypeDescriptor,
};
use courier_core::impls::InMemoryConnection;
use courier_core::invoke::{CallFrame, FnHandler, Handler, HandlerRegistry, Runtime, Signature};
use courier_core::ports::{Connection, TransportConfig};

/// greet(user: User) -> string
///
/// record 引数を受け取るハンドラの例。User の "email" キーは
/// mail_address フィールドに looked up される。
struct GreetHandler {
    signature: Signature,
}

impl GreetHandler {
    fn new() -> Self {
        let user = RecordDescriptor::new("User")
            .with_field(FieldDescriptor::new("name", TypeDescriptor::string()))
            .with_field(
                FieldDescriptor::new("mail_address", TypeDescriptor::string()).with_key("email"),
            );
        Self {
            signature: Signature::new()
                .with_param(TypeDescriptor::record(user))
                .with_return(TypeDescriptor::string()),
        }
    }
}

#[async_trait]
impl Handler for GreetHandler {
    fn signature(&self) -> &Signature {
        &self.signature
    }

    async fn call(&self, frame: CallFrame) -> Result<Vec<StrictValue>, CourierError> {
        let user = frame
            .arg(0)?
            .as_record()
            .ok_or_else(|| CourierError::Other("argument 0 is not a record".to_string()))?;
        let name = user
            .get("name")
            .and_then(StrictValue::as_str)
            .unwrap_or("stranger");

        Ok(vec![StrictValue::Scalar(Scalar::Str(format!(
            "Hello, {name}!"
        )))])
    }
}

fn add_handler() -> Arc<dyn Handler> {
    Arc::new(FnHandler::new(
        Signature::new()
            .with_param(TypeDescriptor::int())
            .with_param(TypeDescriptor::int())
            .with_return(TypeDescriptor::int()),
        |frame| {
            let sum = frame.int(0)? + frame.int(1)?;
            Ok(vec![StrictValue::Scalar(Scalar::Int(sum))])
        },
    ))
}

#[tokio::main]
async fn main() {
    // (A) レジストリと Runtime を用意
    let mut registry = HandlerRegistry::new();
    registry
        .register("demo.math.add.v1".into(), add_handler())
        .expect("fresh registry");
    registry
        .register("demo.user.greet.v1".into(), Arc::new(GreetHandler::new()))
        .expect("fresh registry");

    let rt = Runtime::new(Arc::new(registry));

    // (B) Task を compose して実行（int 引数）
    let add = rt.invoker().compose_task("demo.math.add.v1", [3i64, 4]);
    println!("composed: id={} type={}", add.task_id(), add.task_type());
    match rt.execute(&add).await {
        Ok(results) => println!("  add(3, 4) = {results:?}"),
        Err(e) => println!("  add failed: {e}"),
    }

    // (C) decode 境界をまねて、JSON から来た mapping を record 引数に変換
    let payload: DynamicValue =
        serde_json::json!({ "name": "ada", "email": "ada@example.com" }).into();
    let greet = rt
        .invoker()
        .compose_task("demo.user.greet.v1", [payload]);
    match rt.execute(&greet).await {
        Ok(results) => println!("  greet = {results:?}"),
        Err(e) => println!("  greet failed: {e}"),
    }

    // (D) わざと失敗させる: string が必要なところに nil
    let broken: DynamicValue = serde_json::json!({ "name": null, "email": "x@y" }).into();
    let bad = rt.invoker().compose_task("demo.user.greet.v1", [broken]);
    match rt.execute(&bad).await {
        Ok(results) => println!("  unexpected success: {results:?}"),
        Err(e) => println!("  greet(nil name) failed as expected: {e}"),
    }

    // (E) transport 接続のチャネルプールを回して閉じる
    let conn = InMemoryConnection::new(TransportConfig::default());
    for _ in 0..100 {
        let ch = conn.channel().await.expect("connection is open");
        conn.release_channel(ch).await;
    }
    conn.close().await.expect("close is infallible here");
    println!("transport pool cycled 100 times and closed cleanly");
}
