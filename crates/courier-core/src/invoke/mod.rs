//! Invoke - 変換と呼び出しのオーケストレーション
//!
//! # 二層構造
//! - **表層（Invoker / Runtime）**: 動的引数列を受け取り、変換して呼び出す
//! - **内部（Handler / CallFrame）**: object-safe なハンドラ抽象と、
//!   1 呼び出し分の変換済み引数

pub mod handler;
pub mod invoker;
pub mod registry;
pub mod signature;

pub use self::handler::{CallFrame, FnHandler, Handler};
pub use self::invoker::Invoker;
pub use self::registry::{HandlerRegistry, Runtime};
pub use self::signature::Signature;
