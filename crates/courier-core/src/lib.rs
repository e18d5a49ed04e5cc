//! courier-core
//!
//! Core building blocks for the Courier dispatch engine: given a handler and
//! a sequence of loosely-typed argument values, convert them to the handler's
//! declared parameter shapes, invoke it, and hand the results back as
//! loosely-typed values.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, task_type, task, value, descriptor, errors）
//! - **convert**: DynamicValue を TypeDescriptor に突き合わせる変換器
//! - **invoke**: Invoker / Handler / CallFrame / HandlerRegistry / Runtime
//! - **ports**: 抽象化レイヤー（Clock, IdGenerator, Connection）
//! - **impls**: 実装（InMemoryConnection など開発用）

pub mod convert;
pub mod domain;
pub mod impls;
pub mod invoke;
pub mod ports;
