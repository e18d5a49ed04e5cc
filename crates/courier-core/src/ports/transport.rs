//! Transport port - broker 接続の境界
//!
//! このコアは transport の中身（broker topology, 再配送, 認証など）に
//! 関知しません。Task を渡す相手として、チャネルプールを持つ接続の
//! 最小限の契約だけを定義します。
//!
//! # 契約
//! - `channel()` / `release_channel()` を何度繰り返してもリソースを
//!   リークしないこと
//! - `close()` は冪等で、acquire/release を繰り返した後でも成功すること

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection is closed")]
    ConnectionClosed,
}

/// 接続から借りる作業単位ごとのチャネル
///
/// Clone しない: 1 つのチャネルは同時に 1 つの作業単位が所有し、
/// 使い終わったら `release_channel` でプールに返します。
#[derive(Debug, PartialEq, Eq)]
pub struct Channel {
    id: u64,
}

impl Channel {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Connection はチャネルプールを持つ transport 接続
///
/// # 使用例
/// ```ignore
/// let ch = conn.channel().await?;
/// // ... ch で作業 ...
/// conn.release_channel(ch).await;
/// ```
#[async_trait]
pub trait Connection: Send + Sync {
    /// チャネルを 1 つ借りる（プールにあれば再利用、なければ新規）
    async fn channel(&self) -> Result<Channel, TransportError>;

    /// チャネルをプールに返す（破棄ではなく再利用のため）
    async fn release_channel(&self, channel: Channel);

    /// 接続を閉じる（冪等）
    async fn close(&self) -> Result<(), TransportError>;
}

/// Transport 接続の設定
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// プールに保持する idle チャネルの上限。超過分は返却時に破棄される。
    pub max_idle_channels: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_idle_channels: 16,
        }
    }
}
