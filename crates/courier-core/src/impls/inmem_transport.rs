//! InMemoryConnection - 開発用の transport 接続
//!
//! # 実装詳細
//! - idle チャネルを `Vec<Channel>` で保持し、tokio の Mutex で排他制御
//! - `channel()` はプールから取り出すか、空なら新しい id を採番して作る
//! - `release_channel()` は上限までプールに戻し、超過分は破棄
//! - `close()` は冪等。以後の `channel()` は ConnectionClosed を返す
//!
//! # 本番用実装
//! 本番の broker クライアント（AMQP など）は別クレートに配置します。
//! この実装は「acquire/release を繰り返してもリークしない」という
//! 契約の検証と、上位レイヤーの開発用です。

use tokio::sync::Mutex;
use tracing::debug;

use crate::ports::{Channel, Connection, TransportConfig, TransportError};

struct PoolState {
    closed: bool,
    idle: Vec<Channel>,
    next_channel_id: u64,
}

/// InMemoryConnection はチャネルプール契約の in-memory 実装
///
/// # 使用例
/// ```ignore
/// let conn = InMemoryConnection::new(TransportConfig::default());
/// let ch = conn.channel().await?;
/// conn.release_channel(ch).await;
/// conn.close().await?;
/// ```
pub struct InMemoryConnection {
    config: TransportConfig,
    state: Mutex<PoolState>,
}

impl InMemoryConnection {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PoolState {
                closed: false,
                idle: Vec::new(),
                next_channel_id: 1,
            }),
        }
    }

    /// プール中の idle チャネル数（テスト・観測用）
    pub async fn idle_count(&self) -> usize {
        self.state.lock().await.idle.len()
    }
}

impl Default for InMemoryConnection {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

#[async_trait::async_trait]
impl Connection for InMemoryConnection {
    async fn channel(&self) -> Result<Channel, TransportError> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(TransportError::ConnectionClosed);
        }

        if let Some(channel) = state.idle.pop() {
            return Ok(channel);
        }

        let id = state.next_channel_id;
        state.next_channel_id += 1;
        Ok(Channel::new(id))
    }

    async fn release_channel(&self, channel: Channel) {
        let mut state = self.state.lock().await;
        // closed 後やプール満杯時は黙って破棄する
        if !state.closed && state.idle.len() < self.config.max_idle_channels {
            state.idle.push(channel);
        }
    }

    async fn close(&self) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        if !state.closed {
            state.closed = true;
            let drained = state.idle.len();
            state.idle.clear();
            debug!(drained, "transport connection closed");
        }
        Ok(())
    }
}
