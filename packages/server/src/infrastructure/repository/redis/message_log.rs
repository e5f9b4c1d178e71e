//! Redis MessageLog 実装
//!
//! ログ全体を 1 つの Redis リストとして保存します。
//!
//! - 追記: `RPUSH key record`（戻り値のリスト長がそのまま追記位置になる）
//! - 全件読み出し: `LRANGE key 0 -1`
//!
//! Redis がコマンドを直列化するため、追記は呼び出し側から見てアトミックです。
//! 接続には `ConnectionManager` を使い、切断時は自動で再接続します。

use async_trait::async_trait;
use redis::{AsyncCommands, RedisError, aio::ConnectionManager};

use crate::domain::{Backlog, ChatMessage, LogError, LogPosition, MessageLog};

use super::super::record::{decode_records, encode_record};

/// Default list key, shared with existing deployments
pub const DEFAULT_LOG_KEY: &str = "chat_messages";

impl From<RedisError> for LogError {
    fn from(e: RedisError) -> Self {
        LogError::Unavailable(e.to_string())
    }
}

/// Redis MessageLog 実装
#[derive(Clone)]
pub struct RedisMessageLog {
    connection: ConnectionManager,
    /// ログを保存するリストのキー
    key: String,
}

impl RedisMessageLog {
    /// Redis に接続して RedisMessageLog を作成
    ///
    /// # Arguments
    ///
    /// * `url` - 接続先（例: `redis://127.0.0.1:6379/`）
    /// * `key` - ログを保存するリストのキー
    ///
    /// # Errors
    ///
    /// URL が不正な場合、または初回の接続に失敗した場合は `LogError::Unavailable`
    pub async fn connect(url: &str, key: impl Into<String>) -> Result<Self, LogError> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            connection,
            key: key.into(),
        })
    }

    /// 接続確認（`PING`）
    pub async fn ping(&self) -> Result<String, LogError> {
        let mut connection = self.connection.clone();
        let pong: String = redis::cmd("PING").query_async(&mut connection).await?;
        Ok(pong)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl MessageLog for RedisMessageLog {
    async fn append(&self, message: &ChatMessage) -> Result<LogPosition, LogError> {
        let record = encode_record(message)?;

        let mut connection = self.connection.clone();
        let length: u64 = connection.rpush(&self.key, record).await?;
        Ok(LogPosition::new(length))
    }

    async fn read_all(&self) -> Result<Backlog, LogError> {
        let mut connection = self.connection.clone();
        let records: Vec<String> = connection.lrange(&self.key, 0, -1).await?;
        Ok(decode_records(records))
    }
}
