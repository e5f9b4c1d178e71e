//! Repository trait 定義
//!
//! ドメイン層が必要とするメッセージログのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{Backlog, ChatMessage, LogError, LogPosition};

/// Durable, append-only, totally ordered message log
///
/// Implementations must not cache: every `read_all` reflects the store's
/// current state. There is no delete or compaction.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// Append a message to the tail; returns its position
    async fn append(&self, message: &ChatMessage) -> Result<LogPosition, LogError>;

    /// Read the whole log, oldest first
    async fn read_all(&self) -> Result<Backlog, LogError>;
}
