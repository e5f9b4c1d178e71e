//! UseCase: セッション接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - レジストリへの登録とバックログの読み出し
//!
//! ### なぜこのテストが必要か
//! - 新しいセッションが履歴を重複・欠落なく受け取れることの前提になる
//! - 登録 → バックログ読み出しの順序により、登録後に届いたライブメッセージが
//!   バックログの終端位置で判別できることを保証する
//! - バックログの読み出しに失敗しても接続自体は継続することを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のログ・既存のログへの接続
//! - 異常系：ストア障害によるバックログ読み出しの失敗、重複した id
//! - エッジケース：登録とバックログ読み出しの間に配信されたメッセージ

use std::sync::Arc;

use crate::domain::{
    Backlog, LogPosition, MessageLog, RegistryError, SessionId, SessionInbox, SessionRegistry,
    session_channel,
};

use super::error::ConnectError;

/// A freshly admitted session
#[derive(Debug)]
pub struct ConnectedSession {
    /// Live frames buffered since registration
    pub inbox: SessionInbox,
    /// History to write before anything else
    pub backlog: Backlog,
}

impl ConnectedSession {
    /// Live frames at or below this position are already in the backlog
    pub fn cutoff(&self) -> LogPosition {
        self.backlog.end()
    }
}

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    /// 接続中のセッションの集合
    registry: Arc<SessionRegistry>,
    /// MessageLog（永続化層の抽象化）
    message_log: Arc<dyn MessageLog>,
    /// セッションごとの送信バッファの容量
    outbox_capacity: usize,
}

impl ConnectSessionUseCase {
    /// 新しい ConnectSessionUseCase を作成
    pub fn new(
        registry: Arc<SessionRegistry>,
        message_log: Arc<dyn MessageLog>,
        outbox_capacity: usize,
    ) -> Self {
        Self {
            registry,
            message_log,
            outbox_capacity,
        }
    }

    /// セッション接続を実行
    ///
    /// 1. ライブ配信用のバッファを作ってレジストリに登録する
    /// 2. その後でログ全体を読み出す
    ///
    /// この順序により、登録前に配信されたメッセージは必ずバックログに含まれ、
    /// 登録後に配信されたメッセージは必ずバッファに届きます。
    /// 両方に含まれるものは `ConnectedSession::cutoff` 以下の位置を持ちます。
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectedSession)` - 接続成功
    /// * `Err(ConnectError)` - 接続失敗
    pub async fn execute(&self, session_id: SessionId) -> Result<ConnectedSession, ConnectError> {
        // 1. レジストリに登録（ライブ配信はバッファに溜まる）
        let (outbox, inbox) = session_channel(self.outbox_capacity);
        self.registry
            .add(session_id, outbox)
            .await
            .map_err(|e| match e {
                RegistryError::AlreadyRegistered => ConnectError::DuplicateSession(session_id),
                RegistryError::Closed => ConnectError::ShuttingDown,
            })?;

        // 2. バックログを読み出す（失敗しても履歴なしで続行）
        let backlog = match self.message_log.read_all().await {
            Ok(backlog) => backlog,
            Err(e) => {
                tracing::warn!(
                    "Failed to read backlog for session '{}', continuing without history: {}",
                    session_id,
                    e
                );
                Backlog::empty()
            }
        };

        Ok(ConnectedSession { inbox, backlog })
    }
}
