//! UseCase: セッション切断処理

use std::sync::Arc;

use crate::domain::{SessionId, SessionRegistry};

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    /// 接続中のセッションの集合
    registry: Arc<SessionRegistry>,
}

impl DisconnectSessionUseCase {
    /// 新しい DisconnectSessionUseCase を作成
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        Self { registry }
    }

    /// セッション切断を実行
    ///
    /// Dispatcher が先に削除している場合もあるため、未登録のセッションに対しては何もしません。
    ///
    /// # Returns
    ///
    /// このセッションがまだ登録されていた場合は `true`
    pub async fn execute(&self, session_id: &SessionId) -> bool {
        self.registry.remove(session_id).await
    }

    /// 接続中のセッション数
    pub async fn count_sessions(&self) -> usize {
        self.registry.len().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session_channel;

    #[tokio::test]
    async fn test_disconnect_registered_session() {
        // テスト項目: 登録済みのセッションを切断するとレジストリから削除される
        // given (前提条件):
        let registry = Arc::new(SessionRegistry::new());
        let session_id = SessionId::generate();
        let (outbox, _inbox) = session_channel(4);
        registry.add(session_id, outbox).await.unwrap();
        let usecase = DisconnectSessionUseCase::new(registry.clone());

        // when (操作):
        let removed = usecase.execute(&session_id).await;

        // then (期待する結果):
        assert!(removed);
        assert_eq!(usecase.count_sessions().await, 0);
    }

    #[tokio::test]
    async fn test_disconnect_twice_is_noop() {
        // テスト項目: 既に削除されたセッションの切断は何もしない（冪等性）
        // given (前提条件):
        let registry = Arc::new(SessionRegistry::new());
        let keep = SessionId::generate();
        let session_id = SessionId::generate();
        let (outbox1, _inbox1) = session_channel(4);
        let (outbox2, _inbox2) = session_channel(4);
        registry.add(keep, outbox1).await.unwrap();
        registry.add(session_id, outbox2).await.unwrap();
        let usecase = DisconnectSessionUseCase::new(registry.clone());
        usecase.execute(&session_id).await;

        // when (操作):
        let removed = usecase.execute(&session_id).await;

        // then (期待する結果): 他のセッションには影響しない
        assert!(!removed);
        assert!(registry.contains(&keep).await);
        assert_eq!(usecase.count_sessions().await, 1);
    }
}
