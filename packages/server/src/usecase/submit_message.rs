//! UseCase: メッセージ投入処理
//!
//! セッションがトランスポートから読んだメッセージに受信時刻を付け、パイプラインに投入します。
//! 時刻はここで確定し、以降変わることはありません。

use std::sync::Arc;

use hiroba_shared::time::{Clock, message_time_now};

use crate::domain::{IncomingMessage, MessagePipeline};

use super::error::SubmitError;

/// メッセージ投入のユースケース
pub struct SubmitMessageUseCase {
    /// Dispatcher へのパイプライン
    pipeline: MessagePipeline,
    /// 受信時刻の取得元
    clock: Arc<dyn Clock>,
}

impl SubmitMessageUseCase {
    /// 新しい SubmitMessageUseCase を作成
    pub fn new(pipeline: MessagePipeline, clock: Arc<dyn Clock>) -> Self {
        Self { pipeline, clock }
    }

    /// メッセージ投入を実行
    ///
    /// パイプラインが満杯の間は待機します（背圧）。
    ///
    /// # Returns
    ///
    /// * `Ok(())` - 投入成功
    /// * `Err(SubmitError)` - Dispatcher が停止している
    pub async fn execute(&self, incoming: IncomingMessage) -> Result<(), SubmitError> {
        let message = incoming.stamp(message_time_now(self.clock.as_ref()));
        tracing::debug!(
            "Submitting message from '{}' in room '{}' at {}",
            message.username,
            message.room,
            message.time
        );

        self.pipeline
            .enqueue(message)
            .await
            .map_err(|_| SubmitError::PipelineClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::message_pipeline;
    use chrono::DateTime;
    use hiroba_shared::time::FixedClock;

    fn create_test_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(
            DateTime::parse_from_rfc3339("2023-01-01T15:04:05+09:00").unwrap(),
        ))
    }

    fn incoming(text: &str) -> IncomingMessage {
        IncomingMessage {
            room: "lobby".to_string(),
            id: "m-1".to_string(),
            username: "alice".to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_submit_stamps_receipt_time() {
        // テスト項目: 投入されたメッセージにサーバー側の受信時刻が付与される
        // given (前提条件):
        let (pipeline, mut receiver) = message_pipeline(1);
        let usecase = SubmitMessageUseCase::new(pipeline, create_test_clock());

        // when (操作):
        let result = usecase.execute(incoming("hi")).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let message = receiver.dequeue().await.unwrap();
        assert_eq!(message.time, "2023-01-01 3:4:5 pm");
        assert_eq!(message.text, "hi");
        assert_eq!(message.username, "alice");
        assert_eq!(message.room, "lobby");
    }

    #[tokio::test]
    async fn test_submit_preserves_order() {
        // テスト項目: 同じセッションから投入したメッセージは順番通りに取り出される
        // given (前提条件):
        let (pipeline, mut receiver) = message_pipeline(4);
        let usecase = SubmitMessageUseCase::new(pipeline, create_test_clock());

        // when (操作):
        usecase.execute(incoming("first")).await.unwrap();
        usecase.execute(incoming("second")).await.unwrap();

        // then (期待する結果):
        assert_eq!(receiver.dequeue().await.unwrap().text, "first");
        assert_eq!(receiver.dequeue().await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn test_submit_after_dispatcher_stopped() {
        // テスト項目: Dispatcher が停止している場合はエラーが返される
        // given (前提条件):
        let (pipeline, receiver) = message_pipeline(1);
        drop(receiver);
        let usecase = SubmitMessageUseCase::new(pipeline, create_test_clock());

        // when (操作):
        let result = usecase.execute(incoming("hi")).await;

        // then (期待する結果):
        assert_eq!(result, Err(SubmitError::PipelineClosed));
    }
}
