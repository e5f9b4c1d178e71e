//! UseCase: メッセージ配信処理（Dispatcher）
//!
//! パイプラインの唯一の consumer です。メッセージを 1 件ずつ取り出し、
//!
//! 1. MessageLog に永続化し（失敗時は上限付きでリトライ）
//! 2. レジストリの全セッションの送信バッファに入れる
//!
//! という処理を取り出した順に行います。Dispatcher のタスクは 1 つしか存在しないため、
//! 全てのセッションが同じ順序でメッセージを観測します。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - Dispatcher::dispatch() と Dispatcher::run()
//!
//! ### なぜこのテストが必要か
//! - 永続化 → ファンアウトの順序と、全セッションでの配信順序の一致を保証する
//! - ストア障害時にもライブ配信が継続することを保証する
//! - 切断済み・遅いセッションが他のセッションへの配信を妨げないことを保証する
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数セッションへの配信
//! - 異常系：永続化の失敗（リトライ後に成功 / 全て失敗）
//! - エッジケース：切断済みのセッション、送信バッファが満杯のセッション

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::{
    config::RetryPolicy,
    domain::{
        ChatMessage, LogPosition, MessageLog, OfferError, OutboundFrame, PipelineReceiver,
        SessionRegistry, Visit,
    },
};

/// Outcome of dispatching one message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Log position, `None` if every persist attempt failed
    pub position: Option<LogPosition>,
    /// Sessions the frame was handed to
    pub delivered: usize,
    /// Sessions found already gone; removed silently
    pub departed: usize,
    /// Sessions whose outbox was full; removed as too slow
    pub evicted: usize,
}

/// メッセージ配信のユースケース
pub struct Dispatcher {
    /// MessageLog（永続化層の抽象化）
    message_log: Arc<dyn MessageLog>,
    /// 接続中のセッションの集合
    registry: Arc<SessionRegistry>,
    /// 永続化失敗時のリトライ方針
    retry: RetryPolicy,
}

impl Dispatcher {
    /// 新しい Dispatcher を作成
    pub fn new(
        message_log: Arc<dyn MessageLog>,
        registry: Arc<SessionRegistry>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            message_log,
            registry,
            retry,
        }
    }

    /// Run on a new task, consuming `pipeline`
    pub fn spawn(self, pipeline: PipelineReceiver) -> JoinHandle<()> {
        tokio::spawn(self.run(pipeline))
    }

    /// Dispatch every message until all producers are gone
    pub async fn run(self, mut pipeline: PipelineReceiver) {
        tracing::info!("Dispatcher started");

        while let Some(message) = pipeline.dequeue().await {
            let report = self.dispatch(message).await;
            tracing::debug!(
                "Dispatched message {:?} to {} sessions ({} departed, {} evicted)",
                report.position,
                report.delivered,
                report.departed,
                report.evicted
            );
        }

        tracing::info!("Message pipeline closed, dispatcher stopped");
    }

    /// Persist one message, then fan it out to every registered session
    pub async fn dispatch(&self, message: ChatMessage) -> DispatchReport {
        // 1. 永続化（失敗してもライブ配信は行う）
        let position = self.persist(&message).await;

        // 2. ファンアウト
        let frame = OutboundFrame::new(position, Arc::new(message));
        let mut report = DispatchReport {
            position,
            ..DispatchReport::default()
        };

        self.registry
            .for_each(|session_id, outbox| match outbox.offer(frame.clone()) {
                Ok(()) => {
                    report.delivered += 1;
                    Visit::Keep
                }
                Err(OfferError::Closed) => {
                    tracing::debug!("Session '{}' has departed, removing", session_id);
                    report.departed += 1;
                    Visit::Remove
                }
                Err(OfferError::Full) => {
                    tracing::warn!(
                        "Session '{}' is not keeping up with delivery, disconnecting",
                        session_id
                    );
                    report.evicted += 1;
                    Visit::Remove
                }
            })
            .await;

        report
    }

    /// Append with bounded retry; `None` once every attempt has failed
    async fn persist(&self, message: &ChatMessage) -> Option<LogPosition> {
        let attempts = self.retry.retries.saturating_add(1);
        let mut attempt = 0;

        loop {
            match self.message_log.append(message).await {
                Ok(position) => return Some(position),
                Err(e) if attempt < self.retry.retries => {
                    let delay = self.retry.delay(attempt);
                    tracing::warn!(
                        "Failed to persist message (attempt {}/{}), retrying in {:?}: {}",
                        attempt + 1,
                        attempts,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to persist message after {} attempts, delivering live only: {}",
                        attempts,
                        e
                    );
                    return None;
                }
            }
        }
    }
}
