//! Session domain model
//!
//! ## 概要
//!
//! 接続中のクライアント 1 つにつき 1 つのセッションが存在します。
//!
//! - `SessionLifecycle`: `Connecting → Active → Closing → Closed` の状態遷移
//! - `SessionOutbox` / `SessionInbox`: Dispatcher からセッションへの有界な送信バッファ
//! - `OutboundFrame`: バッファを流れる 1 件の配信単位
//!
//! ## 設計ノート
//!
//! `SessionOutbox` はレジストリが保持し、`SessionInbox` はセッションのタスクが保持します。
//! レジストリから outbox が取り除かれると、inbox 側は残っているフレームを捨てて
//! 即座に終了を検知します（遅いセッションの強制切断に使用）。

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use super::{
    entity::ChatMessage,
    error::{LifecycleError, OfferError},
    value_object::LogPosition,
};

/// Upper bound for any session or pipeline buffer; larger requests are clamped
pub const MAX_CHANNEL_CAPACITY: usize = 1 << 20;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Transport upgraded, not yet registered
    Connecting,
    /// Registered; backlog replay and live delivery
    Active,
    /// Leaving the registry, loops stopping
    Closing,
    /// Transport closed; terminal
    Closed,
}

/// Guards the session state transitions
#[derive(Debug)]
pub struct SessionLifecycle {
    state: SessionState,
}

impl SessionLifecycle {
    pub fn new() -> Self {
        Self {
            state: SessionState::Connecting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Move to `next`, rejecting transitions the lifecycle does not allow
    ///
    /// A session that fails during admission goes straight from
    /// `Connecting` to `Closing`.
    pub fn advance(&mut self, next: SessionState) -> Result<(), LifecycleError> {
        use SessionState::*;

        let allowed = matches!(
            (self.state, next),
            (Connecting, Active) | (Connecting, Closing) | (Active, Closing) | (Closing, Closed)
        );
        if !allowed {
            return Err(LifecycleError {
                from: self.state,
                to: next,
            });
        }

        self.state = next;
        Ok(())
    }
}

impl Default for SessionLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// One message on its way to a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    /// Where the message landed in the log; `None` if persisting failed
    pub position: Option<LogPosition>,
    pub message: Arc<ChatMessage>,
}

impl OutboundFrame {
    pub fn new(position: Option<LogPosition>, message: Arc<ChatMessage>) -> Self {
        Self { position, message }
    }

    /// Whether a backlog read up to `cutoff` already contains this message
    pub fn is_covered_by(&self, cutoff: LogPosition) -> bool {
        self.position.is_some_and(|position| position <= cutoff)
    }
}

/// Create a bounded outbox/inbox pair for one session
///
/// `capacity` is clamped to `1..=MAX_CHANNEL_CAPACITY`.
pub fn session_channel(capacity: usize) -> (SessionOutbox, SessionInbox) {
    let (frames_tx, frames_rx) = mpsc::channel(capacity.clamp(1, MAX_CHANNEL_CAPACITY));
    let (evict_tx, evict_rx) = oneshot::channel();

    (
        SessionOutbox {
            frames: frames_tx,
            _eviction: evict_tx,
        },
        SessionInbox {
            frames: frames_rx,
            eviction: evict_rx,
            evicted: false,
        },
    )
}

/// Dispatcher-facing end of a session's buffer
///
/// Dropping the outbox evicts the session.
#[derive(Debug)]
pub struct SessionOutbox {
    frames: mpsc::Sender<OutboundFrame>,
    /// Never sent on; dropping it wakes the inbox.
    _eviction: oneshot::Sender<()>,
}

impl SessionOutbox {
    /// Place a frame in the buffer without waiting
    pub fn offer(&self, frame: OutboundFrame) -> Result<(), OfferError> {
        self.frames.try_send(frame).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => OfferError::Full,
            mpsc::error::TrySendError::Closed(_) => OfferError::Closed,
        })
    }
}

/// Session-facing end of the buffer
#[derive(Debug)]
pub struct SessionInbox {
    frames: mpsc::Receiver<OutboundFrame>,
    eviction: oneshot::Receiver<()>,
    evicted: bool,
}

impl SessionInbox {
    /// Next frame, or `None` once the outbox is gone
    ///
    /// Frames still buffered when the outbox is dropped are discarded.
    pub async fn recv(&mut self) -> Option<OutboundFrame> {
        if self.evicted {
            return None;
        }

        tokio::select! {
            biased;
            _ = &mut self.eviction => {
                self.evicted = true;
                None
            }
            frame = self.frames.recv() => frame,
        }
    }
}
