//! Message pipeline
//!
//! Many producers (one per session), exactly one consumer (the dispatcher).
//! The receiving end is not `Clone`, so only one task can ever dequeue.
//!
//! With a capacity of 1, `enqueue` suspends the calling session until the
//! dispatcher has taken the previous message, so at most one message waits
//! unpersisted in the queue.

use tokio::sync::mpsc;

use super::{entity::ChatMessage, error::PipelineClosed, session::MAX_CHANNEL_CAPACITY};

/// Create a pipeline; `capacity` is clamped to `1..=MAX_CHANNEL_CAPACITY`
pub fn message_pipeline(capacity: usize) -> (MessagePipeline, PipelineReceiver) {
    let (sender, receiver) = mpsc::channel(capacity.clamp(1, MAX_CHANNEL_CAPACITY));
    (MessagePipeline { sender }, PipelineReceiver { receiver })
}

/// Producer end, shared by all sessions
#[derive(Debug, Clone)]
pub struct MessagePipeline {
    sender: mpsc::Sender<ChatMessage>,
}

impl MessagePipeline {
    /// Queue a message, waiting while the pipeline is full
    pub async fn enqueue(&self, message: ChatMessage) -> Result<(), PipelineClosed> {
        self.sender.send(message).await.map_err(|_| PipelineClosed)
    }
}

/// Consumer end, owned by the dispatcher
#[derive(Debug)]
pub struct PipelineReceiver {
    receiver: mpsc::Receiver<ChatMessage>,
}

impl PipelineReceiver {
    /// Next message in completion order of `enqueue`
    ///
    /// Returns `None` once every producer is gone.
    pub async fn dequeue(&mut self) -> Option<ChatMessage> {
        self.receiver.recv().await
    }
}
