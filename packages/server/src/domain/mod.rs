//! Domain layer
//!
//! メッセージ・セッション・レジストリ・パイプラインといった中核の型と、
//! Infrastructure 層が実装するインターフェース（`MessageLog`）を定義します。

pub mod entity;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{Backlog, ChatMessage, IncomingMessage};
pub use error::{
    LifecycleError, LogError, OfferError, PipelineClosed, RegistryError, TransportError,
};
pub use pipeline::{MessagePipeline, PipelineReceiver, message_pipeline};
pub use registry::{SessionRegistry, Visit};
pub use repository::MessageLog;
pub use session::{
    MAX_CHANNEL_CAPACITY, OutboundFrame, SessionInbox, SessionLifecycle, SessionOutbox,
    SessionState, session_channel,
};
pub use value_object::{LogPosition, SessionId};

#[cfg(test)]
pub use repository::MockMessageLog;
