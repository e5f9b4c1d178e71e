//! UseCase layer
//!
//! - `ConnectSessionUseCase`: セッションの登録とバックログの読み出し
//! - `SubmitMessageUseCase`: 受信メッセージへの時刻付与とパイプラインへの投入
//! - `DisconnectSessionUseCase`: セッションの登録解除
//! - `Dispatcher`: パイプラインの唯一の consumer（永続化してからファンアウト）

mod connect_session;
mod disconnect_session;
mod dispatcher;
mod error;
mod submit_message;

pub use connect_session::{ConnectSessionUseCase, ConnectedSession};
pub use disconnect_session::DisconnectSessionUseCase;
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{ConnectError, SubmitError};
pub use submit_message::SubmitMessageUseCase;
