//! Server state shared by the handlers.

use std::{sync::Arc, time::Duration};

use crate::usecase::{ConnectSessionUseCase, DisconnectSessionUseCase, SubmitMessageUseCase};

/// Shared application state
pub struct AppState {
    /// ConnectSessionUseCase（セッション接続のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// SubmitMessageUseCase（メッセージ投入のユースケース）
    pub submit_message_usecase: Arc<SubmitMessageUseCase>,
    /// DisconnectSessionUseCase（セッション切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// Upper bound on a single write to a client
    pub write_timeout: Duration,
}
