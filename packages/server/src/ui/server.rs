//! Server execution logic.

use std::{future::Future, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use hiroba_shared::time::Clock;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::HubConfig,
    domain::{MessageLog, SessionRegistry, message_pipeline},
    usecase::{
        ConnectSessionUseCase, DisconnectSessionUseCase, Dispatcher, SubmitMessageUseCase,
    },
};

use super::{
    handler::{health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// How long the dispatcher may take to drain the pipeline once sessions are released
const DISPATCHER_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// WebSocket chat relay server
///
/// Owns the connection hub: the session registry, the message pipeline and
/// the dispatcher task that drains it.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(message_log, Arc::new(SystemClock), HubConfig::default());
/// server.run("127.0.0.1".to_string(), 8000).await?;
/// ```
pub struct Server {
    /// MessageLog（永続化層の抽象化）
    message_log: Arc<dyn MessageLog>,
    /// 受信時刻の取得元
    clock: Arc<dyn Clock>,
    config: HubConfig,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `message_log` - Append-only log every message is persisted to
    /// * `clock` - Source of receipt times
    /// * `config` - Pipeline, outbox and retry tuning
    pub fn new(message_log: Arc<dyn MessageLog>, clock: Arc<dyn Clock>, config: HubConfig) -> Self {
        Self {
            message_log,
            clock,
            config,
        }
    }

    /// Run the relay until Ctrl+C or SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), ServerError> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: bind_addr.clone(),
                source,
            })?;

        tracing::info!("Chat relay listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/websocket", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// After the listener stops, every registered session is released and
    /// the dispatcher is given time to drain what is left in the pipeline.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Initialize the hub in order:
        // 1. Registry and pipeline
        // 2. Dispatcher (the only consumer of the pipeline)
        // 3. UseCases
        // 4. AppState and router
        let registry = Arc::new(SessionRegistry::new());
        let (pipeline, receiver) = message_pipeline(self.config.pipeline_capacity);

        let mut dispatcher = Dispatcher::new(
            self.message_log.clone(),
            registry.clone(),
            self.config.persist_retry,
        )
        .spawn(receiver);

        let app_state = Arc::new(AppState {
            connect_session_usecase: Arc::new(ConnectSessionUseCase::new(
                registry.clone(),
                self.message_log.clone(),
                self.config.outbox_capacity,
            )),
            submit_message_usecase: Arc::new(SubmitMessageUseCase::new(pipeline, self.clock)),
            disconnect_session_usecase: Arc::new(DisconnectSessionUseCase::new(registry.clone())),
            write_timeout: self.config.write_timeout,
        });

        axum::serve(listener, router(app_state))
            .with_graceful_shutdown(shutdown)
            .await?;

        // Upgraded connections outlive the listener; release them and refuse late arrivals
        let released = registry.close().await;
        tracing::info!("Released {} sessions", released);

        match tokio::time::timeout(DISPATCHER_STOP_TIMEOUT, &mut dispatcher).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Dispatcher task failed: {}", e),
            Err(_) => {
                tracing::warn!(
                    "Dispatcher did not stop within {:?}, aborting",
                    DISPATCHER_STOP_TIMEOUT
                );
                dispatcher.abort();
            }
        }

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket エンドポイント
        .route("/websocket", get(websocket_handler))
        // HTTP エンドポイント
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
