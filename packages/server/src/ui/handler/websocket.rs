//! WebSocket session handler.
//!
//! Each connection is driven through `Connecting → Active → Closing → Closed`:
//! the session is registered and its backlog written, then a reader task feeds
//! the pipeline while a pusher task writes live frames, until either side ends.

use std::{error::Error as StdError, io, sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, SplitStream, StreamExt},
};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite;

use crate::{
    domain::{
        Backlog, ChatMessage, IncomingMessage, LogPosition, SessionId, SessionInbox,
        SessionLifecycle, SessionState, TransportError,
    },
    infrastructure::dto::websocket::ChatMessageDto,
    ui::state::AppState,
    usecase::{ConnectError, ConnectedSession, SubmitMessageUseCase},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_failed_upgrade(|e| tracing::warn!("WebSocket upgrade failed: {}", e))
        .on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let session_id = SessionId::generate();
    let mut lifecycle = SessionLifecycle::new();
    let (mut sender, receiver) = socket.split();

    match state.connect_session_usecase.execute(session_id).await {
        Ok(ConnectedSession { inbox, backlog }) => {
            tracing::info!(
                "Session '{}' connected, replaying {} messages",
                session_id,
                backlog.messages().len()
            );

            let cutoff = backlog.end();
            match replay_backlog(&mut sender, backlog, state.write_timeout).await {
                Ok(()) => {
                    advance(&mut lifecycle, session_id, SessionState::Active);
                    run_live(&state, session_id, inbox, sender, receiver, cutoff).await;
                }
                Err(e) => log_write_failure(session_id, &e),
            }
        }
        Err(e) => {
            match e {
                ConnectError::ShuttingDown => tracing::info!("Rejecting session: {}", e),
                ConnectError::DuplicateSession(_) => tracing::warn!("Rejecting session: {}", e),
            }
            advance(&mut lifecycle, session_id, SessionState::Closing);
            advance(&mut lifecycle, session_id, SessionState::Closed);
            return;
        }
    }

    advance(&mut lifecycle, session_id, SessionState::Closing);
    state.disconnect_session_usecase.execute(&session_id).await;
    advance(&mut lifecycle, session_id, SessionState::Closed);

    tracing::info!("Session '{}' disconnected", session_id);
}

fn advance(lifecycle: &mut SessionLifecycle, session_id: SessionId, next: SessionState) {
    match lifecycle.advance(next) {
        Ok(()) => tracing::debug!("Session '{}' is now {:?}", session_id, next),
        Err(e) => tracing::warn!("Session '{}': {}", session_id, e),
    }
}

/// Write the whole backlog, oldest first, before any live frame
async fn replay_backlog(
    sender: &mut SplitSink<WebSocket, Message>,
    backlog: Backlog,
    write_timeout: Duration,
) -> Result<(), TransportError> {
    for message in backlog.into_messages() {
        if let Some(json) = encode(&message) {
            write_text(sender, json, write_timeout).await?;
        }
    }
    Ok(())
}

/// Drive the reader and the pusher until either of them ends
async fn run_live(
    state: &Arc<AppState>,
    session_id: SessionId,
    inbox: SessionInbox,
    sender: SplitSink<WebSocket, Message>,
    receiver: SplitStream<WebSocket>,
    cutoff: LogPosition,
) {
    let mut recv_task = reader_loop(
        session_id,
        receiver,
        state.submit_message_usecase.clone(),
    );
    let mut send_task = pusher_loop(session_id, inbox, sender, cutoff, state.write_timeout);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };
}

/// Spawns a task that reads messages from the client and submits them to the pipeline.
///
/// Ends on a close frame, a read error, a malformed message or a closed pipeline.
fn reader_loop(
    session_id: SessionId,
    mut receiver: SplitStream<WebSocket>,
    submit_message_usecase: Arc<SubmitMessageUseCase>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    if is_peer_departure(&e) {
                        tracing::debug!("Session '{}' went away: {}", session_id, e);
                    } else {
                        tracing::warn!("Failed to read from session '{}': {}", session_id, e);
                    }
                    break;
                }
            };

            let parsed = match msg {
                Message::Text(text) => ChatMessageDto::from_json(text.as_str()),
                Message::Binary(bytes) => ChatMessageDto::from_json_slice(&bytes),
                Message::Close(_) => {
                    tracing::debug!("Session '{}' requested close", session_id);
                    break;
                }
                Message::Ping(_) | Message::Pong(_) => continue,
            };

            let dto = match parsed {
                Ok(dto) => dto,
                Err(e) => {
                    tracing::warn!(
                        "Session '{}' sent a malformed message, closing: {}",
                        session_id,
                        e
                    );
                    break;
                }
            };

            tracing::debug!(
                "Received message from session '{}' ({}): {}",
                session_id,
                dto.username,
                dto.text
            );

            // The client-supplied time is dropped here
            if let Err(e) = submit_message_usecase
                .execute(IncomingMessage::from(dto))
                .await
            {
                tracing::warn!("Dropping message from session '{}': {}", session_id, e);
                break;
            }
        }
    })
}

/// Spawns a task that writes live frames to the client.
///
/// Frames already covered by the replayed backlog are skipped. When the hub
/// releases the session (eviction or shutdown) a close frame is sent.
fn pusher_loop(
    session_id: SessionId,
    mut inbox: SessionInbox,
    mut sender: SplitSink<WebSocket, Message>,
    cutoff: LogPosition,
    write_timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = inbox.recv().await {
            if frame.is_covered_by(cutoff) {
                continue;
            }

            let Some(json) = encode(&frame.message) else {
                continue;
            };
            if let Err(e) = write_text(&mut sender, json, write_timeout).await {
                log_write_failure(session_id, &e);
                return;
            }
        }

        tracing::debug!("Session '{}' released by the hub, closing", session_id);
        if let Err(e) = write_close(&mut sender, write_timeout).await {
            tracing::debug!("Failed to send close frame to '{}': {}", session_id, e);
        }
    })
}

fn encode(message: &ChatMessage) -> Option<String> {
    match ChatMessageDto::from(message).to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::warn!("Failed to encode message, skipping: {}", e);
            None
        }
    }
}

async fn write_text(
    sender: &mut SplitSink<WebSocket, Message>,
    json: String,
    write_timeout: Duration,
) -> Result<(), TransportError> {
    write_message(sender, Message::Text(json.into()), write_timeout).await
}

async fn write_close(
    sender: &mut SplitSink<WebSocket, Message>,
    write_timeout: Duration,
) -> Result<(), TransportError> {
    write_message(sender, Message::Close(None), write_timeout).await
}

async fn write_message(
    sender: &mut SplitSink<WebSocket, Message>,
    message: Message,
    write_timeout: Duration,
) -> Result<(), TransportError> {
    match tokio::time::timeout(write_timeout, sender.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(classify_send_error(&e)),
        Err(_) => Err(TransportError::TimedOut(write_timeout)),
    }
}

fn classify_send_error(error: &axum::Error) -> TransportError {
    if is_peer_departure(error) {
        TransportError::PeerClosed
    } else {
        TransportError::Other(error.to_string())
    }
}

/// Whether an error anywhere in the chain means the peer simply went away
fn is_peer_departure(error: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(error);

    while let Some(e) = current {
        if let Some(io_error) = e.downcast_ref::<io::Error>()
            && matches!(
                io_error.kind(),
                io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::UnexpectedEof
            )
        {
            return true;
        }

        if let Some(ws_error) = e.downcast_ref::<tungstenite::Error>()
            && matches!(
                ws_error,
                tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed
            )
        {
            return true;
        }

        // Display text of ConnectionClosed / AlreadyClosed as of tungstenite 0.28,
        // for when axum links a different tungstenite release than this crate
        let text = e.to_string();
        if text.contains("Connection closed normally")
            || text.contains("Trying to work with closed connection")
        {
            return true;
        }

        current = e.source();
    }

    false
}

fn log_write_failure(session_id: SessionId, error: &TransportError) {
    if error.is_expected() {
        tracing::debug!("Session '{}' went away during write", session_id);
    } else {
        tracing::warn!("Failed to write to session '{}': {}", session_id, error);
    }
}
