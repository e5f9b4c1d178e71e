//! Entities: chat messages and the backlog read from the message log.

use super::value_object::LogPosition;

/// A chat message as relayed to sessions and recorded in the message log.
///
/// `room` is carried through untouched; it does not partition delivery or
/// storage. `time` is always the server-side receipt time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub room: String,
    pub id: String,
    pub username: String,
    pub text: String,
    pub time: String,
}

/// A message as read off a session's transport, before the server stamps it.
///
/// Any client-supplied time has already been discarded at this point.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IncomingMessage {
    pub room: String,
    pub id: String,
    pub username: String,
    pub text: String,
}

impl IncomingMessage {
    /// Fix the receipt time, producing the immutable [`ChatMessage`]
    pub fn stamp(self, time: String) -> ChatMessage {
        ChatMessage {
            room: self.room,
            id: self.id,
            username: self.username,
            text: self.text,
            time,
        }
    }
}

/// Snapshot of the message log, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Backlog {
    messages: Vec<ChatMessage>,
    /// Log length at the time of the read.
    ///
    /// Can exceed `messages.len()` when undecodable records were skipped.
    end: LogPosition,
}

impl Backlog {
    pub fn new(messages: Vec<ChatMessage>, end: LogPosition) -> Self {
        Self { messages, end }
    }

    /// Backlog of an empty (or unreadable) log
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn end(&self) -> LogPosition {
        self.end
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }
}
