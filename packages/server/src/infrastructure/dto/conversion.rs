//! Conversion logic between DTOs and domain entities.

use crate::domain::{ChatMessage, IncomingMessage};
use crate::infrastructure::dto::websocket::ChatMessageDto;

// ========================================
// DTO → Domain Entity
// ========================================

/// Inbound from a client: the client's `time` is dropped here
impl From<ChatMessageDto> for IncomingMessage {
    fn from(dto: ChatMessageDto) -> Self {
        Self {
            room: dto.room,
            id: dto.id,
            username: dto.username,
            text: dto.text,
        }
    }
}

/// Read back from the log: the stored `time` is kept
impl From<ChatMessageDto> for ChatMessage {
    fn from(dto: ChatMessageDto) -> Self {
        Self {
            room: dto.room,
            id: dto.id,
            username: dto.username,
            text: dto.text,
            time: dto.time,
        }
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<&ChatMessage> for ChatMessageDto {
    fn from(model: &ChatMessage) -> Self {
        Self {
            room: model.room.clone(),
            id: model.id.clone(),
            username: model.username.clone(),
            text: model.text.clone(),
            time: model.time.clone(),
        }
    }
}
