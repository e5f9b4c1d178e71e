//! Infrastructure layer
//!
//! - `dto`: ワイヤフォーマット（WebSocket / HTTP）
//! - `repository`: `MessageLog` の具体的な実装（Redis, InMemory）

pub mod dto;
pub mod repository;
