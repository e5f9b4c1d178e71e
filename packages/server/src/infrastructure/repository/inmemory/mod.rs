//! InMemory 実装

mod message_log;

pub use message_log::InMemoryMessageLog;
