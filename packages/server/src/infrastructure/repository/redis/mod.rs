//! Redis 実装

mod message_log;

pub use message_log::{DEFAULT_LOG_KEY, RedisMessageLog};
