//! `MessageLog` の実装
//!
//! ## 実装
//!
//! - `redis`: Redis のリストを使った実装（本番用）
//! - `inmemory`: プロセス内のベクタを使った実装（開発・テスト用）
//!
//! どちらの実装もレコードはワイヤフォーマットの JSON 文字列として保存します（`record`）。

pub mod inmemory;
pub mod record;
pub mod redis;

pub use inmemory::InMemoryMessageLog;
pub use self::redis::RedisMessageLog;
