//! InMemory MessageLog 実装
//!
//! ドメイン層が定義する `MessageLog` trait の具体的な実装。
//! `Vec` をインメモリのストアとして使用します。
//! レコードは Redis 実装と同じくシリアライズ済みの JSON 文字列で保持します。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Backlog, ChatMessage, LogError, LogPosition, MessageLog};

use super::super::record::{decode_records, encode_record};

/// インメモリ MessageLog 実装
///
/// プロセスが終了すると内容は失われます。
#[derive(Debug, Default)]
pub struct InMemoryMessageLog {
    /// シリアライズ済みのレコード（古い順）
    records: Mutex<Vec<String>>,
}

impl InMemoryMessageLog {
    /// 新しい空の InMemoryMessageLog を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 既存のレコード列から作成
    #[cfg(test)]
    pub(crate) fn from_records(records: Vec<String>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// 保存されているレコード数
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(&self, message: &ChatMessage) -> Result<LogPosition, LogError> {
        let record = encode_record(message)?;

        let mut records = self.records.lock().await;
        records.push(record);
        Ok(LogPosition::new(records.len() as u64))
    }

    async fn read_all(&self) -> Result<Backlog, LogError> {
        let records = self.records.lock().await;
        Ok(decode_records(records.iter()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryMessageLog の追記と全件読み出し
    //
    // 【なぜこのテストが必要か】
    // - 開発時・テスト時のストアとして Redis 実装と同じ契約を満たす必要がある
    // - 追記位置がバックログの重複排除に使われるため、位置の正しさを保証する
    //
    // 【どのようなシナリオをテストするか】
    // 1. 空のログの読み出し
    // 2. 追記位置が 1 から連番になること
    // 3. 読み出しが追記順（古い順）であること
    // 4. 壊れたレコードの読み飛ばし
    // ========================================

    fn message(text: &str) -> ChatMessage {
        ChatMessage {
            room: "lobby".to_string(),
            id: String::new(),
            username: "alice".to_string(),
            text: text.to_string(),
            time: "2023-01-01 3:4:5 pm".to_string(),
        }
    }

    #[tokio::test]
    async fn test_read_all_empty_log() {
        // テスト項目: 空のログからは空の Backlog が読み出される
        // given (前提条件):
        let log = InMemoryMessageLog::new();

        // when (操作):
        let backlog = log.read_all().await.unwrap();

        // then (期待する結果):
        assert!(backlog.is_empty());
        assert_eq!(backlog.end(), LogPosition::START);
    }

    #[tokio::test]
    async fn test_append_returns_sequential_positions() {
        // テスト項目: 追記のたびに 1 から始まる連番の位置が返される
        // given (前提条件):
        let log = InMemoryMessageLog::new();

        // when (操作):
        let first = log.append(&message("m1")).await.unwrap();
        let second = log.append(&message("m2")).await.unwrap();

        // then (期待する結果):
        assert_eq!(first, LogPosition::new(1));
        assert_eq!(second, LogPosition::new(2));
        assert_eq!(log.len().await, 2);
    }

    #[tokio::test]
    async fn test_read_all_oldest_first() {
        // テスト項目: 全件読み出しは追記順（古い順）で返される
        // given (前提条件):
        let log = InMemoryMessageLog::new();
        for text in ["m1", "m2", "m3"] {
            log.append(&message(text)).await.unwrap();
        }

        // when (操作):
        let backlog = log.read_all().await.unwrap();

        // then (期待する結果):
        let texts: Vec<&str> = backlog.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["m1", "m2", "m3"]);
        assert_eq!(backlog.end(), LogPosition::new(3));
    }

    #[tokio::test]
    async fn test_read_all_skips_corrupt_record() {
        // テスト項目: 壊れたレコードは読み飛ばされ、位置は保たれる
        // given (前提条件):
        let log = InMemoryMessageLog::from_records(vec![
            encode_record(&message("m1")).unwrap(),
            "garbage".to_string(),
        ]);

        // when (操作):
        let backlog = log.read_all().await.unwrap();
        let next = log.append(&message("m3")).await.unwrap();

        // then (期待する結果):
        assert_eq!(backlog.messages().len(), 1);
        assert_eq!(backlog.end(), LogPosition::new(2));
        assert_eq!(next, LogPosition::new(3));
    }
}
