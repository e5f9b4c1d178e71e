//! Log record encoding.
//!
//! A record is the message serialized in the wire format.

use crate::{
    domain::{Backlog, ChatMessage, LogError, LogPosition},
    infrastructure::dto::websocket::ChatMessageDto,
};

/// Serialize a message into a log record
pub fn encode_record(message: &ChatMessage) -> Result<String, LogError> {
    ChatMessageDto::from(message)
        .to_json()
        .map_err(|e| LogError::Encode(e.to_string()))
}

/// Decode a full-range read, oldest first
///
/// Undecodable records are skipped with a warning but still count toward
/// the backlog's end position, so positions keep matching the store.
pub fn decode_records<I, R>(records: I) -> Backlog
where
    I: IntoIterator<Item = R>,
    R: AsRef<str>,
{
    let mut messages = Vec::new();
    let mut end = 0u64;

    for record in records {
        end += 1;
        match ChatMessageDto::from_json(record.as_ref()) {
            Ok(dto) => messages.push(dto.into()),
            Err(e) => {
                tracing::warn!("Skipping undecodable log record at position {}: {}", end, e);
            }
        }
    }

    Backlog::new(messages, LogPosition::new(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> ChatMessage {
        ChatMessage {
            room: "lobby".to_string(),
            id: String::new(),
            username: "alice".to_string(),
            text: text.to_string(),
            time: "2023-01-01 3:4:5 pm".to_string(),
        }
    }

    #[test]
    fn test_decode_records_in_order() {
        // テスト項目: レコードが保存順にデコードされる
        // given (前提条件):
        let records = vec![
            encode_record(&message("m1")).unwrap(),
            encode_record(&message("m2")).unwrap(),
        ];

        // when (操作):
        let backlog = decode_records(records);

        // then (期待する結果):
        assert_eq!(backlog.messages(), &[message("m1"), message("m2")]);
        assert_eq!(backlog.end(), LogPosition::new(2));
    }

    #[test]
    fn test_decode_records_skips_corrupt_record() {
        // テスト項目: デコードできないレコードは読み飛ばされるが、終端位置には数えられる
        // given (前提条件):
        let records = vec![
            encode_record(&message("m1")).unwrap(),
            "{not json".to_string(),
            encode_record(&message("m3")).unwrap(),
        ];

        // when (操作):
        let backlog = decode_records(records);

        // then (期待する結果):
        assert_eq!(backlog.messages(), &[message("m1"), message("m3")]);
        assert_eq!(backlog.end(), LogPosition::new(3));
    }

    #[test]
    fn test_decode_no_records() {
        // テスト項目: レコードが無い場合は空の Backlog になる
        // given (前提条件):
        let records: Vec<String> = Vec::new();

        // when (操作):
        let backlog = decode_records(records);

        // then (期待する結果):
        assert_eq!(backlog, Backlog::empty());
    }
}
