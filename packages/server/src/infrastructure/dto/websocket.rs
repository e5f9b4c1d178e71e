//! WebSocket message DTOs.

use serde::{Deserialize, Serialize};

/// Chat message as it travels over the WebSocket and is stored in the log
///
/// Every field defaults to an empty string when absent, so clients may
/// omit fields they do not use (notably `time`, which the server sets).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatMessageDto {
    pub room: String,
    pub id: String,
    pub username: String,
    pub text: String,
    pub time: String,
}

impl ChatMessageDto {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_slice(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        // テスト項目: 欠けているフィールドは空文字列として読み込まれる
        // given (前提条件):
        let json = r#"{"room":"lobby","username":"alice","text":"hi"}"#;

        // when (操作):
        let dto = ChatMessageDto::from_json(json).unwrap();

        // then (期待する結果):
        assert_eq!(dto.room, "lobby");
        assert_eq!(dto.username, "alice");
        assert_eq!(dto.text, "hi");
        assert_eq!(dto.id, "");
        assert_eq!(dto.time, "");
    }

    #[test]
    fn test_serialized_field_names() {
        // テスト項目: シリアライズ結果が room/id/username/text/time のフィールドを持つ
        // given (前提条件):
        let dto = ChatMessageDto {
            room: "lobby".to_string(),
            id: "m-1".to_string(),
            username: "alice".to_string(),
            text: "hi".to_string(),
            time: "2023-01-01 3:4:5 pm".to_string(),
        };

        // when (操作):
        let value: serde_json::Value = serde_json::from_str(&dto.to_json().unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            serde_json::json!({
                "room": "lobby",
                "id": "m-1",
                "username": "alice",
                "text": "hi",
                "time": "2023-01-01 3:4:5 pm",
            })
        );
    }

    #[test]
    fn test_non_object_is_rejected() {
        // テスト項目: JSON オブジェクトでない入力はエラーになる
        // given (前提条件):
        let inputs = ["not json", "[1,2,3]", r#"{"text": 42}"#];

        // when (操作) / then (期待する結果):
        for input in inputs {
            assert!(ChatMessageDto::from_json(input).is_err(), "{input}");
        }
    }
}
