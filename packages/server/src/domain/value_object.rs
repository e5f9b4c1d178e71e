//! Value objects.

use std::fmt;

use uuid::Uuid;

/// 1-based position of a record in the message log.
///
/// The position of a record equals the log length right after it was
/// appended, so "every record up to length `n`" is `position <= n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct LogPosition(u64);

impl LogPosition {
    /// Position before the first record (an empty log)
    pub const START: LogPosition = LogPosition(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for LogPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of one connected session.
///
/// Sessions carry no user identity; the id only distinguishes transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new random session id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_position_ordering() {
        // テスト項目: LogPosition が値の大小で比較できる
        // given (前提条件):
        let first = LogPosition::new(1);
        let third = LogPosition::new(3);

        // when (操作):

        // then (期待する結果):
        assert!(LogPosition::START < first);
        assert!(first < third);
        assert_eq!(LogPosition::default(), LogPosition::START);
        assert_eq!(third.to_string(), "#3");
    }

    #[test]
    fn test_session_id_generate_is_unique() {
        // テスト項目: 生成される SessionId が毎回異なる
        // given (前提条件):

        // when (操作):
        let a = SessionId::generate();
        let b = SessionId::generate();

        // then (期待する結果):
        assert_ne!(a, b);
        assert!(Uuid::parse_str(&a.to_string()).is_ok());
    }
}
