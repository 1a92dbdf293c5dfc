//! Inbound record parsing.

use crate::error::ProtocolError;
use crate::protocol::ClientRecord;

/// Upper bound on one serialized record, handshake line included.
pub const MAX_RECORD_LENGTH: usize = 8192;

/// Parses one line of input into a `ClientRecord`.
///
/// A record the server cannot parse is malformed and gets dropped by the
/// caller; a well-formed record of an unrecognized kind comes back as
/// `ClientRecord::Unknown` instead.
pub fn parse_record(raw: &str) -> Result<ClientRecord, ProtocolError> {
    if raw.len() > MAX_RECORD_LENGTH {
        return Err(ProtocolError::Oversized(raw.len()));
    }

    serde_json::from_str(raw.trim()).map_err(ProtocolError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_records() {
        assert_eq!(parse_record(r#"{"type":"ping"}"#).unwrap(), ClientRecord::Ping);
        assert_eq!(
            parse_record(r#"{"type":"get_online_users"}"#).unwrap(),
            ClientRecord::GetOnlineUsers
        );
    }

    #[test]
    fn test_parse_message_record() {
        assert_eq!(
            parse_record(r#"{"type":"message","to":"bob","text":"hi"}"#).unwrap(),
            ClientRecord::Message {
                to: "bob".to_string(),
                text: "hi".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_with_whitespace() {
        assert_eq!(
            parse_record("  {\"type\":\"ping\"}  \r\n").unwrap(),
            ClientRecord::Ping
        );
    }

    #[test]
    fn test_unknown_kind_parses_as_unknown() {
        assert_eq!(
            parse_record(r#"{"type":"presence_v2"}"#).unwrap(),
            ClientRecord::Unknown
        );
    }

    #[test]
    fn test_malformed_records_are_errors() {
        assert!(parse_record("not json").is_err());
        assert!(parse_record(r#"{"no_type":true}"#).is_err());
        // A message without a recipient is malformed, not Unknown.
        assert!(parse_record(r#"{"type":"message","text":"hi"}"#).is_err());
    }

    #[test]
    fn test_oversized_record_is_rejected() {
        let raw = format!(
            r#"{{"type":"message","to":"bob","text":"{}"}}"#,
            "x".repeat(MAX_RECORD_LENGTH)
        );
        assert!(matches!(
            parse_record(&raw),
            Err(ProtocolError::Oversized(_))
        ));
    }
}
