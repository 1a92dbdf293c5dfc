//! Record types exchanged over a connection.
//!
//! Records are JSON objects discriminated by a `type` field. Unknown inbound
//! kinds deserialize to `ClientRecord::Unknown` so newer clients never break
//! an older server.

use serde::{Deserialize, Serialize};

/// Record received from a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientRecord {
    /// Heartbeat; touches liveness and is answered with `Pong`.
    Ping,
    /// Explicit presence query; answered with `OnlineUsers`.
    GetOnlineUsers,
    /// Point-to-point message for `to`.
    Message {
        to: String,
        #[serde(default)]
        text: String,
    },
    /// Any record kind this server does not recognize.
    #[serde(other)]
    Unknown,
}

/// Record sent to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerRecord {
    /// Heartbeat acknowledgment.
    Pong,
    /// Presence snapshot; never contains the recipient's own identifier.
    OnlineUsers { users: Vec<String> },
    /// Message delivered from another client.
    Message { from: String, text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_online_users() {
        let record = ServerRecord::OnlineUsers {
            users: vec!["bob".to_string()],
        };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"type":"online_users","users":["bob"]}"#
        );
    }

    #[test]
    fn test_serialize_delivered_message() {
        let record = ServerRecord::Message {
            from: "alice".to_string(),
            text: "hi".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"type":"message","from":"alice","text":"hi"}"#
        );
    }

    #[test]
    fn test_deserialize_client_message() {
        let record: ClientRecord =
            serde_json::from_str(r#"{"type":"message","to":"bob","text":"hi"}"#).unwrap();
        assert_eq!(
            record,
            ClientRecord::Message {
                to: "bob".to_string(),
                text: "hi".to_string(),
            }
        );
    }

    #[test]
    fn test_message_text_defaults_to_empty() {
        let record: ClientRecord =
            serde_json::from_str(r#"{"type":"message","to":"bob"}"#).unwrap();
        assert_eq!(
            record,
            ClientRecord::Message {
                to: "bob".to_string(),
                text: String::new(),
            }
        );
    }

    #[test]
    fn test_unknown_kind_is_tolerated() {
        let record: ClientRecord =
            serde_json::from_str(r#"{"type":"typing_indicator","to":"bob"}"#).unwrap();
        assert_eq!(record, ClientRecord::Unknown);
    }
}
