// ABOUTME: Serde types for the RTM wire protocol and Web API responses
// ABOUTME: Inbound events, outbound messages, handshake and auxiliary call payloads

use serde::{Deserialize, Serialize};

/// One inbound entry decoded from a streaming frame.
///
/// Every field is defaulted so that arbitrary RTM frames (presence
/// changes, typing indicators, acks) decode without error; the dispatch
/// loop filters on `kind`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
}

/// One outbound entry: same shape as [`Event`] plus the as-self flag and
/// the auth token stamped by the sender on the way out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    #[serde(default)]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: String,
    pub channel: String,
    #[serde(default)]
    pub as_user: bool,
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl OutboundMessage {
    pub fn new(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            kind: "message".to_string(),
            channel: channel.into(),
            as_user: false,
            text: text.into(),
            token: String::new(),
        }
    }

    /// Send the message as the authenticated user rather than the bot.
    pub fn as_self(mut self, as_user: bool) -> Self {
        self.as_user = as_user;
        self
    }
}

/// Response to the `rtm.start` handshake call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "self", default)]
    pub self_identity: SelfIdentity,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SelfIdentity {
    #[serde(default)]
    pub id: String,
}

/// A channel, direct conversation, or group as returned by the Web API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A workspace member as returned by `users.list`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub real_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImOpenResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub channel: Conversation,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MpimOpenResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub group: Conversation,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelListResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub channels: Vec<Conversation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserListResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub members: Vec<Member>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_decodes_message_frame() {
        let json = r#"{"id":3,"type":"message","channel":"C123","user":"U456","text":"hello"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, 3);
        assert_eq!(event.kind, "message");
        assert_eq!(event.channel, "C123");
        assert_eq!(event.user, "U456");
        assert_eq!(event.text, "hello");
    }

    #[test]
    fn test_event_tolerates_unknown_frames() {
        // Presence frames carry none of the message fields
        let json = r#"{"type":"presence_change","presence":"active"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.kind, "presence_change");
        assert!(event.text.is_empty());
    }

    #[test]
    fn test_outbound_message_wire_names() {
        let msg = OutboundMessage {
            token: "xoxb-secret".to_string(),
            id: 7,
            ..OutboundMessage::new("C9", "hi").as_self(true)
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["type"], "message");
        assert_eq!(value["channel"], "C9");
        assert_eq!(value["as_user"], true);
        assert_eq!(value["text"], "hi");
        assert_eq!(value["token"], "xoxb-secret");
    }

    #[test]
    fn test_outbound_message_omits_empty_token() {
        let value = serde_json::to_value(OutboundMessage::new("C1", "x")).unwrap();
        assert!(value.get("token").is_none());
    }

    #[test]
    fn test_connect_response_nested_self() {
        let json = r#"{"ok":true,"url":"wss://example.invalid/ws","self":{"id":"U42"}}"#;
        let resp: ConnectResponse = serde_json::from_str(json).unwrap();
        assert!(resp.ok);
        assert_eq!(resp.url, "wss://example.invalid/ws");
        assert_eq!(resp.self_identity.id, "U42");
    }

    #[test]
    fn test_connect_response_error_field() {
        let json = r#"{"ok":false,"error":"invalid_auth"}"#;
        let resp: ConnectResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.ok);
        assert_eq!(resp.error, "invalid_auth");
    }
}
