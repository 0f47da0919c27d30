use serde::{Deserialize, Serialize};

/// Prefix marking machine-generated chat entries, e.g. upload notices posted
/// into a thread by the backend.
pub const EVENT_PREFIX: &str = "HUDDLE_EVENT:";

/// One chat entry in a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
    /// Epoch seconds.
    #[serde(default)]
    pub created_at: Option<i64>,
}

impl Message {
    /// Decode the event payload carried by `HUDDLE_EVENT:` messages.
    /// Returns `None` for ordinary messages and for malformed payloads,
    /// which then render as plain text.
    pub fn system_event(&self) -> Option<SystemEvent> {
        let raw = self.content.strip_prefix(EVENT_PREFIX)?;
        serde_json::from_str(raw).ok()
    }
}

/// Payload of an event message. `created_at`/`ts` are epoch seconds; the
/// backend has used both names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<i64>,
    #[serde(default)]
    pub ts: Option<i64>,
}

impl SystemEvent {
    pub const FILE_UPLOAD: &'static str = "file_upload";

    /// Best available timestamp, epoch seconds.
    pub fn timestamp(&self) -> Option<i64> {
        self.created_at.or(self.ts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(content: &str) -> Message {
        Message {
            id: "m1".to_string(),
            role: "system".to_string(),
            content: content.to_string(),
            user_name: None,
            agent_name: None,
            created_at: None,
        }
    }

    #[test]
    fn test_event_payload_decoded() {
        let m = message(
            r#"HUDDLE_EVENT:{"type":"file_upload","filename":"report.pdf","user_name":"Ana","created_at":1700000000}"#,
        );
        let evt = m.system_event().expect("event should decode");
        assert_eq!(evt.kind, SystemEvent::FILE_UPLOAD);
        assert_eq!(evt.filename.as_deref(), Some("report.pdf"));
        assert_eq!(evt.timestamp(), Some(1700000000));
    }

    #[test]
    fn test_ts_fallback_when_created_at_missing() {
        let m = message(r#"HUDDLE_EVENT:{"type":"file_upload","ts":1700000001}"#);
        let evt = m.system_event().unwrap();
        assert_eq!(evt.timestamp(), Some(1700000001));
    }

    #[test]
    fn test_plain_message_is_not_an_event() {
        assert!(message("hello there").system_event().is_none());
    }

    #[test]
    fn test_malformed_event_payload_ignored() {
        assert!(message("HUDDLE_EVENT:{not json").system_event().is_none());
    }
}
