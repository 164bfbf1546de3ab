//! Conversation threads and their messages.
//!
//! On disk a thread is a JSON array of single-key objects: `[{"Mom": "hi"}, {"Me": "hey"}]`.
//! The key is the sender's display name (or [`OUTGOING_SENDER`] for messages sent from the inbox)
//! and the value is the message body. Anything else fails to deserialize.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// Sender key for messages appended through the inbox.
pub const OUTGOING_SENDER: &str = "Me";

/// A single message: sender name and body. Serialized as `{ sender: body }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub sender: String,
    pub body: String,
}

impl Message {
    pub fn new(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            body: body.into(),
        }
    }

    /// Message from the inbox owner (`{"Me": body}`).
    pub fn outgoing(body: impl Into<String>) -> Self {
        Self::new(OUTGOING_SENDER, body)
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.sender, &self.body)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        if map.len() != 1 {
            return Err(de::Error::invalid_length(map.len(), &"an object with exactly one sender"));
        }
        let Some((sender, value)) = map.into_iter().next() else {
            return Err(de::Error::invalid_length(0, &"an object with exactly one sender"));
        };
        match value {
            serde_json::Value::String(body) => Ok(Self { sender, body }),
            other => Err(de::Error::custom(format!(
                "message body for {} must be a string, got {}",
                sender, other
            ))),
        }
    }
}

/// Ordered messages of one conversation.
///
/// Position 0 is the preview message. Appends go to the tail, so the preview is the first
/// stored message rather than the latest one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Thread(Vec<Message>);

impl Thread {
    pub fn new(messages: Vec<Message>) -> Self {
        Self(messages)
    }

    /// The message shown in listing views.
    pub fn preview(&self) -> Option<&Message> {
        self.0.first()
    }

    pub fn push(&mut self, message: Message) {
        self.0.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.0
    }
}

impl From<Vec<Message>> for Thread {
    fn from(messages: Vec<Message>) -> Self {
        Self(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_key_messages_in_order() {
        let t: Thread =
            serde_json::from_str(r#"[{"Mom":"Hello there"},{"Me":"hi"},{"Mom":"dinner?"}]"#)
                .unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(t.preview(), Some(&Message::new("Mom", "Hello there")));
        assert_eq!(t.messages()[1], Message::outgoing("hi"));
    }

    #[test]
    fn serializes_compactly_as_array_of_objects() {
        let t = Thread::new(vec![Message::new("Mom", "a"), Message::outgoing("b")]);
        assert_eq!(
            serde_json::to_string(&t).unwrap(),
            r#"[{"Mom":"a"},{"Me":"b"}]"#
        );
    }

    #[test]
    fn rejects_multi_key_and_empty_objects() {
        assert!(serde_json::from_str::<Thread>(r#"[{"a":"x","b":"y"}]"#).is_err());
        assert!(serde_json::from_str::<Thread>(r#"[{}]"#).is_err());
    }

    #[test]
    fn rejects_non_string_bodies_and_non_arrays() {
        assert!(serde_json::from_str::<Thread>(r#"[{"Mom":3}]"#).is_err());
        assert!(serde_json::from_str::<Thread>(r#"{"Mom":"hi"}"#).is_err());
    }

    #[test]
    fn empty_thread_has_no_preview() {
        let t: Thread = serde_json::from_str("[]").unwrap();
        assert!(t.is_empty());
        assert!(t.preview().is_none());
    }
}
