//! Data models for the message archive
//!
//! This module contains the records read from the message log and the
//! contacts files. All of them are plain values: the query path never
//! writes them back.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Messaging service a message or account belongs to.
///
/// Known services get their own variant; anything else survives a
/// round trip as [`Platform::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Platform {
    /// Skype
    Skype,
    /// ICQ
    Icq,
    /// Internet Relay Chat
    Irc,
    /// Text messages
    Sms,
    /// Jabber / XMPP
    Jabber,
    /// MSN Messenger
    Msn,
    /// Yahoo! Messenger
    Yahoo,
    /// Google Talk / Chat
    Google,
    /// Telegram
    Telegram,
    /// Any service without a dedicated variant
    Other(String),
}

impl Platform {
    /// Wire name of the platform
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Skype => "skype",
            Self::Icq => "icq",
            Self::Irc => "irc",
            Self::Sms => "sms",
            Self::Jabber => "jabber",
            Self::Msn => "msn",
            Self::Yahoo => "yahoo",
            Self::Google => "google",
            Self::Telegram => "telegram",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Platform {
    fn from(value: String) -> Self {
        match value.as_str() {
            "skype" => Self::Skype,
            "icq" => Self::Icq,
            "irc" => Self::Irc,
            "sms" => Self::Sms,
            "jabber" => Self::Jabber,
            "msn" => Self::Msn,
            "yahoo" => Self::Yahoo,
            "google" => Self::Google,
            "telegram" => Self::Telegram,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Platform {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Platform> for String {
    fn from(value: Platform) -> Self {
        match value {
            Platform::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recipient of a message: one user or one group, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageTarget {
    /// Direct message to a user
    User {
        /// Recipient user id
        user_id: String,
    },
    /// Message posted to a group
    Group {
        /// Recipient group id
        group_id: String,
    },
}

impl MessageTarget {
    /// Target a single user
    pub fn user(id: impl Into<String>) -> Self {
        Self::User { user_id: id.into() }
    }

    /// Target a group
    pub fn group(id: impl Into<String>) -> Self {
        Self::Group {
            group_id: id.into(),
        }
    }

    /// The user id when this is a direct message
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::User { user_id } => Some(user_id),
            Self::Group { .. } => None,
        }
    }

    /// The group id when this is a group message
    #[must_use]
    pub fn group_id(&self) -> Option<&str> {
        match self {
            Self::Group { group_id } => Some(group_id),
            Self::User { .. } => None,
        }
    }
}

impl fmt::Display for MessageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User { user_id } => write!(f, "user:{user_id}"),
            Self::Group { group_id } => write!(f, "group:{group_id}"),
        }
    }
}

/// File attached to a message. Only describes the file; the bytes live elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// File name relative to the archive's attachment store
    pub file_name: String,
    /// MIME type
    pub mime_type: String,
}

/// One archived message, as stored on a single line of the log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Service the message was sent over
    pub platform: Platform,
    /// When the message was sent; the log is ordered by this
    #[serde(rename = "ts")]
    pub timestamp: DateTime<FixedOffset>,
    /// Sender user id
    pub from: String,
    /// Recipient
    pub to: MessageTarget,
    /// Message text
    #[serde(default)]
    pub text: String,
    /// Original vendor record, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
    /// Attached files, in the order they were sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
    /// Free-form importer metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<BTreeMap<String, serde_json::Value>>,
}

impl Message {
    /// True when `user_id` sent the message or is its direct recipient
    #[must_use]
    pub fn involves(&self, user_id: &str) -> bool {
        self.from == user_id || self.to.user_id() == Some(user_id)
    }
}

/// Account of a contact on one messaging service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformIdentity {
    /// Account id on the platform; matches `Message::from` and target ids
    pub id: String,
    /// Service the account belongs to
    pub platform: Platform,
    /// Display name on that platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Avatar file reference; written as `null` when unknown
    #[serde(default)]
    pub avatar: Option<String>,
    /// Free-form importer metadata. `null` and `{}` are both kept as read.
    #[serde(default)]
    pub meta: Option<BTreeMap<String, String>>,
}

/// A person and every account they were seen with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Display name; contacts are merged on this exact string
    pub name: String,
    /// Accounts, in the order they were recorded
    #[serde(default, alias = "platform_ids")]
    pub platforms: Vec<PlatformIdentity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_is_tagged() {
        let json = serde_json::to_value(MessageTarget::group("g1")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "group", "group_id": "g1"}));

        let target: MessageTarget =
            serde_json::from_str(r#"{"type":"user","user_id":"alice"}"#).unwrap();
        assert_eq!(target, MessageTarget::user("alice"));
        assert_eq!(target.group_id(), None);
    }

    #[test]
    fn test_target_rejects_unknown_tag() {
        assert!(serde_json::from_str::<MessageTarget>(r#"{"type":"channel","user_id":"x"}"#).is_err());
    }

    #[test]
    fn test_unknown_platform_round_trips() {
        let platform: Platform = serde_json::from_str(r#""kopete""#).unwrap();
        assert_eq!(platform, Platform::Other("kopete".to_string()));
        assert_eq!(serde_json::to_string(&platform).unwrap(), r#""kopete""#);
        assert_eq!(Platform::from("icq"), Platform::Icq);
    }

    #[test]
    fn test_message_decodes_minimal_line() {
        let line = r#"{"platform":"sms","ts":"2009-03-01T18:13:51Z","from":"+359888","to":{"type":"user","user_id":"me"},"text":"hi"}"#;
        let message: Message = serde_json::from_str(line).unwrap();
        assert_eq!(message.platform, Platform::Sms);
        assert!(message.involves("me"));
        assert!(message.involves("+359888"));
        assert!(!message.involves("someone"));
        assert!(message.attachments.is_none());
    }

    #[test]
    fn test_identity_keeps_null_meta_and_empty_avatar_keys() {
        let identity: PlatformIdentity =
            serde_json::from_str(r#"{"id":"1","platform":"skype","avatar":null,"meta":null}"#).unwrap();
        assert_eq!(identity.meta, None);
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["avatar"], serde_json::Value::Null);
        assert!(json.as_object().unwrap().contains_key("meta"));

        let identity: PlatformIdentity =
            serde_json::from_str(r#"{"id":"1","platform":"sms","avatar":null,"meta":{}}"#).unwrap();
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["meta"], serde_json::json!({}));
    }

    #[test]
    fn test_contact_accepts_platform_ids_alias() {
        let contact: Contact = serde_json::from_str(
            r#"{"name":"Al","platform_ids":[{"id":"1","platform":"skype","avatar":"a.png","meta":{"city":"Sofia"}}]}"#,
        )
        .unwrap();
        assert_eq!(contact.platforms.len(), 1);
        assert_eq!(contact.platforms[0].avatar.as_deref(), Some("a.png"));
        assert_eq!(contact.platforms[0].meta.as_ref().unwrap()["city"], "Sofia");
    }
}
