//! Turn and session identity types.
//!
//! These are the value objects that flow through the whole system:
//! a user message arrives at the gateway, becomes a [`Turn`], is woven into a
//! prompt, and the provider's answer is stored back as another [`Turn`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Opaque identifier for a session (caller-supplied or generated).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Use the caller's identifier, or generate one when it is absent or blank.
    pub fn resolve(requested: Option<&str>) -> Self {
        match requested {
            Some(id) if !id.trim().is_empty() => Self(id.to_string()),
            _ => Self::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The student asking
    User,
    /// The generated answer
    Assistant,
}

impl Role {
    /// Label used when a turn is rendered into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        }
    }
}

/// Academic subject a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    #[serde(alias = "physics")]
    Physics,
    #[serde(alias = "chemistry")]
    Chemistry,
    #[serde(alias = "mathematics", alias = "maths", alias = "math")]
    Mathematics,
    #[serde(alias = "biology")]
    Biology,
}

impl Subject {
    /// Every supported subject, in the order advertised to clients.
    pub const ALL: [Subject; 4] = [
        Subject::Physics,
        Subject::Chemistry,
        Subject::Mathematics,
        Subject::Biology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subject::Physics => "Physics",
            Subject::Chemistry => "Chemistry",
            Subject::Mathematics => "Mathematics",
            Subject::Biology => "Biology",
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "physics" => Ok(Subject::Physics),
            "chemistry" => Ok(Subject::Chemistry),
            "mathematics" | "maths" | "math" => Ok(Subject::Mathematics),
            "biology" => Ok(Subject::Biology),
            other => Err(format!(
                "unknown subject '{other}' (expected Physics, Chemistry, Mathematics or Biology)"
            )),
        }
    }
}

/// One message in a session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,

    /// The message content
    pub text: String,

    pub subject: Option<Subject>,

    /// Creation instant; serialized under the short `ts` key
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new user turn stamped with the current time.
    pub fn user(text: impl Into<String>, subject: Option<Subject>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            subject,
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant turn stamped with the current time.
    pub fn assistant(text: impl Into<String>, subject: Option<Subject>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            subject,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_turn() {
        let turn = Turn::user("What is inertia?", Some(Subject::Physics));
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.text, "What is inertia?");
        assert_eq!(turn.subject, Some(Subject::Physics));
    }

    #[test]
    fn turn_serializes_with_wire_keys() {
        let turn = Turn::assistant("F = ma", None);
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["text"], "F = ma");
        assert!(json["subject"].is_null());
        assert!(json["ts"].is_string());
        assert!(json.get("timestamp").is_none());
    }

    #[test]
    fn subject_accepts_lowercase_on_the_wire() {
        let s: Subject = serde_json::from_str("\"chemistry\"").unwrap();
        assert_eq!(s, Subject::Chemistry);
        let s: Subject = serde_json::from_str("\"Biology\"").unwrap();
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"Biology\"");
        assert!(serde_json::from_str::<Subject>("\"History\"").is_err());
    }

    #[test]
    fn subject_from_str() {
        assert_eq!("Maths".parse::<Subject>().unwrap(), Subject::Mathematics);
        assert_eq!(" physics ".parse::<Subject>().unwrap(), Subject::Physics);
        assert!("astrology".parse::<Subject>().is_err());
    }

    #[test]
    fn session_id_resolution() {
        assert_eq!(SessionId::resolve(Some("abc")).as_str(), "abc");

        let generated = SessionId::resolve(None);
        assert!(Uuid::parse_str(generated.as_str()).is_ok());

        let blank = SessionId::resolve(Some(""));
        assert!(Uuid::parse_str(blank.as_str()).is_ok());
    }

    #[test]
    fn role_labels_are_uppercase() {
        assert_eq!(Role::User.label(), "USER");
        assert_eq!(Role::Assistant.label(), "ASSISTANT");
    }
}
