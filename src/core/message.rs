use serde::{Deserialize, Serialize};

use crate::core::constants::WELCOME_ID_PREFIX;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl TryFrom<&str> for Role {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Role::User),
            "model" => Ok(Role::Model),
            _ => Err(format!("invalid message role: {value}")),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub id: String,
}

impl ChatMessage {
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            id: id.into(),
        }
    }

    pub fn model(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
            id: id.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_model(&self) -> bool {
        self.role == Role::Model
    }

    /// The seeded greeting every new session starts with.
    pub fn is_welcome(&self) -> bool {
        self.is_model() && self.id.starts_with(WELCOME_ID_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_as_plain_strings() {
        let message = ChatMessage::model("7", "Grace");
        let json = serde_json::to_string(&message).expect("serialize");
        assert_eq!(json, r#"{"role":"model","content":"Grace","id":"7"}"#);
    }

    #[test]
    fn invalid_roles_are_rejected() {
        let err = serde_json::from_str::<ChatMessage>(r#"{"role":"assistant","content":"","id":"1"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn welcome_detection_uses_id_prefix() {
        assert!(ChatMessage::model("initial-42", "hi").is_welcome());
        assert!(!ChatMessage::model("42", "hi").is_welcome());
        assert!(!ChatMessage::user("initial-42", "hi").is_welcome());
    }
}
