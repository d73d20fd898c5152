//! Message author roles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// The human participant.
    User,
    /// A conversational agent.
    Bot,
}

impl MessageRole {
    /// Return the role as stored in `fastapi_messages.role`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MessageRole {
    type Err = compliance_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "bot" => Ok(Self::Bot),
            _ => Err(compliance_core::AppError::validation(format!(
                "Invalid message role: '{s}'. Expected one of: user, bot"
            ))),
        }
    }
}
