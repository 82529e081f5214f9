use serde::{Deserialize, Serialize};

/// The signed-in user, as supplied by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Email addresses; the first one identifies the user.
    pub emails: Vec<EmailAddress>,
    /// Candidate the session provider associates with this user, if any.
    #[serde(default)]
    pub candidate: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    pub value: String,
}

impl Identity {
    /// An identity with a single email address.
    pub fn from_email(email: impl Into<String>) -> Self {
        Self {
            emails: vec![EmailAddress {
                value: email.into(),
            }],
            candidate: None,
        }
    }

    /// The email address this identity is known by.
    pub fn primary_email(&self) -> Option<&str> {
        self.emails.first().map(|email| email.value.as_str())
    }

    /// Whether this identity published the vote with the given publisher email.
    pub fn is_publisher_of(&self, publisher: &str) -> bool {
        self.primary_email() == Some(publisher)
    }
}
