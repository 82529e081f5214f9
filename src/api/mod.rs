use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{Participation, Vote};

mod http;

#[cfg(test)]
mod fake;

pub use http::HttpVoteApi;

#[cfg(test)]
pub use fake::{Call, FakeApi};

/// Request body for casting a vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Name of the chosen candidate.
    pub candidate: String,
    /// Code of the vote being cast on.
    pub code: String,
}

/// The voting backend.
#[async_trait]
pub trait VoteApi: Send + Sync + 'static {
    /// Fetch a vote by its code. A vote the backend does not know yields
    /// [`crate::error::Error::NotFound`].
    async fn vote(&self, code: &str) -> Result<Vote>;

    /// Fetch the current identity's participation in the vote with this code.
    async fn participation(&self, code: &str) -> Result<Participation>;

    /// Cast a vote for the current identity.
    async fn participate(&self, submission: &Submission) -> Result<()>;
}
