use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A vote as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    /// Code identifying the vote; also the page's route parameter.
    #[serde(default)]
    pub code: String,
    /// Vote title.
    #[serde(default)]
    pub title: String,
    /// Email of the identity that created the vote.
    pub publisher: String,
    /// Voting opens at this instant.
    #[serde(default)]
    pub start_date_time: Option<DateTime<Utc>>,
    /// Voting closes at this instant.
    #[serde(default)]
    pub end_date_time: Option<DateTime<Utc>>,
    /// Candidates, in display order.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl Vote {
    /// The voting window, if the vote carries both ends of it.
    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.start_date_time?, self.end_date_time?))
    }

    /// Look up a candidate by name.
    pub fn candidate(&self, name: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.name == name)
    }
}

/// A single option within a vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Candidate name, unique within its vote.
    pub name: String,
    /// Display vote count.
    #[serde(default)]
    pub votes: f64,
}
