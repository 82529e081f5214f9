use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The phase of a vote's lifecycle relative to the current time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VotingPeriodState {
    /// Vote data has not arrived yet.
    #[default]
    #[serde(rename = "STATE_LOADING")]
    Loading,
    /// Voting opens in the future.
    #[serde(rename = "STATE_NOT_STARTED")]
    NotStarted,
    /// Voting is open.
    #[serde(rename = "STATE_STARTED")]
    Started,
    /// Voting has closed. Terminal.
    #[serde(rename = "STATE_ENDED")]
    Ended,
}

impl VotingPeriodState {
    /// Once ended, a vote never changes state again.
    pub fn is_terminal(self) -> bool {
        self == Self::Ended
    }
}

impl Display for VotingPeriodState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Loading => "loading",
            Self::NotStarted => "not started",
            Self::Started => "in progress",
            Self::Ended => "ended",
        };
        f.write_str(text)
    }
}

/// Resolve the state of a vote open over `[start, end)` at instant `now`.
pub fn resolve(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> VotingPeriodState {
    if now < start {
        VotingPeriodState::NotStarted
    } else if now < end {
        VotingPeriodState::Started
    } else {
        VotingPeriodState::Ended
    }
}

/// The next instant at which `resolve` will change its answer, if any.
pub fn next_boundary(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match resolve(start, end, now) {
        VotingPeriodState::NotStarted => Some(start),
        VotingPeriodState::Started => Some(end),
        VotingPeriodState::Ended | VotingPeriodState::Loading => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::clock::test_epoch;

    use super::*;

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let start = test_epoch();
        (start, start + Duration::seconds(60))
    }

    #[test]
    fn before_start_is_not_started() {
        let (start, end) = window();
        for offset in [1, 30, 86_400] {
            let now = start - Duration::seconds(offset);
            assert_eq!(resolve(start, end, now), VotingPeriodState::NotStarted);
        }
        assert_eq!(
            resolve(start, end, start - Duration::milliseconds(1)),
            VotingPeriodState::NotStarted
        );
    }

    #[test]
    fn inside_window_is_started() {
        let (start, end) = window();
        for offset in [0, 1, 30, 59] {
            let now = start + Duration::seconds(offset);
            assert_eq!(resolve(start, end, now), VotingPeriodState::Started);
        }
        assert_eq!(
            resolve(start, end, end - Duration::milliseconds(1)),
            VotingPeriodState::Started
        );
    }

    #[test]
    fn at_or_after_end_is_ended() {
        let (start, end) = window();
        for offset in [60, 61, 3_600] {
            let now = start + Duration::seconds(offset);
            assert_eq!(resolve(start, end, now), VotingPeriodState::Ended);
            // Re-evaluating a terminal state yields the same state.
            assert_eq!(resolve(start, end, now), VotingPeriodState::Ended);
        }
    }

    #[test]
    fn start_instant_is_started() {
        let (start, end) = window();
        assert_eq!(resolve(start, end, start), VotingPeriodState::Started);
    }

    #[test]
    fn end_instant_is_ended() {
        // A strict "after end" check would leave this instant STARTED for one
        // more tick; the window is half-open, so it is ENDED.
        let (start, end) = window();
        assert_eq!(resolve(start, end, end), VotingPeriodState::Ended);
    }

    #[test]
    fn inverted_window_never_starts() {
        let (start, end) = window();
        assert_eq!(resolve(end, start, start), VotingPeriodState::NotStarted);
        assert_eq!(resolve(end, start, end), VotingPeriodState::Ended);
    }

    #[test]
    fn boundaries() {
        let (start, end) = window();
        assert_eq!(
            next_boundary(start, end, start - Duration::seconds(5)),
            Some(start)
        );
        assert_eq!(next_boundary(start, end, start), Some(end));
        assert_eq!(next_boundary(start, end, end), None);
    }

    #[test]
    fn serialized_names() {
        assert_eq!(
            serde_json::to_string(&VotingPeriodState::NotStarted).unwrap(),
            "\"STATE_NOT_STARTED\""
        );
        assert!(VotingPeriodState::Ended.is_terminal());
        assert!(!VotingPeriodState::Loading.is_terminal());
    }
}
