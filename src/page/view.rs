use std::fmt::{Display, Formatter};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::clock::duration_until;
use crate::model::VotingPeriodState;

use super::VotePage;

/// Everything a front end needs to draw the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub title: Option<String>,
    pub status: VotingPeriodState,
    /// Present once the vote is loaded, if it has a voting window.
    pub countdown: Option<Countdown>,
    /// Placeholder content while the voting period is still unknown.
    pub skeleton: bool,
    /// "You have already voted" banner.
    pub already_voted: bool,
    /// "The publisher cannot vote" banner.
    pub publisher_notice: bool,
    pub candidates: Vec<CandidateRow>,
    pub submit_visible: bool,
}

/// One selectable candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRow {
    pub name: String,
    pub votes: f64,
    pub checked: bool,
    pub disabled: bool,
}

/// Time left until the next phase of the vote.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Countdown {
    Loading,
    UntilStart(Duration),
    UntilEnd(Duration),
    Ended,
}

impl Countdown {
    pub fn new(
        status: VotingPeriodState,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        match status {
            VotingPeriodState::Loading => Self::Loading,
            VotingPeriodState::NotStarted => Self::UntilStart(duration_until(start, now)),
            VotingPeriodState::Started => Self::UntilEnd(duration_until(end, now)),
            VotingPeriodState::Ended => Self::Ended,
        }
    }
}

impl Display for Countdown {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loading => write!(f, "Loading..."),
            Self::UntilStart(remaining) => write!(f, "Voting starts in {}", Remaining(*remaining)),
            Self::UntilEnd(remaining) => write!(f, "Voting ends in {}", Remaining(*remaining)),
            Self::Ended => write!(f, "Voting has ended"),
        }
    }
}

/// `Dd HH:MM:SS`, with the day count only when non-zero.
struct Remaining(Duration);

impl Display for Remaining {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let total = self.0.as_secs();
        let (days, rest) = (total / 86_400, total % 86_400);
        let (hours, minutes, seconds) = (rest / 3_600, rest % 3_600 / 60, rest % 60);
        if days > 0 {
            write!(f, "{days}d ")?;
        }
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

impl Display for PageView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(title) = &self.title {
            writeln!(f, "{title}")?;
        }
        if let Some(countdown) = &self.countdown {
            writeln!(f, "{countdown}")?;
        }
        if self.skeleton {
            writeln!(f, "░░░░░░░░░░░░")?;
        }
        if self.already_voted {
            writeln!(f, "You have already voted.")?;
        }
        for row in &self.candidates {
            let mark = match (row.checked, row.disabled) {
                (true, _) => "(•)",
                (false, true) => "(-)",
                (false, false) => "( )",
            };
            writeln!(f, "{mark} {:<24} {:>6.1}", row.name, row.votes)?;
        }
        if self.submit_visible {
            writeln!(f, "[ Submit ]")?;
        }
        if self.publisher_notice {
            writeln!(f, "The publisher of a vote cannot vote on it.")?;
        }
        Ok(())
    }
}

impl VotePage {
    /// Snapshot the page for rendering.
    pub fn view(&self) -> PageView {
        let inner = &self.inner;
        let fields = inner.fields();
        let status = *inner.status.borrow();
        let now = inner.clock.now();

        let disabled = inner.inputs_disabled(&fields);
        let vote = fields.vote.as_ref();
        let candidates = vote
            .map(|vote| {
                vote.candidates
                    .iter()
                    .map(|candidate| CandidateRow {
                        name: candidate.name.clone(),
                        votes: candidate.votes,
                        checked: fields.selected.as_deref() == Some(candidate.name.as_str()),
                        disabled,
                    })
                    .collect()
            })
            .unwrap_or_default();

        PageView {
            title: vote.map(|vote| vote.title.clone()),
            status,
            countdown: vote
                .and_then(|vote| vote.window())
                .map(|(start, end)| Countdown::new(status, start, end, now)),
            skeleton: status == VotingPeriodState::Loading,
            already_voted: fields.participation.has_voted(),
            publisher_notice: inner.is_publisher(&fields),
            candidates,
            submit_visible: inner.submit_offered(&fields),
        }
    }
}
