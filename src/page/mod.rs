//! The vote page: one vote's candidates, the user's participation, a live
//! voting-period status, and casting a vote.
//!
//! A [`VotePage`] is mounted for a vote code and an [`Identity`]. Mounting
//! fires off the vote and participation loads; once the vote arrives a
//! [`StatusTicker`] keeps the [`VotingPeriodState`] current. Front ends read
//! the page through [`VotePage::view`] and drive it with
//! [`VotePage::select`] and [`VotePage::submit`].

use std::mem;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};
use tokio::{sync::watch, task::JoinHandle};

use crate::api::VoteApi;
use crate::clock::Clock;
use crate::config::Config;
use crate::model::{Identity, Participation, Vote, VotingPeriodState};
use crate::surface::Surface;
use crate::ticker::StatusTicker;

mod loader;
mod submit;
mod view;

pub use submit::SubmitOutcome;
pub use view::{CandidateRow, Countdown, PageView};

/// A mounted vote page. Dropping it unmounts it.
pub struct VotePage {
    inner: Arc<Inner>,
}

/// State shared with the page's background tasks.
struct Inner {
    code: String,
    identity: Identity,
    config: Config,
    api: Arc<dyn VoteApi>,
    surface: Arc<dyn Surface>,
    clock: Arc<dyn Clock>,
    status: Arc<watch::Sender<VotingPeriodState>>,
    fields: Mutex<Fields>,
}

/// The page's local fields. Never locked across an `.await`.
#[derive(Default)]
struct Fields {
    vote: Option<Vote>,
    participation: Participation,
    selected: Option<String>,
    ticker: Option<StatusTicker>,
    /// Loads started by the latest reload.
    loads: Vec<JoinHandle<()>>,
    /// Bumped by every reload; results of older loads are discarded.
    generation: u64,
    unmounted: bool,
}

impl VotePage {
    /// Mount the page for the vote with this `code`, and start loading the
    /// vote and the identity's participation. Must be called from within a
    /// tokio runtime.
    pub fn mount(
        code: impl Into<String>,
        identity: Identity,
        config: Config,
        api: Arc<dyn VoteApi>,
        surface: Arc<dyn Surface>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (status, _) = watch::channel(VotingPeriodState::Loading);
        let inner = Arc::new(Inner {
            code: code.into(),
            identity,
            config,
            api,
            surface,
            clock,
            status: Arc::new(status),
            fields: Mutex::default(),
        });
        info!("Mounting vote page for {}", inner.code);

        let page = Self { inner };
        page.reload();
        page
    }

    /// Fetch the vote and participation again. The vote is replaced
    /// wholesale when it arrives. Loads still in flight from an earlier
    /// reload are cancelled.
    pub fn reload(&self) {
        let mut fields = self.inner.fields();
        for load in fields.loads.drain(..) {
            load.abort();
        }
        fields.generation += 1;
        let generation = fields.generation;
        debug!("Loading {} (generation {generation})", self.inner.code);

        let vote_load = tokio::spawn(Arc::clone(&self.inner).load_vote(generation));
        let participation_load =
            tokio::spawn(Arc::clone(&self.inner).load_participation(generation));
        fields.loads.extend([vote_load, participation_load]);
    }

    /// Wait for every load in flight to finish, successfully or not.
    pub async fn settle(&self) {
        let loads = mem::take(&mut self.inner.fields().loads);
        for load in loads {
            // Cancelled or panicked loads have nothing left to wait for.
            let _ = load.await;
        }
    }

    /// Highlight a candidate for submission. Returns whether the selection
    /// took effect; it does not when the inputs are disabled or the name is
    /// not a candidate of this vote.
    pub fn select(&self, candidate: &str) -> bool {
        let mut fields = self.inner.fields();
        let known = match &fields.vote {
            Some(vote) => vote.candidate(candidate).is_some(),
            None => false,
        };
        if !known || self.inner.inputs_disabled(&fields) {
            debug!("Ignoring selection of {candidate:?}");
            return false;
        }
        fields.selected = Some(candidate.to_string());
        true
    }

    /// The code this page was mounted for.
    pub fn code(&self) -> &str {
        &self.inner.code
    }

    /// The current voting period state.
    pub fn status(&self) -> VotingPeriodState {
        *self.inner.status.borrow()
    }

    /// Watch the voting period state.
    pub fn subscribe(&self) -> watch::Receiver<VotingPeriodState> {
        self.inner.status.subscribe()
    }

    /// The loaded vote, if any.
    pub fn vote(&self) -> Option<Vote> {
        self.inner.fields().vote.clone()
    }

    pub fn participation(&self) -> Participation {
        self.inner.fields().participation.clone()
    }

    pub fn selected(&self) -> Option<String> {
        self.inner.fields().selected.clone()
    }

    /// Whether the status ticker is still running.
    pub fn is_ticking(&self) -> bool {
        self.inner
            .fields()
            .ticker
            .as_ref()
            .map_or(false, StatusTicker::is_running)
    }

    /// Tear the page down, cancelling the ticker and any loads in flight.
    pub fn unmount(self) {
        // Dropping does the work.
    }
}

impl Drop for VotePage {
    fn drop(&mut self) {
        let mut fields = self.inner.fields();
        fields.unmounted = true;
        fields.ticker = None;
        for load in fields.loads.drain(..) {
            load.abort();
        }
        debug!("Unmounted vote page for {}", self.inner.code);
    }
}

impl Inner {
    fn fields(&self) -> MutexGuard<'_, Fields> {
        // A panic while holding the lock cannot leave the fields half-written.
        self.fields
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether this identity published the loaded vote.
    fn is_publisher(&self, fields: &Fields) -> bool {
        fields
            .vote
            .as_ref()
            .map_or(false, |vote| self.identity.is_publisher_of(&vote.publisher))
    }

    /// Candidate inputs are disabled for the publisher and for anyone who
    /// has already voted.
    fn inputs_disabled(&self, fields: &Fields) -> bool {
        self.is_publisher(fields) || fields.participation.has_voted()
    }

    /// Whether the submit control is offered. It is shown while the vote is
    /// still loading.
    fn submit_offered(&self, fields: &Fields) -> bool {
        !self.inputs_disabled(fields) && *self.status.borrow() != VotingPeriodState::Ended
    }

    /// Whether a vote may be cast right now.
    fn can_submit(&self, fields: &Fields) -> bool {
        fields.vote.is_some() && self.submit_offered(fields)
    }

    /// Whether a load started at `generation` may still update the page.
    fn is_current(&self, fields: &Fields, generation: u64) -> bool {
        !fields.unmounted && fields.generation == generation
    }

    /// Replace the vote and restart the ticker for its window.
    fn replace_vote(&self, vote: Vote, generation: u64) {
        let mut fields = self.fields();
        if !self.is_current(&fields, generation) {
            debug!("Discarding superseded load of vote {}", self.code);
            return;
        }

        // Cancel the old ticker before anything else can observe the new vote.
        fields.ticker = None;
        let still_offered = fields
            .selected
            .as_deref()
            .map_or(true, |selected| vote.candidate(selected).is_some());
        if !still_offered {
            fields.selected = None;
        }

        let terminal = self.status.borrow().is_terminal();
        match vote.window() {
            Some((start, end)) if !terminal => {
                fields.ticker = Some(StatusTicker::start(
                    start,
                    end,
                    self.config.schedule(),
                    self.config.tick(),
                    Arc::clone(&self.clock),
                    Arc::clone(&self.status),
                ));
            }
            Some(_) => debug!("Vote {} already ended, not restarting ticker", self.code),
            None => debug!("Vote {} has no voting window", self.code),
        }
        fields.vote = Some(vote);
    }
}
