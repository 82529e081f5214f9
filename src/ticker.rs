use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, trace};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, Duration, MissedTickBehavior},
};

use crate::clock::{duration_until, Clock};
use crate::config::Schedule;
use crate::model::status::{next_boundary, resolve, VotingPeriodState};

/// Shortest sleep in boundary mode, so a wake just short of the boundary
/// cannot spin.
const MIN_BOUNDARY_SLEEP: Duration = Duration::from_millis(1);

/// A background task that keeps a vote's `VotingPeriodState` current.
///
/// The state is evaluated as soon as the ticker starts, then again on every
/// tick (or at every boundary). Once `Ended` is published the task exits by
/// itself. Dropping the ticker cancels it.
pub struct StatusTicker {
    task_handle: JoinHandle<()>,
}

impl StatusTicker {
    /// Start tracking the window `[start, end)`, publishing into `status`.
    pub fn start(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        schedule: Schedule,
        tick: Duration,
        clock: Arc<dyn Clock>,
        status: Arc<watch::Sender<VotingPeriodState>>,
    ) -> Self {
        debug!("Starting status ticker for {start} .. {end} ({schedule:?})");
        let task_handle = tokio::spawn(async move {
            match schedule {
                Schedule::Tick => {
                    let mut interval = time::interval(tick);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    loop {
                        // The first tick completes immediately.
                        interval.tick().await;
                        if publish(&status, resolve(start, end, clock.now())).is_terminal() {
                            break;
                        }
                    }
                }
                Schedule::Boundary => loop {
                    let now = clock.now();
                    if publish(&status, resolve(start, end, now)).is_terminal() {
                        break;
                    }
                    if let Some(boundary) = next_boundary(start, end, now) {
                        let wait = duration_until(boundary, now).max(MIN_BOUNDARY_SLEEP);
                        trace!("Sleeping {wait:?} until {boundary}");
                        time::sleep(wait).await;
                    }
                },
            }
            debug!("Vote has ended, status ticker stopped");
        });

        Self { task_handle }
    }

    /// Cancel the ticker. Harmless if it already stopped.
    pub fn cancel(&self) {
        self.task_handle.abort();
    }

    /// Whether the ticker is still scheduled to re-evaluate.
    pub fn is_running(&self) -> bool {
        !self.task_handle.is_finished()
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.task_handle.abort();
    }
}

/// Publish `state` unless the current state is terminal, and return the
/// state now in effect. Receivers are only woken by an actual change.
fn publish(
    status: &watch::Sender<VotingPeriodState>,
    state: VotingPeriodState,
) -> VotingPeriodState {
    status.send_if_modified(|current| {
        if current.is_terminal() || *current == state {
            return false;
        }
        debug!("Voting period is now {state}");
        *current = state;
        true
    });
    *status.borrow()
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use crate::clock::{test_epoch, TokioClock};

    use super::*;

    fn channel() -> (
        Arc<watch::Sender<VotingPeriodState>>,
        watch::Receiver<VotingPeriodState>,
    ) {
        let (sender, receiver) = watch::channel(VotingPeriodState::Loading);
        (Arc::new(sender), receiver)
    }

    /// Record every published state until the channel reports `Ended`.
    async fn states_until_ended(
        receiver: &mut watch::Receiver<VotingPeriodState>,
    ) -> Vec<VotingPeriodState> {
        let mut seen = vec![];
        while receiver.changed().await.is_ok() {
            let state = *receiver.borrow();
            seen.push(state);
            if state.is_terminal() {
                break;
            }
        }
        seen
    }

    #[page_test]
    async fn evaluates_immediately(clock: TokioClock) {
        let (sender, mut receiver) = channel();
        let start = test_epoch() - ChronoDuration::seconds(30);
        let end = test_epoch() + ChronoDuration::seconds(30);
        let _ticker = StatusTicker::start(
            start,
            end,
            Schedule::Tick,
            Duration::from_secs(1),
            Arc::new(clock),
            sender,
        );

        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), VotingPeriodState::Started);
        // No time has passed.
        assert_eq!(clock.now(), test_epoch());
    }

    #[page_test]
    async fn ticks_through_whole_lifecycle(clock: TokioClock) {
        let (sender, mut receiver) = channel();
        let start = test_epoch() + ChronoDuration::seconds(5);
        let end = start + ChronoDuration::seconds(60);
        let ticker = StatusTicker::start(
            start,
            end,
            Schedule::Tick,
            Duration::from_secs(1),
            Arc::new(clock),
            sender,
        );

        let seen = states_until_ended(&mut receiver).await;
        assert_eq!(
            seen,
            vec![
                VotingPeriodState::NotStarted,
                VotingPeriodState::Started,
                VotingPeriodState::Ended
            ]
        );
        // Ended exactly on the first tick at or after `end`.
        assert_eq!(clock.now(), end);

        // The ticker stops by itself once the vote has ended.
        time::sleep(Duration::from_secs(1)).await;
        assert!(!ticker.is_running());
    }

    #[page_test]
    async fn boundary_mode_wakes_only_at_boundaries(clock: TokioClock) {
        let (sender, mut receiver) = channel();
        let start = test_epoch() + ChronoDuration::seconds(5);
        let end = start + ChronoDuration::hours(2);
        let _ticker = StatusTicker::start(
            start,
            end,
            Schedule::Boundary,
            Duration::from_secs(1),
            Arc::new(clock),
            sender,
        );

        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), VotingPeriodState::NotStarted);
        assert_eq!(clock.now(), test_epoch());

        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), VotingPeriodState::Started);
        assert_eq!(clock.now(), start);

        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), VotingPeriodState::Ended);
        assert_eq!(clock.now(), end);
    }

    #[page_test]
    async fn ended_is_never_overwritten(clock: TokioClock) {
        let (sender, mut receiver) = channel();
        sender.send_replace(VotingPeriodState::Ended);
        receiver.borrow_and_update();

        // A window that is open right now.
        let ticker = StatusTicker::start(
            test_epoch() - ChronoDuration::seconds(1),
            test_epoch() + ChronoDuration::seconds(60),
            Schedule::Tick,
            Duration::from_secs(1),
            Arc::new(clock),
            sender.clone(),
        );
        time::sleep(Duration::from_secs(5)).await;

        assert!(!receiver.has_changed().unwrap());
        assert_eq!(*sender.borrow(), VotingPeriodState::Ended);
        assert!(!ticker.is_running());
    }

    #[page_test]
    async fn cancel_stops_publishing(clock: TokioClock) {
        let (sender, mut receiver) = channel();
        let start = test_epoch() + ChronoDuration::seconds(10);
        let ticker = StatusTicker::start(
            start,
            start + ChronoDuration::seconds(10),
            Schedule::Tick,
            Duration::from_secs(1),
            Arc::new(clock),
            sender,
        );
        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), VotingPeriodState::NotStarted);

        ticker.cancel();
        time::sleep(Duration::from_secs(30)).await;
        assert!(!ticker.is_running());
        assert_eq!(*receiver.borrow(), VotingPeriodState::NotStarted);
    }
}
