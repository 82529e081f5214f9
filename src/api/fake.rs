use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tokio::time::{self, Duration};

use crate::error::{Error, Result};
use crate::model::{Participation, Vote};

use super::{Submission, VoteApi};

/// A request the fake received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Vote(String),
    Participation(String),
    Participate(Submission),
}

/// What the fake answers for one endpoint.
#[derive(Debug, Clone)]
enum Reply<T> {
    Ok(T),
    NotFound,
    Fail(StatusCode),
}

impl<T: Clone> Reply<T> {
    fn get(&self) -> Result<T> {
        match self {
            Self::Ok(value) => Ok(value.clone()),
            Self::NotFound => Err(Error::NotFound("Vote not found".to_string())),
            Self::Fail(status) => Err(Error::Status(*status, "fake failure".to_string())),
        }
    }
}

#[derive(Debug)]
struct State {
    vote: Reply<Vote>,
    participation: Reply<Option<Value>>,
    participate: Reply<()>,
    latency: Duration,
    calls: Vec<Call>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            vote: Reply::NotFound,
            participation: Reply::Ok(None),
            participate: Reply::Ok(()),
            latency: Duration::ZERO,
            calls: vec![],
        }
    }
}

/// In-memory [`VoteApi`] that records every call. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<State>>,
}

impl FakeApi {
    fn with_state<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn set_vote(&self, vote: Vote) {
        self.with_state(|state| state.vote = Reply::Ok(vote));
    }

    /// Answer vote requests with "not found" again.
    pub fn remove_vote(&self) {
        self.with_state(|state| state.vote = Reply::NotFound);
    }

    pub fn fail_vote(&self, status: StatusCode) {
        self.with_state(|state| state.vote = Reply::Fail(status));
    }

    pub fn set_participation(&self, record: Option<Value>) {
        self.with_state(|state| state.participation = Reply::Ok(record));
    }

    pub fn fail_participation(&self, status: StatusCode) {
        self.with_state(|state| state.participation = Reply::Fail(status));
    }

    pub fn fail_participate(&self, status: StatusCode) {
        self.with_state(|state| state.participate = Reply::Fail(status));
    }

    /// Delay every reply by this long.
    pub fn set_latency(&self, latency: Duration) {
        self.with_state(|state| state.latency = latency);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with_state(|state| state.calls.clone())
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Participate(submission) => Some(submission),
                _ => None,
            })
            .collect()
    }

    /// Log `call` and answer with what the fake was scripted to say when the
    /// request arrived, after the configured latency.
    async fn record<T>(&self, call: Call, reply: impl FnOnce(&State) -> Result<T>) -> Result<T> {
        let (latency, reply) = self.with_state(|state| {
            state.calls.push(call);
            (state.latency, reply(&*state))
        });
        if !latency.is_zero() {
            time::sleep(latency).await;
        }
        reply
    }
}

#[async_trait]
impl VoteApi for FakeApi {
    async fn vote(&self, code: &str) -> Result<Vote> {
        self.record(Call::Vote(code.to_string()), |state| state.vote.get())
            .await
    }

    async fn participation(&self, code: &str) -> Result<Participation> {
        self.record(Call::Participation(code.to_string()), |state| {
            state.participation.get()
        })
        .await
        .map(Participation::from_result)
    }

    async fn participate(&self, submission: &Submission) -> Result<()> {
        self.record(Call::Participate(submission.clone()), |state| {
            state.participate.get()
        })
        .await
    }
}
