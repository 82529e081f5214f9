use log::{debug, error, info};

use crate::api::Submission;
use crate::surface::Notification;

use super::VotePage;

const NO_SELECTION: &str = "Please choose a candidate first";
const SUBMITTED: &str = "Your vote has been recorded";

/// What happened to a submission attempt.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing was selected; the user was told, nothing was sent.
    Rejected,
    /// A candidate was selected but voting is no longer possible (already
    /// voted or vote ended); nothing was sent.
    Disallowed,
    /// The vote was cast and the user sent home.
    Submitted,
    /// The backend refused or could not be reached. The selection is kept.
    Failed,
}

impl VotePage {
    /// Cast the selected candidate as the identity's vote. Without a
    /// selection the user is asked to choose one, whatever state the page
    /// is in.
    pub async fn submit(&self) -> SubmitOutcome {
        let inner = &self.inner;
        let (selected, allowed) = {
            let fields = inner.fields();
            (fields.selected.clone(), inner.can_submit(&fields))
        };
        let Some(candidate) = selected else {
            inner
                .surface
                .notify(Notification::Validation(NO_SELECTION.to_string()));
            return SubmitOutcome::Rejected;
        };
        if !allowed {
            debug!("Not submitting {candidate:?} in {}", inner.code);
            return SubmitOutcome::Disallowed;
        }
        let submission = Submission {
            candidate,
            code: inner.code.clone(),
        };

        match inner.api.participate(&submission).await {
            Ok(()) => {
                info!("Voted for {} in {}", submission.candidate, submission.code);
                inner
                    .surface
                    .notify(Notification::Success(SUBMITTED.to_string()));
                inner.surface.navigate_home();
                SubmitOutcome::Submitted
            }
            Err(err) => {
                error!("Failed to submit vote in {}: {err}", submission.code);
                SubmitOutcome::Failed
            }
        }
    }
}
