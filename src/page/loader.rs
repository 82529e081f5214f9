use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::model::Participation;

use super::Inner;

impl Inner {
    /// Fetch the vote. A vote the backend does not know sends the user home;
    /// any other failure is only logged.
    pub(super) async fn load_vote(self: Arc<Self>, generation: u64) {
        match self.api.vote(&self.code).await {
            Ok(vote) => {
                info!(
                    "Loaded vote {} ({} candidates)",
                    self.code,
                    vote.candidates.len()
                );
                self.replace_vote(vote, generation);
            }
            Err(err) if err.is_not_found() => {
                if !self.is_current(&self.fields(), generation) {
                    debug!("Discarding superseded answer for vote {}", self.code);
                    return;
                }
                warn!("Vote {} does not exist, returning home", self.code);
                self.surface.navigate_home();
            }
            Err(err) => error!("Failed to load vote {}: {err}", self.code),
        }
    }

    /// Fetch whether the identity has already voted. On failure the previous
    /// answer stands.
    pub(super) async fn load_participation(self: Arc<Self>, generation: u64) {
        match self.api.participation(&self.code).await {
            Ok(participation) => {
                match &participation {
                    Participation::Voted(record) => {
                        debug!("Already voted on {}: {record}", self.code)
                    }
                    Participation::NotVoted => debug!("Not yet voted on {}", self.code),
                }
                let mut fields = self.fields();
                if self.is_current(&fields, generation) {
                    fields.participation = participation;
                }
            }
            Err(err) => error!("Failed to load participation in {}: {err}", self.code),
        }
    }
}
