pub mod identity;
pub mod participation;
pub mod status;
pub mod vote;

pub use identity::{EmailAddress, Identity};
pub use participation::Participation;
pub use status::VotingPeriodState;
pub use vote::{Candidate, Vote};
