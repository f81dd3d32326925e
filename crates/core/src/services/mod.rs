//! Business logic services.

#![allow(missing_docs)]

pub mod event;
pub mod results;
pub mod session;

pub use event::{CreateEventInput, EventService};
pub use results::{
    CandidateResult, CandidateSummary, CurrentCandidate, DisplayPayload, EventResults,
    GroupTally, ResultsService, Tally, TimerInfo, Verdict,
};
pub use session::{
    AdmittedVote, AdvanceOutcome, EventLocks, SessionService, StartedTimer, VoterIdentity,
};
