//! Database repositories.

#![allow(missing_docs)]

pub mod candidate;
pub mod display_state;
pub mod event;
pub mod event_candidate;
pub mod vote;

pub use candidate::CandidateRepository;
pub use display_state::DisplayStateRepository;
pub use event::EventRepository;
pub use event_candidate::EventCandidateRepository;
pub use vote::VoteRepository;
