//! Database entities.

#![allow(missing_docs)]

pub mod candidate;
pub mod display_state;
pub mod event;
pub mod event_candidate;
pub mod vote;

pub use candidate::Entity as Candidate;
pub use display_state::Entity as DisplayState;
pub use event::Entity as Event;
pub use event_candidate::Entity as EventCandidate;
pub use vote::Entity as Vote;
