//! API middleware.

#![allow(missing_docs)]

use votehall_core::{EventService, ResultsService, SessionService};

use crate::registry::ConnectionRegistry;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub event_service: EventService,
    pub session_service: SessionService,
    pub results_service: ResultsService,
    pub registry: ConnectionRegistry,
}
