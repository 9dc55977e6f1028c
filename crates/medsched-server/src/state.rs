use std::sync::Arc;

use medsched_auth::{IdentityProvider, SharedIdentityProvider};
use medsched_core::EventBroadcaster;
use medsched_directory::{Directory, SharedDirectory};
use medsched_scheduling::{AppointmentStateMachine, AvailabilityEngine};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub directory: SharedDirectory,
    pub identity: SharedIdentityProvider,
    pub availability: Arc<AvailabilityEngine>,
    pub appointments: Arc<AppointmentStateMachine>,
    pub events: Arc<EventBroadcaster>,
}

impl AppState {
    pub fn new() -> Self {
        let events = EventBroadcaster::new_shared();
        let directory = Directory::new_shared();
        let identity = IdentityProvider::new_shared(directory.clone());
        let availability = AvailabilityEngine::new_shared(events.clone());
        let appointments = AppointmentStateMachine::new_shared(availability.clone(), events.clone());
        Self {
            directory,
            identity,
            availability,
            appointments,
            events,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
