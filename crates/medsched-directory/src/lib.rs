//! In-memory person directory for the MedSched server.
//!
//! Holds practitioner, patient and administrator records behind a concurrent
//! map. The scheduling core reads only identity and specialty metadata from
//! here; credential verification lives in `medsched-auth`.

mod store;

pub use store::{Directory, NewPerson};

/// Type alias for a shareable directory instance.
pub type SharedDirectory = std::sync::Arc<Directory>;
