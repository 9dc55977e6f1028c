//! Identity and authorization for the MedSched server.
//!
//! Two concerns live here, both consumed by the scheduling core and the HTTP
//! layer:
//!
//! - [`IdentityProvider`]: credential verification and opaque bearer-token
//!   sessions. The core only ever sees the resulting `(id, role)` pair.
//! - [`policy::permit`]: the single pure decision function encoding who may
//!   perform which scheduling action.

pub mod context;
pub mod credentials;
pub mod policy;
pub mod session;

pub use context::AuthContext;
pub use credentials::{hash_password, verify_password};
pub use policy::{Action, permit};
pub use session::{IdentityProvider, Session};

/// Type alias for a shareable identity provider.
pub type SharedIdentityProvider = std::sync::Arc<IdentityProvider>;
