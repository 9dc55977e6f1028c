use medsched_core::{Person, Role};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated actor, threaded explicitly through every core operation.
///
/// Only `(id, role)` matters to the scheduling core; everything else about the
/// identity stays in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub person_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn new(person_id: Uuid, role: Role) -> Self {
        Self { person_id, role }
    }
}

impl From<&Person> for AuthContext {
    fn from(person: &Person) -> Self {
        Self {
            person_id: person.id,
            role: person.role,
        }
    }
}
