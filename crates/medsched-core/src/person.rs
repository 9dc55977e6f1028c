use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assumed by an authenticated user.
///
/// Every core operation receives the acting role explicitly; there is no
/// ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Patient,
    Practitioner,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "PATIENT",
            Role::Practitioner => "PRACTITIONER",
            Role::Admin => "ADMIN",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directory record: patient, practitioner or administrator.
///
/// Identity is immutable once created; only contact fields may be edited.
/// The password hash lives next to the record but never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
    /// Practitioner specialties; empty for patients and admins.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub specialties: Vec<String>,
    #[serde(skip)]
    pub password_hash: String,
}

impl Person {
    pub fn is_practitioner(&self) -> bool {
        self.role == Role::Practitioner
    }

    /// Case-insensitive match against any of the practitioner's specialties.
    pub fn has_specialty(&self, specialty: &str) -> bool {
        let needle = specialty.to_lowercase();
        self.specialties
            .iter()
            .any(|s| s.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn practitioner() -> Person {
        Person {
            id: crate::id::generate_id(),
            name: "Dr. Ana Cardoso".into(),
            email: "ana@clinic.example".into(),
            phone: None,
            role: Role::Practitioner,
            specialties: vec!["Cardiology".into(), "General Practice".into()],
            password_hash: String::new(),
        }
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Patient).unwrap(), "\"PATIENT\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"PRACTITIONER\"").unwrap(),
            Role::Practitioner
        );
    }

    #[test]
    fn test_has_specialty_case_insensitive() {
        let p = practitioner();
        assert!(p.has_specialty("cardio"));
        assert!(p.has_specialty("GENERAL"));
        assert!(!p.has_specialty("orthopedics"));
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let mut p = practitioner();
        p.password_hash = "secret".into();
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password"));
    }
}
