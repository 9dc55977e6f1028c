use dashmap::DashMap;
use medsched_core::{CoreError, Person, Result, Role};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Input for creating a directory record.
///
/// `password_hash` must already be hashed by the identity layer; the
/// directory never sees plaintext credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPerson {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub password_hash: String,
}

/// Concurrent in-memory directory of Person records.
///
/// Keyed by person id, with email uniqueness enforced on insert. Identity
/// fields are immutable once created.
#[derive(Debug, Default)]
pub struct Directory {
    persons: DashMap<Uuid, Person>,
}

impl Directory {
    pub fn new() -> Self {
        Self {
            persons: DashMap::new(),
        }
    }

    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Create a new person record.
    ///
    /// Fails with `Validation` on missing name/email and with `Conflict` when
    /// the email is already registered.
    pub fn create(&self, new: NewPerson) -> Result<Person> {
        let name = new.name.trim();
        let email = new.email.trim().to_lowercase();
        if name.is_empty() {
            return Err(CoreError::validation("name must not be empty"));
        }
        if email.is_empty() || !email.contains('@') {
            return Err(CoreError::validation(format!("invalid email '{email}'")));
        }
        if self.find_by_email(&email).is_some() {
            return Err(CoreError::conflict(format!("email '{email}' already registered")));
        }

        let person = Person {
            id: medsched_core::generate_id(),
            name: name.to_string(),
            email,
            phone: new.phone,
            role: new.role,
            specialties: if new.role == Role::Practitioner {
                new.specialties
            } else {
                Vec::new()
            },
            password_hash: new.password_hash,
        };
        tracing::debug!(person_id = %person.id, role = %person.role, "person created");
        self.persons.insert(person.id, person.clone());
        Ok(person)
    }

    pub fn get(&self, id: Uuid) -> Result<Person> {
        self.persons
            .get(&id)
            .map(|p| p.clone())
            .ok_or_else(|| CoreError::not_found("Person", id.to_string()))
    }

    /// Look up a practitioner specifically, rejecting ids of other roles.
    pub fn get_practitioner(&self, id: Uuid) -> Result<Person> {
        let person = self.get(id)?;
        if person.role != Role::Practitioner {
            return Err(CoreError::not_found("Practitioner", id.to_string()));
        }
        Ok(person)
    }

    pub fn get_patient(&self, id: Uuid) -> Result<Person> {
        let person = self.get(id)?;
        if person.role != Role::Patient {
            return Err(CoreError::not_found("Patient", id.to_string()));
        }
        Ok(person)
    }

    pub fn find_by_email(&self, email: &str) -> Option<Person> {
        let email = email.trim().to_lowercase();
        self.persons
            .iter()
            .find(|entry| entry.email == email)
            .map(|entry| entry.clone())
    }

    /// All practitioners, optionally filtered by specialty substring.
    pub fn list_practitioners(&self, specialty: Option<&str>) -> Vec<Person> {
        let mut out: Vec<Person> = self
            .persons
            .iter()
            .filter(|p| p.role == Role::Practitioner)
            .filter(|p| specialty.is_none_or(|s| p.has_specialty(s)))
            .map(|p| p.clone())
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    pub fn list_patients(&self) -> Vec<Person> {
        let mut out: Vec<Person> = self
            .persons
            .iter()
            .filter(|p| p.role == Role::Patient)
            .map(|p| p.clone())
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_person(role: Role, email: &str) -> NewPerson {
        NewPerson {
            name: "Test Person".into(),
            email: email.into(),
            phone: None,
            role,
            specialties: vec!["Cardiology".into()],
            password_hash: "hash".into(),
        }
    }

    #[test]
    fn test_create_and_get() {
        let dir = Directory::new();
        let created = dir.create(new_person(Role::Patient, "pat@example.com")).unwrap();
        let fetched = dir.get(created.id).unwrap();
        assert_eq!(fetched.email, "pat@example.com");
        assert!(fetched.specialties.is_empty(), "patients carry no specialties");
    }

    #[test]
    fn test_email_uniqueness() {
        let dir = Directory::new();
        dir.create(new_person(Role::Patient, "dup@example.com")).unwrap();
        let err = dir
            .create(new_person(Role::Practitioner, "DUP@example.com"))
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn test_rejects_invalid_input() {
        let dir = Directory::new();
        let mut bad = new_person(Role::Patient, "ok@example.com");
        bad.name = "  ".into();
        assert!(matches!(dir.create(bad).unwrap_err(), CoreError::Validation(_)));

        let bad = new_person(Role::Patient, "not-an-email");
        assert!(matches!(dir.create(bad).unwrap_err(), CoreError::Validation(_)));
    }

    #[test]
    fn test_list_practitioners_by_specialty() {
        let dir = Directory::new();
        dir.create(new_person(Role::Practitioner, "a@example.com")).unwrap();
        let mut ortho = new_person(Role::Practitioner, "b@example.com");
        ortho.specialties = vec!["Orthopedics".into()];
        dir.create(ortho).unwrap();
        dir.create(new_person(Role::Patient, "c@example.com")).unwrap();

        assert_eq!(dir.list_practitioners(None).len(), 2);
        assert_eq!(dir.list_practitioners(Some("ortho")).len(), 1);
        assert_eq!(dir.list_practitioners(Some("dermatology")).len(), 0);
        assert_eq!(dir.list_patients().len(), 1);
    }

    #[test]
    fn test_role_checked_lookup() {
        let dir = Directory::new();
        let p = dir.create(new_person(Role::Patient, "p@example.com")).unwrap();
        assert!(dir.get_patient(p.id).is_ok());
        assert!(matches!(
            dir.get_practitioner(p.id).unwrap_err(),
            CoreError::NotFound { .. }
        ));
    }
}
