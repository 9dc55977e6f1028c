use crate::error::{CoreError, Result};
use uuid::Uuid;

pub fn generate_id() -> Uuid {
    Uuid::new_v4()
}

pub fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| CoreError::validation(format!("invalid id '{id}'")))
}
