//! # Client Module
//!
//! Customers that sales are recorded against.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::validation::{validate_name, ValidationResult};

/// A stored client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub phone: String,
    /// Day the client was first registered. Set by the store.
    pub registration_date: NaiveDate,
}

/// Input for registering a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

impl NewClient {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        NewClient {
            name: name.into(),
            phone: phone.into(),
        }
    }

    pub fn validate(&self) -> ValidationResult<()> {
        validate_name(&self.name)
    }
}

/// Partial update of a client. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ClientPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none()
    }

    /// A patch must change something, and may not blank the name.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.is_empty() {
            return Err(ValidationError::Empty {
                field: "patch".to_string(),
            });
        }
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        Ok(())
    }
}
