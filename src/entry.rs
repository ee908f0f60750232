//! The address-book record and its validation rule.

use crate::error::{ServiceError, ValidationError};
use bson::oid::ObjectId;
use serde::{Deserialize, Deserializer, Serialize};

/// Types that can check their own required fields after decoding.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// One address-book record.
///
/// `id` is `None` until the entry has been persisted. On the wire it is
/// `_id`, omitted when absent; an empty string reads as absent.
///
/// Missing string fields decode as empty so that [`Validate::validate`]
/// reports them instead of the decoder.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Entry {
    #[serde(
        rename = "_id",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl Entry {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Emails are stored lowercase; every write goes through this first.
    pub fn normalize_email(&mut self) {
        self.email = self.email.to_lowercase();
    }
}

impl Validate for Entry {
    /// Checks first name, last name, email and phone, in that order, and
    /// returns the first empty one. Formats and lengths are not checked.
    fn validate(&self) -> Result<(), ValidationError> {
        if self.first_name.is_empty() {
            return Err(ValidationError::Name);
        }
        if self.last_name.is_empty() {
            return Err(ValidationError::Name);
        }
        if self.email.is_empty() {
            return Err(ValidationError::Email);
        }
        if self.phone.is_empty() {
            return Err(ValidationError::Phone);
        }
        Ok(())
    }
}

/// Parse an entry identifier, rejecting anything that is not a 24-digit hex
/// object id.
pub fn parse_id(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id).map_err(|_| ServiceError::InvalidId)
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
