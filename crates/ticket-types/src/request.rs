//! Request and response bodies for the ticket API

use crate::priority::{coerce_priority, PriorityError};
use crate::ticket::{NewTicket, OPEN_STATUS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /tickets`
///
/// Every key is optional. `status` and `owner` are not accepted here: a new
/// ticket always starts open and unowned.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateTicketRequest {
    pub subject: Option<String>,
    pub description: Option<String>,
    pub issue_type: Option<String>,
    pub subcategory: Option<String>,
    /// Raw priority; `None` when the key is absent, `Some(Value::Null)` for
    /// an explicit `null`.
    #[serde(deserialize_with = "present")]
    pub priority: Option<Value>,
}

impl CreateTicketRequest {
    /// Resolve defaults and coerce the priority into an insertable record.
    pub fn into_new_ticket(self, now: DateTime<Utc>) -> Result<NewTicket, PriorityError> {
        let priority = match self.priority {
            Some(ref value) => coerce_priority(value)?,
            None => 0,
        };

        Ok(NewTicket {
            subject: self.subject.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            issue_type: self.issue_type.unwrap_or_default(),
            subcategory: self.subcategory.unwrap_or_default(),
            priority,
            status: OPEN_STATUS.to_string(),
            owner: String::new(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// Body of `PUT /tickets/{id}/claim`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClaimTicketRequest {
    pub owner: Option<String>,
}

/// Body of `PUT /tickets/{id}`
///
/// Each field is tri-state: `None` leaves the column alone, `Some(None)`
/// (explicit `null`) resets it to the column default, `Some(Some(v))` sets it.
/// `priority` keeps the raw JSON value and is coerced when applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateTicketRequest {
    #[serde(deserialize_with = "present")]
    pub priority: Option<Value>,
    #[serde(deserialize_with = "patch")]
    pub status: Option<Option<String>>,
    #[serde(deserialize_with = "patch")]
    pub owner: Option<Option<String>>,
    #[serde(deserialize_with = "patch")]
    pub description: Option<Option<String>>,
}

/// Confirmation body returned by claim and update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn claimed(id: i64) -> Self {
        Self {
            message: format!("Ticket {} claimed.", id),
        }
    }

    pub fn updated(id: i64) -> Self {
        Self {
            message: format!("Ticket {} updated.", id),
        }
    }
}

// Only called when the key is present, so `null` survives as `Value::Null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn patch<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
