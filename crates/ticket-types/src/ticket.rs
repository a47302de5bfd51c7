//! Ticket types

use crate::priority::{coerce_priority, PriorityError};
use crate::request::UpdateTicketRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status assigned to every newly created ticket
pub const OPEN_STATUS: &str = "open";

/// Status a ticket moves to when claimed
pub const ACKNOWLEDGED_STATUS: &str = "acknowledged";

/// Owner recorded when a claim names nobody
pub const UNASSIGNED_OWNER: &str = "Unassigned";

/// A support ticket as stored and returned by the API
///
/// `status` and `owner` are free-form text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    pub subject: String,
    pub description: String,
    pub issue_type: String,
    pub subcategory: String,
    pub priority: i64,
    pub status: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A ticket that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTicket {
    pub subject: String,
    pub description: String,
    pub issue_type: String,
    pub subcategory: String,
    pub priority: i64,
    pub status: String,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewTicket {
    pub fn with_id(self, id: i64) -> Ticket {
        Ticket {
            id,
            subject: self.subject,
            description: self.description,
            issue_type: self.issue_type,
            subcategory: self.subcategory,
            priority: self.priority,
            status: self.status,
            owner: self.owner,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Ticket {
    /// Assign the ticket and move it to acknowledged, whatever its status was.
    pub fn claim(&mut self, owner: Option<String>, now: DateTime<Utc>) {
        self.owner = owner.unwrap_or_else(|| UNASSIGNED_OWNER.to_string());
        self.status = ACKNOWLEDGED_STATUS.to_string();
        self.touch(now);
    }

    /// Overwrite the supplied fields. Nothing changes if the priority is invalid.
    pub fn apply_update(
        &mut self,
        update: UpdateTicketRequest,
        now: DateTime<Utc>,
    ) -> Result<(), PriorityError> {
        let priority = match update.priority {
            Some(Value::Null) => Some(0),
            Some(ref value) => Some(coerce_priority(value)?),
            None => None,
        };

        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(status) = update.status {
            self.status = status.unwrap_or_else(|| OPEN_STATUS.to_string());
        }
        if let Some(owner) = update.owner {
            self.owner = owner.unwrap_or_default();
        }
        if let Some(description) = update.description {
            self.description = description.unwrap_or_default();
        }

        self.touch(now);
        Ok(())
    }

    /// Refresh `updated_at` without ever moving it backwards
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.updated_at {
            self.updated_at = now;
        }
    }
}
