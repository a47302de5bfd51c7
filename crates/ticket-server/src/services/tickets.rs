//! Ticket service
//!
//! Claim and update are a single read-then-write against the table with no
//! locking: two writers racing on one ticket resolve as last-writer-wins.

use crate::error::ApiError;
use crate::storage::Database;
use chrono::Utc;
use std::sync::Arc;
use ticket_types::{ClaimTicketRequest, CreateTicketRequest, Ticket, UpdateTicketRequest};
use tracing::{debug, info};

pub struct TicketService {
    db: Arc<Database>,
}

impl TicketService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<Ticket>, ApiError> {
        Ok(self.db.list_tickets().await?)
    }

    pub async fn list_by_owner(&self, owner: &str) -> Result<Vec<Ticket>, ApiError> {
        debug!("Listing tickets for owner {:?}", owner);
        Ok(self.db.list_tickets_by_owner(owner).await?)
    }

    pub async fn create(&self, request: CreateTicketRequest) -> Result<Ticket, ApiError> {
        let new_ticket = request.into_new_ticket(Utc::now())?;
        let ticket = self.db.insert_ticket(new_ticket).await?;

        info!(
            "Created ticket {}: subject={:?}, priority={}",
            ticket.id, ticket.subject, ticket.priority
        );
        Ok(ticket)
    }

    pub async fn claim(&self, id: i64, request: ClaimTicketRequest) -> Result<Ticket, ApiError> {
        let mut ticket = self.db.get_ticket(id).await?.ok_or(ApiError::NotFound)?;

        ticket.claim(request.owner, Utc::now());
        self.save(&ticket).await?;

        info!("Ticket {} claimed by {:?}", ticket.id, ticket.owner);
        Ok(ticket)
    }

    pub async fn update(&self, id: i64, request: UpdateTicketRequest) -> Result<Ticket, ApiError> {
        let mut ticket = self.db.get_ticket(id).await?.ok_or(ApiError::NotFound)?;

        ticket.apply_update(request, Utc::now())?;
        self.save(&ticket).await?;

        info!("Ticket {} updated", ticket.id);
        Ok(ticket)
    }

    async fn save(&self, ticket: &Ticket) -> Result<(), ApiError> {
        // Tickets are never deleted, so a miss here means the id never existed
        if self.db.save_ticket(ticket).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ticket_types::{ACKNOWLEDGED_STATUS, UNASSIGNED_OWNER};

    async fn service() -> TicketService {
        let db = Database::in_memory().await.unwrap();
        db.init_schema().await.unwrap();
        TicketService::new(Arc::new(db))
    }

    fn create_request(body: serde_json::Value) -> CreateTicketRequest {
        serde_json::from_value(body).unwrap()
    }

    fn update_request(body: serde_json::Value) -> UpdateTicketRequest {
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn test_create_with_no_fields() {
        let service = service().await;
        let ticket = service.create(CreateTicketRequest::default()).await.unwrap();

        assert_eq!(ticket.subject, "");
        assert_eq!(ticket.description, "");
        assert_eq!(ticket.issue_type, "");
        assert_eq!(ticket.subcategory, "");
        assert_eq!(ticket.priority, 0);
        assert_eq!(ticket.status, "open");
        assert_eq!(ticket.owner, "");
        assert_eq!(ticket.created_at, ticket.updated_at);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_priority_without_inserting() {
        let service = service().await;
        let result = service
            .create(create_request(json!({"priority": "high"})))
            .await;

        assert!(matches!(result, Err(ApiError::InvalidPriority(_))));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_claim_overrides_status_and_refreshes_timestamp() {
        let service = service().await;
        let created = service.create(CreateTicketRequest::default()).await.unwrap();
        service
            .update(created.id, update_request(json!({"status": "resolved"})))
            .await
            .unwrap();

        let claimed = service
            .claim(created.id, ClaimTicketRequest::default())
            .await
            .unwrap();

        assert_eq!(claimed.owner, UNASSIGNED_OWNER);
        assert_eq!(claimed.status, ACKNOWLEDGED_STATUS);
        assert_eq!(claimed.created_at, created.created_at);
        assert!(claimed.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_only_touches_supplied_fields() {
        let service = service().await;
        let created = service
            .create(create_request(json!({
                "subject": "Email bounce",
                "description": "Outlook",
                "issue_type": "software",
                "subcategory": "Email",
                "priority": 1
            })))
            .await
            .unwrap();

        service
            .update(created.id, update_request(json!({"priority": 5})))
            .await
            .unwrap();

        let stored = service.list().await.unwrap().remove(0);
        assert_eq!(stored.priority, 5);
        assert_eq!(stored.subject, created.subject);
        assert_eq!(stored.description, created.description);
        assert_eq!(stored.issue_type, created.issue_type);
        assert_eq!(stored.subcategory, created.subcategory);
        assert_eq!(stored.status, created.status);
        assert_eq!(stored.owner, created.owner);
        assert_eq!(stored.created_at, created.created_at);
        assert!(stored.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_without_fields_only_refreshes_timestamp() {
        let service = service().await;
        let created = service
            .create(create_request(json!({"subject": "Monitor flicker", "priority": 3})))
            .await
            .unwrap();

        let updated = service
            .update(created.id, UpdateTicketRequest::default())
            .await
            .unwrap();

        assert_eq!(updated.subject, created.subject);
        assert_eq!(updated.priority, created.priority);
        assert_eq!(updated.status, created.status);
        assert_eq!(updated.owner, created.owner);
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found_and_not_created() {
        let service = service().await;

        let claim = service.claim(999_999, ClaimTicketRequest::default()).await;
        assert!(matches!(claim, Err(ApiError::NotFound)));

        let update = service
            .update(999_999, update_request(json!({"status": "closed"})))
            .await;
        assert!(matches!(update, Err(ApiError::NotFound)));

        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_by_owner_after_one_claim() {
        let service = service().await;
        let mut ids = Vec::new();
        for subject in ["one", "two", "three"] {
            let ticket = service
                .create(create_request(json!({"subject": subject})))
                .await
                .unwrap();
            ids.push(ticket.id);
        }

        service
            .claim(
                ids[1],
                ClaimTicketRequest {
                    owner: Some("alice".to_string()),
                },
            )
            .await
            .unwrap();

        let owned = service.list_by_owner("alice").await.unwrap();
        assert_eq!(owned.len(), 1);
        assert_eq!(owned[0].id, ids[1]);
        assert!(service.list_by_owner("bob").await.unwrap().is_empty());
    }
}
