//! Ticket handlers

use crate::error::ApiError;
use crate::extractors::JsonBody;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use ticket_types::{
    ClaimTicketRequest, CreateTicketRequest, MessageResponse, Ticket, UpdateTicketRequest,
};

/// Path ids must be plain non-negative integers; anything else is an unknown ticket.
fn parse_ticket_id(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    raw.parse().map_err(|_| ApiError::NotFound)
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Ticket>>, ApiError> {
    Ok(Json(state.tickets.list().await?))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let ticket = state.tickets.create(req).await?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

pub async fn claim(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ClaimTicketRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_ticket_id(&id)?;
    state.tickets.claim(id, req).await?;
    Ok(Json(MessageResponse::claimed(id)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateTicketRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = parse_ticket_id(&id)?;
    state.tickets.update(id, req).await?;
    Ok(Json(MessageResponse::updated(id)))
}

/// `PUT` under `/tickets/owner/...` names a non-integer ticket id.
pub async fn unknown_ticket() -> ApiError {
    ApiError::NotFound
}

pub async fn list_by_owner(
    State(state): State<AppState>,
    Path(owner): Path<String>,
) -> Result<Json<Vec<Ticket>>, ApiError> {
    Ok(Json(state.tickets.list_by_owner(&owner).await?))
}
