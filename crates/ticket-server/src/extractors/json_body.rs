//! Lenient JSON body extractor
//!
//! Every request body in this API is an object of optional keys, so an empty
//! body or a bare `null` is read as `{}`. The Content-Type header is not
//! checked.

use crate::error::ApiError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::InvalidBody(e.body_text()))?;

        parse_body(&bytes).map(JsonBody)
    }
}

fn parse_body<T>(bytes: &[u8]) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
    if value.is_null() {
        return Ok(T::default());
    }

    serde_json::from_value(value).map_err(|e| ApiError::InvalidBody(e.to_string()))
}
