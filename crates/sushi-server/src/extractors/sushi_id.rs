//! Path id extractor for `/sushi/:id` routes

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};

/// A sushi id taken from the request path
///
/// Only `[A-Za-z0-9_]+` is accepted; any other segment is answered with 404
/// as if the route didn't exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SushiId(pub String);

impl SushiId {
    pub fn is_valid(id: &str) -> bool {
        !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SushiId
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if !Self::is_valid(&id) {
            return Err(StatusCode::NOT_FOUND.into_response());
        }

        Ok(SushiId(id))
    }
}
