//! Sushi handlers
//!
//! Bodies are decoded by hand so any content type is accepted, and every
//! failure is answered with a JSON string message.

use crate::extractors::SushiId;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use sushi_core::Sushi;

const NOT_FOUND: &str = "Sushi Not found";
const BAD_BODY: &str = "Error unmarshalling request body";
const CREATE_FAILED: &str = "Can't create a sushi";

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(message)).into_response()
}

fn empty(status: StatusCode) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")]).into_response()
}

pub async fn list(State(state): State<AppState>) -> Response {
    match state.getting.get_sushis().await {
        Ok(sushis) => Json(sushis).into_response(),
        Err(_) => message(StatusCode::INTERNAL_SERVER_ERROR, "Can't list sushis"),
    }
}

pub async fn get(State(state): State<AppState>, SushiId(id): SushiId) -> Response {
    match state.getting.get_sushi_by_id(&id).await {
        Ok(sushi) => Json::<Sushi>(sushi).into_response(),
        Err(e) if e.is_not_found() => message(StatusCode::NOT_FOUND, NOT_FOUND),
        Err(_) => message(StatusCode::INTERNAL_SERVER_ERROR, "Can't get a sushi"),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddSushiRequest {
    #[serde(alias = "ID")]
    id: String,
    #[serde(default)]
    image_number: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    ingredients: Vec<String>,
}

pub async fn create(State(state): State<AppState>, body: Bytes) -> Response {
    let req: AddSushiRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!("Invalid create body: {}", e);
            return message(StatusCode::INTERNAL_SERVER_ERROR, BAD_BODY);
        }
    };

    // Ids the path extractor would refuse could never be read back
    if !SushiId::is_valid(&req.id) {
        tracing::warn!("Rejected sushi with invalid id {:?}", req.id);
        return message(StatusCode::INTERNAL_SERVER_ERROR, CREATE_FAILED);
    }

    match state
        .adding
        .add_sushi(&req.id, &req.image_number, &req.name, req.ingredients)
        .await
    {
        Ok(()) => empty(StatusCode::CREATED),
        Err(e) => {
            tracing::error!("Failed to create sushi {}: {}", req.id, e);
            message(StatusCode::INTERNAL_SERVER_ERROR, CREATE_FAILED)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifySushiRequest {
    #[serde(default)]
    image_number: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    ingredients: Vec<String>,
}

pub async fn modify(
    State(state): State<AppState>,
    SushiId(id): SushiId,
    body: Bytes,
) -> Response {
    let req: ModifySushiRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            tracing::warn!("Invalid modify body: {}", e);
            return message(StatusCode::INTERNAL_SERVER_ERROR, BAD_BODY);
        }
    };

    match state
        .modifying
        .modify_sushi(&id, &req.image_number, &req.name, req.ingredients)
        .await
    {
        Ok(()) => empty(StatusCode::NO_CONTENT),
        Err(e) => {
            tracing::error!("Failed to modify sushi {}: {}", id, e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Can't modify a sushi")
        }
    }
}

pub async fn remove(State(state): State<AppState>, SushiId(id): SushiId) -> Response {
    match state.removing.remove_sushi(&id).await {
        Ok(()) => empty(StatusCode::NO_CONTENT),
        Err(e) => {
            tracing::error!("Failed to remove sushi {}: {}", id, e);
            message(StatusCode::INTERNAL_SERVER_ERROR, "Can't remove a sushi")
        }
    }
}
