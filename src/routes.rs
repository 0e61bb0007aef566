//! Thin axum handlers: decode the payload, delegate to the core, encode the
//! outcome. All policy lives in [`crate::rsvp`] and [`crate::registry`].
use std::sync::Arc;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    error::AppError,
    models::{PartyView, Purchase, Submission},
    registry, rsvp,
    state::AppState,
};

#[derive(Deserialize)]
pub struct SearchPayload {
    name: String,
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SearchPayload>,
) -> Result<Json<PartyView>, AppError> {
    let view = rsvp::search_party(state.directory.as_ref(), &payload.name).await?;

    Ok(Json(view))
}

#[derive(Serialize)]
pub struct SubmitResponse {
    success: bool,
    guests_updated: usize,
}

pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<Submission>,
) -> Result<Json<SubmitResponse>, AppError> {
    let guests_updated = rsvp::submit_rsvp(state.directory.as_ref(), &submission).await?;

    Ok(Json(SubmitResponse {
        success: true,
        guests_updated,
    }))
}

#[derive(Deserialize)]
pub struct PurchasePayload {
    id: String,
    name: String,
    email: Option<String>,
    message: Option<String>,
}

pub async fn mark_purchased_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PurchasePayload>,
) -> Result<Json<Value>, AppError> {
    let purchase = Purchase {
        name: payload.name,
        email: payload.email,
        message: payload.message,
    };
    registry::mark_purchased(state.registry.as_ref(), &payload.id, &purchase).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Item marked as purchased",
    })))
}

pub async fn shipping_address_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let value = registry::shipping_address(state.registry.as_ref()).await?;

    Ok(Json(value))
}
