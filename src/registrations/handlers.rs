use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    error::{ApiError, ApiResult},
    registrations::{
        dto::{MessageResponse, RegistrationRequest},
        repo_types::{NewRegistration, Registration},
        validation::validate,
    },
    state::AppState,
};

pub fn registration_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/registrations",
            get(list_registrations).post(create_registration),
        )
        .route(
            "/registrations/:id",
            get(get_registration)
                .put(update_registration)
                .delete(delete_registration),
        )
}

fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>().map_err(|_| {
        warn!(id = %raw, "invalid registration id");
        ApiError::InvalidId
    })
}

/// Decode and validate a create/update body. The content type is not checked;
/// any body that parses as JSON is accepted.
fn parse_payload(body: &[u8]) -> ApiResult<NewRegistration> {
    let req: RegistrationRequest = serde_json::from_slice(body).map_err(|e| {
        warn!(error = %e, "malformed registration payload");
        ApiError::InvalidBody(e.to_string())
    })?;
    validate(req).map_err(|violations| {
        warn!(?violations, "registration payload rejected");
        ApiError::Validation(violations)
    })
}

#[instrument(skip(state, body))]
pub async fn create_registration(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, [(HeaderName, String); 1], Json<Registration>)> {
    let new = parse_payload(&body)?;
    let reg = state
        .store
        .create(&new)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to create registration"))?;

    info!(id = reg.id, "registration created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/registrations/{}", reg.id))],
        Json(reg),
    ))
}

#[instrument(skip(state))]
pub async fn list_registrations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Registration>>> {
    let rows = state
        .store
        .list_all()
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to retrieve registrations"))?;
    Ok(Json(rows))
}

#[instrument(skip(state))]
pub async fn get_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Registration>> {
    let id = parse_id(&id)?;
    let reg = state
        .store
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to retrieve registration"))?;
    Ok(Json(reg))
}

#[instrument(skip(state, body))]
pub async fn update_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<Registration>> {
    let id = parse_id(&id)?;
    let new = parse_payload(&body)?;
    let reg = state
        .store
        .update(id, &new)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to update registration"))?;

    info!(id = reg.id, "registration updated");
    Ok(Json(reg))
}

#[instrument(skip(state))]
pub async fn delete_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    state
        .store
        .delete(id)
        .await
        .map_err(|e| ApiError::from_store(e, "Failed to delete registration"))?;

    info!(id, "registration deleted");
    Ok(Json(MessageResponse {
        message: "Registration deleted successfully",
    }))
}
