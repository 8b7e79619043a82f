use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use tracing::info;

use shared::{
    AdminValentinesResponse, DeleteValentineResponse, SendCardRequest, SendCardResponse,
    StatsResponse, UpdateMessageRequest, UpdateValentineResponse, UserResponse,
};

use crate::error::AppError;
use crate::AppState;

/// All API routes, nested under `/api` by the caller
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/send", post(send_card))
        .route("/user/:id", get(get_user))
        .route("/admin/valentines", get(admin_list_valentines))
        .route(
            "/admin/valentines/:id",
            put(admin_update_valentine).delete(admin_delete_valentine),
        )
        .route("/admin/stats", get(admin_stats))
}

/// Axum handler for POST /api/send
pub async fn send_card(
    State(state): State<AppState>,
    Json(request): Json<SendCardRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!(recipient = %request.recipient_id, "POST /api/send");

    let valentine = state.card_service.send(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(SendCardResponse {
            success: true,
            valentine,
        }),
    ))
}

/// Axum handler for GET /api/user/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    info!("GET /api/user/{}", id);

    let response = state.profile_service.profile(&id, Utc::now())?;
    Ok(Json(response))
}

/// Axum handler for GET /api/admin/valentines
pub async fn admin_list_valentines(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminValentinesResponse>, AppError> {
    require_admin(&state, &headers)?;
    info!("GET /api/admin/valentines");

    let valentines = state.card_service.admin_list()?;
    Ok(Json(AdminValentinesResponse { valentines }))
}

/// Axum handler for PUT /api/admin/valentines/:id
pub async fn admin_update_valentine(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateMessageRequest>,
) -> Result<Json<UpdateValentineResponse>, AppError> {
    require_admin(&state, &headers)?;
    info!("PUT /api/admin/valentines/{}", id);

    let valentine = state.card_service.admin_update_message(&id, &request.message)?;
    Ok(Json(UpdateValentineResponse {
        success: true,
        valentine,
    }))
}

/// Axum handler for DELETE /api/admin/valentines/:id
pub async fn admin_delete_valentine(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteValentineResponse>, AppError> {
    require_admin(&state, &headers)?;
    info!("DELETE /api/admin/valentines/{}", id);

    state.card_service.admin_delete(&id)?;
    Ok(Json(DeleteValentineResponse {
        success: true,
        deleted_id: id,
    }))
}

/// Axum handler for GET /api/admin/stats
pub async fn admin_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, AppError> {
    require_admin(&state, &headers)?;
    info!("GET /api/admin/stats");

    let stats = state.card_service.stats(Utc::now())?;
    Ok(Json(stats))
}

/// Admin endpoints require a bearer token when one is configured
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = &state.admin_token else {
        return Ok(());
    };

    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if provided == Some(expected.as_str()) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}
