use axum::{
    Json, Router,
    extract::{FromRequest, Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    db,
    error::{AppError, AppResult},
    listing::{Listing, NewListing},
    session::{self, AdminSession, Session},
    state::AppState,
};

// ── Router ────────────────────────────────────────────────────────────────────

/// JSON API. Admin-only handlers take an [`AdminSession`] argument, which
/// answers 401 before the handler runs.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(post_login))
        .route("/api/admin/logout", post(post_logout))
        .route("/api/admin/me", get(get_me))
        .route("/api/ships", get(list_ships).post(create_ship))
        .route("/api/ships/trash", get(list_trash))
        .route("/api/ships/{id}", get(get_ship))
        .route("/api/ships/{id}/trash", patch(trash_ship))
        .route("/api/ships/{id}/restore", patch(restore_ship))
        .route("/api/ships/{id}/permanent", delete(purge_ship))
}

/// JSON request body whose rejections answer with an `{"error": ..}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
struct ApiJson<T>(T);

/// Listing ids arrive as raw path segments; anything non-numeric names no listing.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

#[derive(Serialize)]
struct Success {
    success: bool,
}

// ── Admin auth ────────────────────────────────────────────────────────────────

#[derive(Default, Deserialize)]
#[serde(default)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn post_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    let token = match state.guard.authenticate(&body.username, &body.password).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!("Failed admin login for {:?}", body.username);
            return Err(e);
        }
    };
    tracing::info!("Admin logged in");

    Ok((
        [(header::SET_COOKIE, session::session_cookie(&token))],
        Json(Success { success: true }),
    )
        .into_response())
}

async fn post_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    for token in session::extract_session_cookies(&headers) {
        state.guard.revoke(&token).await;
    }
    (
        [(header::SET_COOKIE, session::clear_session_cookie())],
        Json(Success { success: true }),
    )
        .into_response()
}

async fn get_me(session: Session) -> Json<serde_json::Value> {
    Json(json!({ "authenticated": session.is_admin() }))
}

// ── Listings ──────────────────────────────────────────────────────────────────

async fn list_ships(State(state): State<AppState>) -> AppResult<Json<Vec<Listing>>> {
    Ok(Json(db::list_active(&state.db).await?))
}

async fn list_trash(
    _admin: AdminSession,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Listing>>> {
    Ok(Json(db::list_trash(&state.db).await?))
}

async fn get_ship(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Listing>> {
    let id = parse_id(&id).ok_or(AppError::NotFound)?;
    Ok(Json(db::get_listing(&state.db, id).await?))
}

async fn create_ship(
    _admin: AdminSession,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<NewListing>,
) -> AppResult<Json<serde_json::Value>> {
    let draft = body.validate()?;
    let id = db::create_listing(&state.db, &draft).await?;
    tracing::info!("Created listing {}", id);
    Ok(Json(json!({ "id": id })))
}

async fn trash_ship(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Success>> {
    let Some(id) = parse_id(&id) else {
        return Ok(Json(Success { success: false }));
    };
    let success = db::trash_listing(&state.db, id).await?;
    tracing::info!("Trash listing {}: changed={}", id, success);
    Ok(Json(Success { success }))
}

async fn restore_ship(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Success>> {
    let Some(id) = parse_id(&id) else {
        return Ok(Json(Success { success: false }));
    };
    let success = db::restore_listing(&state.db, id).await?;
    tracing::info!("Restore listing {}: changed={}", id, success);
    Ok(Json(Success { success }))
}

async fn purge_ship(
    _admin: AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Success>> {
    let Some(id) = parse_id(&id) else {
        return Ok(Json(Success { success: false }));
    };
    let success = db::purge_listing(&state.db, id).await?;
    tracing::info!("Purge listing {}: removed={}", id, success);
    Ok(Json(Success { success }))
}
