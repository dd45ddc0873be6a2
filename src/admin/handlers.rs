use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    db,
    error::{AppError, AppResult},
    listing::NewListing,
    state::AppState,
};

use super::template;

// ── Views ─────────────────────────────────────────────────────────────────────

pub async fn get_panel(State(state): State<AppState>) -> AppResult<Response> {
    let listings = db::list_active(&state.db).await?;
    Ok(Html(template::panel(&listings, None).into_string()).into_response())
}

pub async fn get_trash(State(state): State<AppState>) -> AppResult<Response> {
    let listings = db::list_trash(&state.db).await?;
    Ok(Html(template::trash(&listings).into_string()).into_response())
}

// ── Actions ───────────────────────────────────────────────────────────────────

pub async fn post_create(
    State(state): State<AppState>,
    Form(form): Form<NewListing>,
) -> AppResult<Response> {
    let draft = match form.validate() {
        Ok(d) => d,
        Err(AppError::Validation(msg)) => {
            let listings = db::list_active(&state.db).await?;
            return Ok((
                StatusCode::BAD_REQUEST,
                Html(template::panel(&listings, Some(&msg)).into_string()),
            )
                .into_response());
        }
        Err(e) => return Err(e),
    };

    let id = db::create_listing(&state.db, &draft).await?;
    tracing::info!("Created listing {}", id);
    Ok(Redirect::to("/admin/panel").into_response())
}

pub async fn post_trash(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let changed = db::trash_listing(&state.db, id).await?;
    tracing::info!("Trash listing {}: changed={}", id, changed);
    Ok(Redirect::to("/admin/panel"))
}

pub async fn post_restore(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let changed = db::restore_listing(&state.db, id).await?;
    tracing::info!("Restore listing {}: changed={}", id, changed);
    Ok(Redirect::to("/admin/trash"))
}

pub async fn post_purge(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Redirect> {
    let removed = db::purge_listing(&state.db, id).await?;
    tracing::info!("Purge listing {}: removed={}", id, removed);
    Ok(Redirect::to("/admin/trash"))
}
