mod handlers;
mod template;

use axum::{
    Form, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;

use crate::{
    session::{self, Session},
    state::AppState,
};

// ── Router ────────────────────────────────────────────────────────────────────

/// Server-rendered admin pages under `/admin/*`.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/admin", get(|| async { Redirect::to("/admin/panel") }))
        .route("/admin/", get(|| async { Redirect::to("/admin/panel") }))
        .route("/admin/login", get(get_login).post(post_login))
        .route("/admin/logout", post(post_logout));

    let protected = Router::new()
        .route("/admin/panel", get(handlers::get_panel))
        .route("/admin/trash", get(handlers::get_trash))
        .route("/admin/ships", post(handlers::post_create))
        .route("/admin/ships/{id}/trash", post(handlers::post_trash))
        .route("/admin/ships/{id}/restore", post(handlers::post_restore))
        .route("/admin/ships/{id}/purge", post(handlers::post_purge))
        .route_layer(middleware::from_fn_with_state(state, session::require_admin_page));

    Router::new().merge(public).merge(protected)
}

// ── Login / logout ────────────────────────────────────────────────────────────

async fn get_login(session: Session) -> Response {
    if session.is_admin() {
        return Redirect::to("/admin/panel").into_response();
    }
    Html(template::login_page(None).into_string()).into_response()
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn post_login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match state.guard.authenticate(&form.username, &form.password).await {
        Ok(token) => {
            tracing::info!("Admin logged in");
            (
                StatusCode::SEE_OTHER,
                [
                    (header::SET_COOKIE, session::session_cookie(&token)),
                    (header::LOCATION, "/admin/panel".to_string()),
                ],
            )
                .into_response()
        }
        Err(_) => {
            tracing::warn!("Failed admin login for {:?}", form.username);
            (
                StatusCode::UNAUTHORIZED,
                Html(template::login_page(Some("Invalid username or password.")).into_string()),
            )
                .into_response()
        }
    }
}

async fn post_logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    for tok in session::extract_session_cookies(&headers) {
        state.guard.revoke(&tok).await;
    }
    (
        StatusCode::SEE_OTHER,
        [
            (header::SET_COOKIE, session::clear_session_cookie()),
            (header::LOCATION, "/admin/login".to_string()),
        ],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn app() -> Router {
        crate::app(AppState::for_tests().await)
    }

    fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::get(uri);
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(Body::empty()).unwrap()
    }

    async fn login(app: &Router) -> String {
        let resp = app
            .clone()
            .oneshot(form_post("/admin/login", "username=captain&password=s3cret", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/admin/panel");
        let set = resp.headers()[header::SET_COOKIE].to_str().unwrap();
        set.split(';').next().unwrap().to_string()
    }

    async fn body_text(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn pages_redirect_anonymous_to_login() {
        let app = app().await;
        for uri in ["/admin/panel", "/admin/trash"] {
            let resp = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert!(resp.status().is_redirection(), "{uri}");
            assert_eq!(resp.headers()[header::LOCATION], "/admin/login");
        }
        let resp = app
            .clone()
            .oneshot(form_post("/admin/ships/1/purge", "", Some("admin_session=forged")))
            .await
            .unwrap();
        assert_eq!(resp.headers()[header::LOCATION], "/admin/login");
    }

    #[tokio::test]
    async fn login_page_redirects_when_signed_in() {
        let app = app().await;
        let resp = app.clone().oneshot(get("/admin/login", None)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let cookie = login(&app).await;
        let resp = app.clone().oneshot(get("/admin/login", Some(&cookie))).await.unwrap();
        assert!(resp.status().is_redirection());
        assert_eq!(resp.headers()[header::LOCATION], "/admin/panel");
    }

    #[tokio::test]
    async fn wrong_password_rerenders_login() {
        let app = app().await;
        let resp = app
            .clone()
            .oneshot(form_post("/admin/login", "username=captain&password=x", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(resp).await.contains("Invalid username or password."));
    }

    #[tokio::test]
    async fn panel_manages_listings() {
        let app = app().await;
        let cookie = login(&app).await;

        let resp = app
            .clone()
            .oneshot(form_post(
                "/admin/ships",
                "title=Seawolf&price=9000&year=1985&image=images%2Fwolf.jpg&type=Trawler",
                Some(&cookie),
            ))
            .await
            .unwrap();
        assert_eq!(resp.headers()[header::LOCATION], "/admin/panel");

        let panel = body_text(app.clone().oneshot(get("/admin/panel", Some(&cookie))).await.unwrap()).await;
        assert!(panel.contains("Seawolf"));
        assert!(panel.contains("/images/wolf.jpg"));

        let resp = app
            .clone()
            .oneshot(form_post("/admin/ships/1/trash", "", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(resp.headers()[header::LOCATION], "/admin/panel");
        let panel = body_text(app.clone().oneshot(get("/admin/panel", Some(&cookie))).await.unwrap()).await;
        assert!(!panel.contains("Seawolf"));
        let trash = body_text(app.clone().oneshot(get("/admin/trash", Some(&cookie))).await.unwrap()).await;
        assert!(trash.contains("Seawolf"));

        app.clone()
            .oneshot(form_post("/admin/ships/1/purge", "", Some(&cookie)))
            .await
            .unwrap();
        let trash = body_text(app.clone().oneshot(get("/admin/trash", Some(&cookie))).await.unwrap()).await;
        assert!(!trash.contains("Seawolf"));
    }

    #[tokio::test]
    async fn panel_create_reports_missing_fields() {
        let app = app().await;
        let cookie = login(&app).await;
        let resp = app
            .clone()
            .oneshot(form_post("/admin/ships", "title=Only+a+title", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(resp).await.contains("required fields missing"));
    }

    #[tokio::test]
    async fn logout_clears_cookie_and_session() {
        let app = app().await;
        let cookie = login(&app).await;
        let resp = app
            .clone()
            .oneshot(form_post("/admin/logout", "", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(resp.headers()[header::LOCATION], "/admin/login");
        assert!(resp.headers()[header::SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));

        let resp = app.clone().oneshot(get("/admin/panel", Some(&cookie))).await.unwrap();
        assert_eq!(resp.headers()[header::LOCATION], "/admin/login");
    }
}
