//! Embedded dashboard page

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};

use crate::AppState;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const DASHBOARD_JS: &str = include_str!("../../static/dashboard.js");
const DASHBOARD_CSS: &str = include_str!("../../static/dashboard.css");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /static/dashboard.js
pub async fn serve_dashboard_js() -> Response {
    static_asset("application/javascript", DASHBOARD_JS)
}

/// GET /static/dashboard.css
pub async fn serve_dashboard_css() -> Response {
    static_asset("text/css", DASHBOARD_CSS)
}

fn static_asset(content_type: &'static str, body: &'static str) -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", content_type),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        body,
    )
        .into_response()
}

pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(serve_index))
        .route("/static/dashboard.js", get(serve_dashboard_js))
        .route("/static/dashboard.css", get(serve_dashboard_css))
}
