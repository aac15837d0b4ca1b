//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`.
//! Middleware: CORS, tracing.
//!
//! When `HAVEN_WEB_DIR` points at a built portal frontend, unknown paths
//! fall through to its `index.html` for client-side routing. API routes and
//! `/health` take priority.

use axum::Router;
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Counselor directory
        .route("/counselors", get(handlers::counselor::list_counselors))
        .route(
            "/counselors/selected",
            get(handlers::counselor::selected_counselor),
        )
        .route("/counselors/{id}", get(handlers::counselor::get_counselor))
        .route(
            "/counselors/{id}/select",
            post(handlers::counselor::select_counselor),
        )
        // AI chat
        .route("/chat/ai/options", get(handlers::chat::list_options))
        .route("/chat/ai/open", post(handlers::chat::open_ai_chat))
        .route("/chat/ai/messages", post(handlers::chat::send_ai_message))
        .route("/chat/ai/connect", post(handlers::chat::connect_counselor))
        // Counselor chat
        .route(
            "/chat/counselors/{id}/open",
            post(handlers::chat::open_counselor_chat),
        )
        .route(
            "/chat/counselors/{id}/messages",
            post(handlers::chat::send_counselor_message),
        )
        .route("/chat/guest", delete(handlers::chat::forget_guest))
        // Anonymity
        .route(
            "/anonymity",
            get(handlers::anonymity::get_anonymity).post(handlers::anonymity::toggle_anonymity),
        )
        // History
        .route("/sessions", get(handlers::session::list_sessions))
        .route(
            "/sessions/{id}/messages",
            get(handlers::session::get_session_messages),
        )
        // Queries
        .route(
            "/queries",
            get(handlers::query::list_queries).post(handlers::query::submit_query),
        )
        .route("/queries/inbox", get(handlers::query::inbox))
        .route("/queries/{id}/responses", post(handlers::query::respond))
        .route("/queries/{id}/close", post(handlers::query::close_query))
        // Profile
        .route("/profile", get(handlers::profile::get_profile))
        // Admin
        .route("/admin/stats", get(handlers::admin::get_stats))
        .route("/admin/users", get(handlers::admin::list_users))
        .route("/admin/users/{id}", delete(handlers::admin::delete_user))
        .route("/admin/users/{id}/role", put(handlers::admin::set_user_role))
        .route(
            "/admin/counselors",
            get(handlers::admin::list_counselors).post(handlers::admin::create_counselor),
        )
        .route(
            "/admin/counselors/{id}",
            put(handlers::admin::update_counselor).delete(handlers::admin::delete_counselor),
        )
        .route(
            "/admin/counselors/{id}/active",
            post(handlers::admin::set_counselor_active),
        );

    let mut router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if let Ok(web_dir) = std::env::var("HAVEN_WEB_DIR") {
        if std::path::Path::new(&web_dir).exists() {
            let index_path = format!("{web_dir}/index.html");
            let serve_dir = ServeDir::new(&web_dir).fallback(ServeFile::new(index_path));
            router = router.fallback_service(serve_dir);
            tracing::info!(path = %web_dir, "Portal frontend serving enabled");
        } else {
            tracing::warn!(path = %web_dir, "HAVEN_WEB_DIR does not exist, serving API only");
        }
    }

    router
}

/// GET /health - Liveness check, no identity required.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
