//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Permissive CORS; the dashboard is served from a different origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Startups
        .route(
            "/startups",
            get(handlers::list_startups).post(handlers::register_startup),
        )
        .route(
            "/startups/{id}",
            get(handlers::get_startup)
                .put(handlers::update_startup)
                .delete(handlers::delete_startup),
        )
        .route("/startups/{id}/onboard", post(handlers::onboard_startup))
        .route("/startups/{id}/reject", post(handlers::reject_startup))
        .route("/startups/{id}/graduate", post(handlers::graduate_startup))
        .route("/startups/{id}/inactivity", get(handlers::startup_inactivity))
        .route("/inactive-startups", get(handlers::inactive_startups))
        .route("/stats/overview", get(handlers::stats_overview))
        // Achievements & revenue
        .route("/achievements/{startup_id}", post(handlers::add_achievement))
        .route(
            "/achievements/{startup_id}/{achievement_id}",
            delete(handlers::remove_achievement),
        )
        .route("/revenue/{startup_id}", post(handlers::add_revenue))
        // SMC
        .route("/smc", get(handlers::list_smc).post(handlers::schedule_smc))
        .route("/smc/{id}/complete", put(handlers::complete_smc))
        .route("/smc/{id}/cancel", put(handlers::cancel_smc))
        .route("/smc/{id}", delete(handlers::delete_smc))
        // One-on-One
        .route(
            "/one-on-one",
            get(handlers::list_one_on_one).post(handlers::schedule_one_on_one),
        )
        .route("/one-on-one/{id}/complete", put(handlers::complete_one_on_one))
        .route("/one-on-one/{id}", delete(handlers::delete_one_on_one))
        // Settings
        .route("/settings", get(handlers::list_settings))
        .route(
            "/settings/{key}",
            get(handlers::get_setting).put(handlers::put_setting),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
