mod auth;
mod measurements;
mod user;
mod weights;


use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

use crate::auth::middleware::require_auth;
use crate::config::Config;
use crate::db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
}

async fn health() -> &'static str {
    "ok"
}

pub fn create_router(state: AppState) -> Router {
    // Auth routes — strict rate limit: 10 requests burst, then 1 per 6s per IP
    let mut auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout));

    if state.config.rate_limit {
        let auth_governor = GovernorConfigBuilder::default()
            .per_second(6)
            .burst_size(10)
            .finish()
            .unwrap();
        auth_routes = auth_routes.layer(GovernorLayer::new(Arc::new(auth_governor)));
    }

    let mut protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route(
            "/weights",
            get(weights::list)
                .post(weights::upsert)
                .put(weights::update)
                .delete(weights::delete),
        )
        .route("/weights/stats", get(weights::stats))
        .route(
            "/measurements",
            get(measurements::list)
                .post(measurements::upsert)
                .put(measurements::update)
                .delete(measurements::delete),
        )
        .route("/user/goal", get(user::get_goal).post(user::set_goal))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    if state.config.rate_limit {
        let api_governor = GovernorConfigBuilder::default()
            .per_second(2)
            .burst_size(120)
            .finish()
            .unwrap();
        protected = protected.layer(GovernorLayer::new(Arc::new(api_governor)));
    }

    Router::new()
        .route("/health", get(health))
        .merge(auth_routes)
        .merge(protected)
        .with_state(state)
}
