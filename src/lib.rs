pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::config::Config;
use crate::services::{
    catalog_service::CatalogService, identity_service::IdentityService,
    session_service::SessionService, test_service::TestService,
};
use crate::storage::{
    result_store::ResultStore, test_store::TestStore, user_store::UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog_service: CatalogService,
    pub test_service: TestService,
    pub identity_service: IdentityService,
    pub session_service: SessionService,
    pub result_store: ResultStore,
}

impl AppState {
    pub async fn new(config: Config) -> crate::error::Result<Self> {
        let test_store = TestStore::open(&config.data_dir).await?;
        let result_store = ResultStore::open(&config.data_dir).await?;
        let user_store = UserStore::open(&config.data_dir).await?;

        let catalog_service = CatalogService::new(test_store.clone());
        let test_service = TestService::new(test_store, config.departments.clone());
        let identity_service = IdentityService::new(user_store);
        let session_service = SessionService::new(result_store.clone(), config.focus_debounce);

        Ok(Self {
            config,
            catalog_service,
            test_service,
            identity_service,
            session_service,
            result_store,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let public_api = Router::new()
        .route("/api/auth/signup", post(routes::auth::signup))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/tests", get(routes::catalog::list_tests))
        .route("/api/tests/:id", get(routes::catalog::get_test))
        .route("/api/results/:user_id", get(routes::results::list_user_results))
        .route("/api/sessions", post(routes::session::create_session))
        .route("/api/sessions/:id", get(routes::session::get_status))
        .route("/api/sessions/:id/start", post(routes::session::start_session))
        .route("/api/sessions/:id/answer", patch(routes::session::select_answer))
        .route("/api/sessions/:id/navigate", post(routes::session::navigate))
        .route("/api/sessions/:id/event", post(routes::session::environment_event))
        .route("/api/sessions/:id/submit", post(routes::session::submit))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::RateLimiter::per_second(state.config.public_rps),
            middleware::rate_limit::limit,
        ));

    let admin_api = Router::new()
        .route(
            "/api/admin/tests",
            get(routes::admin::list_tests).post(routes::admin::create_test),
        )
        .route(
            "/api/admin/tests/:id",
            axum::routing::delete(routes::admin::delete_test),
        )
        .route("/api/admin/tests/import", post(routes::admin::import_test))
        .route("/api/admin/results", get(routes::admin::list_results))
        .route(
            "/api/admin/results/:id",
            axum::routing::delete(routes::admin::delete_result),
        )
        .route("/api/admin/results/export", get(routes::admin::export_results))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::RateLimiter::per_second(state.config.admin_rps),
            middleware::rate_limit::limit,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .merge(public_api)
        .merge(admin_api)
        .with_state(state)
}
