pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::services::{
    attempt_service::AttemptService, catalog_service::CatalogService, child_service::ChildService,
    grading_service::GradingService, progress_service::ProgressService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub catalog_service: CatalogService,
    pub child_service: ChildService,
    pub attempt_service: AttemptService,
    pub grading_service: GradingService,
    pub progress_service: ProgressService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let catalog_service = CatalogService::new(pool.clone());
        let child_service = ChildService::new(pool.clone());
        let attempt_service = AttemptService::new(pool.clone());
        let grading_service = GradingService::new(pool.clone());
        let progress_service = ProgressService::new(pool.clone());

        Self {
            pool,
            catalog_service,
            child_service,
            attempt_service,
            grading_service,
            progress_service,
        }
    }
}

pub fn app(state: AppState) -> Router {
    let catalog_api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/levels", get(routes::catalog::list_levels))
        .route("/skills", get(routes::catalog::list_skills))
        .route("/units", get(routes::catalog::list_units))
        .route("/questions", get(routes::catalog::list_questions))
        .route("/books", get(routes::books::list_books))
        .route("/books/:id", get(routes::books::get_book))
        .route("/books/:id/grade", post(routes::books::grade_book))
        .route("/responses", post(routes::responses::submit_responses))
        .route("/progress/child/:id", get(routes::progress::child_progress));

    let children_api = Router::new()
        .route(
            "/children",
            get(routes::children::list_children).post(routes::children::create_child),
        )
        .route("/children/:id", patch(routes::children::update_child))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ));

    catalog_api
        .merge(children_api)
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::method_not_allowed)
        .with_state(state)
        .layer(middleware::cors::permissive_cors())
        .layer(TraceLayer::new_for_http())
}
