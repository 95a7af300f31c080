//! Axum Router Configuration
//!
//! This module defines the complete HTTP routing for the application,
//! including the REST API and OpenAPI documentation.

use crate::{
    handlers,
    models::{
        CoursesResponse, CreateSessionResponse, ErrorResponse, MessagePayload, MessageResponse,
        ModuleSummary, ModulesResponse, SessionProgress,
    },
    state::AppState,
};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_courses,
        handlers::list_modules,
        handlers::create_session,
        handlers::get_session,
        handlers::delete_session,
        handlers::post_message,
    ),
    components(
        schemas(CoursesResponse, ModuleSummary, ModulesResponse, CreateSessionResponse, MessagePayload, MessageResponse, SessionProgress, ErrorResponse)
    ),
    tags(
        (name = "Tutor API", description = "Course catalog and tutoring sessions")
    )
)]
pub struct ApiDoc;

/// Creates the main Axum router for the application.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        .route("/courses", get(handlers::list_courses))
        .route("/courses/{course}/modules", get(handlers::list_modules))
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/{id}/messages", post(handlers::post_message))
        .with_state(app_state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_router)
}
