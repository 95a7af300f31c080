//! Axum Handlers for the REST API
//!
//! Thin wrappers around the tutor: they resolve the session, validate the
//! input and hand the turn to `Tutor::process_message`. They use `utoipa`
//! doc comments to generate OpenAPI documentation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};
use tutor_core::LearnerInput;
use uuid::Uuid;

use crate::{
    models::{
        CoursesResponse, CreateSessionResponse, ErrorResponse, MessagePayload, MessageResponse,
        ModuleSummary, ModulesResponse, SessionProgress,
    },
    state::AppState,
};

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { message })).into_response()
            }
            ApiError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse { message })).into_response()
            }
        }
    }
}

fn session_not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Session with id '{}' not found", id))
}

/// List the available courses in curriculum order.
#[utoipa::path(
    get,
    path = "/courses",
    responses(
        (status = 200, description = "Available courses", body = CoursesResponse)
    )
)]
pub async fn list_courses(State(state): State<Arc<AppState>>) -> Json<CoursesResponse> {
    let courses = state
        .tutor
        .catalog()
        .list_courses()
        .into_iter()
        .map(str::to_string)
        .collect();
    Json(CoursesResponse { courses })
}

/// List the modules of a course.
#[utoipa::path(
    get,
    path = "/courses/{course}/modules",
    responses(
        (status = 200, description = "Modules of the course", body = ModulesResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    params(
        ("course" = String, Path, description = "Course name (case-insensitive)")
    )
)]
pub async fn list_modules(
    State(state): State<Arc<AppState>>,
    Path(course): Path<String>,
) -> Result<Json<ModulesResponse>, ApiError> {
    let course = state
        .tutor
        .catalog()
        .find_course(&course)
        .ok_or_else(|| ApiError::NotFound(format!("Course '{}' not found", course)))?;

    let modules = course
        .modules
        .iter()
        .map(|m| ModuleSummary {
            id: m.id,
            name: m.name.clone(),
        })
        .collect();

    Ok(Json(ModulesResponse {
        course: course.name.clone(),
        modules,
    }))
}

/// Start a new tutoring session.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created successfully", body = CreateSessionResponse)
    )
)]
pub async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_id = state.sessions.create().await;
    let greeting = state.tutor.greeting();
    (
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id,
            greeting,
        }),
    )
}

/// Get the progress of a session.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    responses(
        (status = 200, description = "Session progress", body = SessionProgress),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionProgress>, ApiError> {
    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))?;
    let session = session.lock().await;
    Ok(Json(SessionProgress::new(id, &session)))
}

/// End a session and discard its state.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    responses(
        (status = 204, description = "Session ended"),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(session_not_found(id))
    }
}

/// Send a learner message to the tutor and get its reply.
///
/// The text `/next` finishes the current module and moves on to the next one.
#[utoipa::path(
    post,
    path = "/sessions/{id}/messages",
    request_body = MessagePayload,
    responses(
        (status = 200, description = "Tutor reply", body = MessageResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 404, description = "Session not found", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "Session ID")
    )
)]
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MessagePayload>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(input) = LearnerInput::parse(&payload.message) else {
        warn!(session_id = %id, "Rejected empty message");
        return Err(ApiError::BadRequest("Empty message".to_string()));
    };

    let session = state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| session_not_found(id))?;

    // Held for the whole turn: one in-flight message per session.
    let mut session = session.lock().await;
    debug!(session_id = %id, "Processing message");
    let response = state
        .tutor
        .process_message(&mut session, input)
        .await;

    Ok(Json(MessageResponse { response }))
}
