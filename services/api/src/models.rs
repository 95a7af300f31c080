//! API Models
//!
//! Request and response bodies of the HTTP surface, annotated with `utoipa`
//! for OpenAPI generation.

use serde::{Deserialize, Serialize};
use tutor_core::session::{SessionState, TutorState};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct CoursesResponse {
    #[schema(example = json!(["Python", "Excel", "C++"]))]
    pub courses: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ModuleSummary {
    pub id: u32,
    pub name: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ModulesResponse {
    pub course: String,
    pub modules: Vec<ModuleSummary>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct CreateSessionResponse {
    #[schema(value_type = String, format = Uuid)]
    pub session_id: Uuid,
    pub greeting: String,
}

#[derive(Deserialize, ToSchema)]
pub struct MessagePayload {
    #[schema(example = "python")]
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct MessageResponse {
    pub response: String,
}

/// A read-only snapshot of one session's progress.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionProgress {
    #[schema(value_type = String, format = Uuid)]
    pub session_id: Uuid,
    #[schema(value_type = String, example = "in_module")]
    pub state: TutorState,
    pub selected_course: Option<String>,
    pub current_module_id: Option<u32>,
    pub current_module_index: Option<usize>,
    pub course_completed: bool,
    pub message_count: usize,
    pub module_message_count: usize,
}

impl SessionProgress {
    pub fn new(session_id: Uuid, state: &SessionState) -> Self {
        Self {
            session_id,
            state: state.state(),
            selected_course: state.selected_course().map(str::to_string),
            current_module_id: state.current_module_id(),
            current_module_index: state.current_module_index(),
            course_completed: state.course_completed(),
            message_count: state.messages().len(),
            module_message_count: state.module_messages().len(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_payload_deserialization() {
        let payload: MessagePayload = serde_json::from_str(r#"{"message": "/next"}"#).unwrap();
        assert_eq!(payload.message, "/next");
    }

    #[test]
    fn test_message_payload_missing_field() {
        let result: Result<MessagePayload, _> = serde_json::from_str("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_session_progress_for_new_session() {
        let id = Uuid::new_v4();
        let progress = SessionProgress::new(id, &SessionState::new());

        let json = serde_json::to_value(&progress).unwrap();
        assert_eq!(json["state"], "no_course_selected");
        assert_eq!(json["selected_course"], serde_json::Value::Null);
        assert_eq!(json["course_completed"], false);
        assert_eq!(json["message_count"], 0);
    }

    #[test]
    fn test_error_response_serialization() {
        let error = ErrorResponse {
            message: "Empty message".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&error).unwrap(),
            r#"{"message":"Empty message"}"#
        );
    }
}
