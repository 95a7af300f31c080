//! Per-learner session state.
//!
//! A `SessionState` is a plain record created by the caller at session start
//! and handed to the tutor on every turn. Only the tutor mutates it.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A role-tagged chat message.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// The tutor's coarse state.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TutorState {
    NoCourseSelected,
    InModule,
    Completed,
}

/// Position within the selected course.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CoursePosition {
    pub course: String,
    pub module_index: usize,
    pub module_id: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
enum Progress {
    NoCourseSelected,
    InModule(CoursePosition),
    Completed(CoursePosition),
}

/// One learner's progress and message logs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionState {
    messages: Vec<ChatMessage>,
    module_messages: Vec<ChatMessage>,
    progress: Progress,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Creates an empty session with no course selected.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            module_messages: Vec::new(),
            progress: Progress::NoCourseSelected,
        }
    }

    pub fn state(&self) -> TutorState {
        match self.progress {
            Progress::NoCourseSelected => TutorState::NoCourseSelected,
            Progress::InModule(_) => TutorState::InModule,
            Progress::Completed(_) => TutorState::Completed,
        }
    }

    /// Every message of the session, in order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages since the current module started. Never holds system messages.
    pub fn module_messages(&self) -> &[ChatMessage] {
        &self.module_messages
    }

    pub fn course_selected(&self) -> bool {
        self.position().is_some()
    }

    pub fn course_completed(&self) -> bool {
        matches!(self.progress, Progress::Completed(_))
    }

    pub fn selected_course(&self) -> Option<&str> {
        self.position().map(|p| p.course.as_str())
    }

    pub fn current_module_index(&self) -> Option<usize> {
        self.position().map(|p| p.module_index)
    }

    pub fn current_module_id(&self) -> Option<u32> {
        self.position().map(|p| p.module_id)
    }

    pub fn position(&self) -> Option<&CoursePosition> {
        match &self.progress {
            Progress::NoCourseSelected => None,
            Progress::InModule(position) | Progress::Completed(position) => Some(position),
        }
    }

    /// Appends a message to the full log and, unless it is a system message,
    /// to the module-scoped log.
    pub(crate) fn record(&mut self, message: ChatMessage) {
        if message.role != MessageRole::System {
            self.module_messages.push(message.clone());
        }
        self.messages.push(message);
    }

    /// Appends a message to the full log only.
    pub(crate) fn record_full_only(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub(crate) fn select_course(&mut self, course: String, module_id: u32) {
        self.progress = Progress::InModule(CoursePosition {
            course,
            module_index: 0,
            module_id,
        });
    }

    /// Moves to the given module and starts a fresh module-scoped log.
    pub(crate) fn enter_module(&mut self, module_index: usize, module_id: u32) {
        if let Progress::InModule(position) = &mut self.progress {
            debug_assert!(module_index > position.module_index);
            position.module_index = module_index;
            position.module_id = module_id;
            self.module_messages.clear();
        }
    }

    pub(crate) fn complete(&mut self) {
        if let Progress::InModule(position) = &self.progress {
            self.progress = Progress::Completed(position.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let state = SessionState::new();
        assert_eq!(state.state(), TutorState::NoCourseSelected);
        assert!(!state.course_selected());
        assert!(!state.course_completed());
        assert!(state.messages().is_empty());
        assert!(state.module_messages().is_empty());
        assert_eq!(state.current_module_index(), None);
        assert_eq!(state.current_module_id(), None);
    }

    #[test]
    fn test_system_messages_stay_out_of_module_log() {
        let mut state = SessionState::new();
        state.record(ChatMessage::system("be helpful"));
        state.record(ChatMessage::user("hi"));

        assert_eq!(state.messages().len(), 2);
        assert_eq!(state.module_messages(), &[ChatMessage::user("hi")]);
    }

    #[test]
    fn test_enter_module_resets_scoped_log_only() {
        let mut state = SessionState::new();
        state.select_course("Python".to_string(), 1);
        state.record(ChatMessage::user("hello"));
        state.enter_module(1, 2);

        assert_eq!(state.current_module_index(), Some(1));
        assert_eq!(state.current_module_id(), Some(2));
        assert!(state.module_messages().is_empty());
        assert_eq!(state.messages().len(), 1);
    }

    #[test]
    fn test_completion_keeps_position() {
        let mut state = SessionState::new();
        state.select_course("Python".to_string(), 1);
        state.complete();

        assert_eq!(state.state(), TutorState::Completed);
        assert!(state.course_selected());
        assert_eq!(state.selected_course(), Some("Python"));
        assert_eq!(state.current_module_id(), Some(1));
    }

    #[test]
    fn test_complete_without_course_is_ignored() {
        let mut state = SessionState::new();
        state.complete();
        assert!(!state.course_completed());
    }

    #[test]
    fn test_message_role_serialization() {
        let json = serde_json::to_string(&ChatMessage::assistant("ok")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"ok"}"#);
        assert_eq!(format!("{}", MessageRole::System), "system");
    }
}
