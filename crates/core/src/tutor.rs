//! Tutor Orchestrator
//!
//! The tutor walks a learner through a course one module at a time. It owns
//! no session data itself: every call receives the learner's `SessionState`,
//! applies exactly one transition to it and returns the text to show next.
//!
//! Transitions:
//! - course selection, while no course is selected;
//! - regular message, answered by the completion service using only the
//!   current module's messages as context;
//! - module advance, triggered by the `/next` command, which persists the
//!   finished module's transcript before moving on (or completing the course).

use crate::{
    ADVANCE_COMMAND, LearnerInput,
    catalog::{Course, CourseCatalog, Module},
    completion::{CompletionError, CompletionService},
    history::{ChatHistoryWriter, Transcript},
    session::{ChatMessage, SessionState, TutorState},
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Returned for every message once the course has been completed.
pub const TERMINAL_NOTICE: &str = "🎉 Course completed! Start a new session to begin again.";
/// Returned by the `/next` that finishes the last module.
pub const COMPLETION_NOTICE: &str = "🎉 Course completed! Final chat history saved.";
/// Returned by `/next` before any course has been selected.
pub const SELECT_COURSE_FIRST: &str = "❌ Please select a course first.";
/// Returned for blank input, which leaves the session untouched.
pub const EMPTY_MESSAGE: &str = "❌ Please type a message.";

/// Built-in system prompt. Placeholders: `{course}`, `{module_id}`,
/// `{module_name}`, `{content}`.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an AI tutor teaching the {course} course, \
module {module_id}: {module_name}.
Explain concepts clearly and step by step, with examples, analogies and code snippets where \
they help, so that a beginner can follow. Stay focused on this module's material.

Module content:
{content}";

/// Tunables for the tutor's use of the completion service.
#[derive(Debug, Clone)]
pub struct TutorSettings {
    pub system_prompt_template: String,
    /// Upper bound on a single completion call.
    pub completion_timeout: Duration,
    /// Extra attempts after a retryable failure. Zero disables retries.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry.
    pub retry_backoff: Duration,
}

impl Default for TutorSettings {
    fn default() -> Self {
        Self {
            system_prompt_template: DEFAULT_SYSTEM_PROMPT.to_string(),
            completion_timeout: Duration::from_secs(60),
            max_retries: 0,
            retry_backoff: Duration::from_millis(500),
        }
    }
}

/// Converts a completion failure into the message shown to the learner.
pub fn inline_error_message(err: &CompletionError) -> String {
    format!("⚠️ Error: {err}")
}

/// The session orchestrator.
///
/// A `Tutor` only holds shared, read-only collaborators, so one instance can
/// serve any number of sessions; isolation comes from each session having its
/// own `SessionState`.
pub struct Tutor {
    catalog: Arc<CourseCatalog>,
    completion: Arc<dyn CompletionService>,
    history: Arc<dyn ChatHistoryWriter>,
    settings: TutorSettings,
}

impl Tutor {
    pub fn new(
        catalog: Arc<CourseCatalog>,
        completion: Arc<dyn CompletionService>,
        history: Arc<dyn ChatHistoryWriter>,
        settings: TutorSettings,
    ) -> Self {
        Self {
            catalog,
            completion,
            history,
            settings,
        }
    }

    pub fn catalog(&self) -> &CourseCatalog {
        &self.catalog
    }

    /// The opening message for a new session.
    pub fn greeting(&self) -> String {
        format!(
            "Hello! I'm your AI tutor. Please type the name of the course you'd like to study. \
             Available courses: {}",
            self.catalog.list_courses().join(", ")
        )
    }

    /// Processes one learner input and returns the tutor's reply.
    #[instrument(skip_all, fields(state = ?state.state()))]
    pub async fn process_message(&self, state: &mut SessionState, input: LearnerInput) -> String {
        if state.course_completed() {
            return TERMINAL_NOTICE.to_string();
        }
        if input.is_blank() {
            debug!("Ignoring blank input");
            return EMPTY_MESSAGE.to_string();
        }

        match input {
            LearnerInput::AdvanceModule => {
                state.record_full_only(ChatMessage::user(ADVANCE_COMMAND));
                if !state.course_selected() {
                    return SELECT_COURSE_FIRST.to_string();
                }
                self.advance_module(state).await
            }
            LearnerInput::FreeText(text) => {
                state.record(ChatMessage::user(text.as_str()));
                match state.state() {
                    TutorState::NoCourseSelected => self.select_course(state, &text),
                    _ => self.regular_message(state).await,
                }
            }
        }
    }

    fn select_course(&self, state: &mut SessionState, input: &str) -> String {
        let Some(course) = self.catalog.find_course(input) else {
            debug!(input, "No course matched");
            let mut reply = format!(
                "❌ Available courses: {}",
                self.catalog.list_courses().join(", ")
            );
            if let Some(suggestion) = self.catalog.suggest_course(input) {
                reply.push_str(&format!("\nDid you mean '{suggestion}'?"));
            }
            return reply;
        };

        // A validated catalog never holds a course without modules.
        let Some(first) = course.module_at(0) else {
            return format!("❌ No modules found for {}", course.name);
        };

        state.select_course(course.name.clone(), first.id);
        info!(course = %course.name, module_id = first.id, "Course selected");

        let reply = format!("✅ Selected {}\n{}", course.name, module_banner(first));
        state.record(ChatMessage::assistant(reply.as_str()));
        reply
    }

    async fn advance_module(&self, state: &mut SessionState) -> String {
        let Some((course, index)) = self.current_course(state) else {
            return SELECT_COURSE_FIRST.to_string();
        };

        self.persist_transcript(state).await;

        let next_index = index + 1;
        let Some(next) = course.module_at(next_index) else {
            state.complete();
            info!(course = %course.name, "Course completed");
            return COMPLETION_NOTICE.to_string();
        };

        state.enter_module(next_index, next.id);
        info!(course = %course.name, module_id = next.id, "Entered module");

        let reply = module_banner(next);
        state.record(ChatMessage::assistant(reply.as_str()));
        reply
    }

    async fn regular_message(&self, state: &mut SessionState) -> String {
        let Some((course, index)) = self.current_course(state) else {
            return SELECT_COURSE_FIRST.to_string();
        };
        let Some(module) = course.module_at(index) else {
            return SELECT_COURSE_FIRST.to_string();
        };

        let mut context = Vec::with_capacity(state.module_messages().len() + 1);
        context.push(ChatMessage::system(self.system_prompt(course, module)));
        context.extend(state.module_messages().iter().cloned());

        let reply = match self.complete_with_retry(context).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Completion failed");
                inline_error_message(&e)
            }
        };
        state.record(ChatMessage::assistant(reply.as_str()));
        reply
    }

    async fn complete_with_retry(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<String, CompletionError> {
        let timeout = self.settings.completion_timeout;
        let mut attempt = 0u32;
        loop {
            let result = tokio::time::timeout(timeout, self.completion.complete(messages.clone()))
                .await
                .unwrap_or(Err(CompletionError::Timeout(Some(timeout))));

            match result {
                Err(e) if e.is_retryable() && attempt < self.settings.max_retries => {
                    let delay = self
                        .settings
                        .retry_backoff
                        .saturating_mul(1u32 << attempt.min(16));
                    attempt += 1;
                    warn!(error = %e, attempt, ?delay, "Retrying completion");
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    /// Writes the current module's transcript. Failures are logged and
    /// otherwise ignored so the transition in progress still happens.
    async fn persist_transcript(&self, state: &SessionState) {
        let (Some(course), Some(module_id)) = (state.selected_course(), state.current_module_id())
        else {
            return;
        };
        let transcript = Transcript::new(course, module_id, state.module_messages());
        if let Err(e) = self.history.persist(&transcript).await {
            warn!(course, module_id, error = ?e, "Failed to save chat history");
        }
    }

    fn current_course(&self, state: &SessionState) -> Option<(&Course, usize)> {
        let position = state.position()?;
        let course = self.catalog.course(&position.course)?;
        Some((course, position.module_index))
    }

    fn system_prompt(&self, course: &Course, module: &Module) -> String {
        self.settings
            .system_prompt_template
            .replace("{course}", &course.name)
            .replace("{module_id}", &module.id.to_string())
            .replace("{module_name}", &module.name)
            .replace("{content}", &module.content)
    }
}

fn module_banner(module: &Module) -> String {
    format!("📘 Module {}: {}\n{}", module.id, module.name, module.content)
}
