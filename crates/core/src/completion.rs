use crate::session::{ChatMessage, MessageRole};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Ways a completion call can fail. All of them are reported to the learner
/// in-band rather than aborting the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    #[error("network error: {0}")]
    Network(String),
    /// The call exceeded its time limit. `None` when the transport timed out
    /// without reporting the limit it enforced.
    #[error("timed out{}", .0.map(|limit| format!(" after {limit:?}")).unwrap_or_default())]
    Timeout(Option<Duration>),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("the model returned an empty response")]
    EmptyResponse,
    #[error("API error: {0}")]
    Api(String),
}

impl CompletionError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CompletionError::Network(_) | CompletionError::Timeout(_))
    }
}

impl From<OpenAIError> for CompletionError {
    fn from(err: OpenAIError) -> Self {
        match err {
            OpenAIError::Reqwest(e) => transport_error(e.to_string(), e.is_timeout()),
            OpenAIError::ApiError(api) => {
                let is_auth = api.code.as_deref() == Some("invalid_api_key")
                    || api
                        .r#type
                        .as_deref()
                        .is_some_and(|t| t.contains("auth") || t.contains("permission"));
                if is_auth {
                    CompletionError::Authentication(api.message)
                } else {
                    CompletionError::Api(api.message)
                }
            }
            other => CompletionError::Api(other.to_string()),
        }
    }
}

fn transport_error(message: String, timed_out: bool) -> CompletionError {
    if timed_out {
        CompletionError::Timeout(None)
    } else {
        CompletionError::Network(message)
    }
}

/// A chat-completion capability: role-tagged messages in, one reply out.
///
/// A leading system message, when present, sets the behaviour for the rest
/// of the conversation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, CompletionError>;
}

/// An implementation of `CompletionService` for any OpenAI-compatible API
/// (OpenAI, Groq, ...).
pub struct OpenAICompatibleClient {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `config` - API key and base URL of the service.
    /// * `model` - The model identifier to use (e.g., "llama-3.1-8b-instant").
    pub fn new(config: OpenAIConfig, model: String) -> Self {
        Self {
            client: Client::with_config(config),
            model,
        }
    }

    fn to_request_message(
        message: &ChatMessage,
    ) -> Result<ChatCompletionRequestMessage, OpenAIError> {
        Ok(match message.role {
            MessageRole::System => ChatCompletionRequestSystemMessageArgs::default()
                .content(message.content.clone())
                .build()?
                .into(),
            MessageRole::User => ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.clone())
                .build()?
                .into(),
            MessageRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.clone())
                .build()?
                .into(),
        })
    }
}

#[async_trait]
impl CompletionService for OpenAICompatibleClient {
    async fn complete(&self, messages: Vec<ChatMessage>) -> Result<String, CompletionError> {
        let request_messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>, _>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(request_messages)
            .build()?;

        debug!(model = %self.model, messages = messages.len(), "Requesting chat completion");
        let response: CreateChatCompletionResponse = self.client.chat().create(request).await?;

        response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_kinds() {
        assert!(CompletionError::Network("reset".into()).is_retryable());
        assert!(CompletionError::Timeout(Some(Duration::from_secs(1))).is_retryable());
        assert!(CompletionError::Timeout(None).is_retryable());
        assert!(!CompletionError::Authentication("bad key".into()).is_retryable());
        assert!(!CompletionError::EmptyResponse.is_retryable());
        assert!(!CompletionError::Api("bad request".into()).is_retryable());
    }

    #[test]
    fn test_transport_timeout_maps_to_timeout() {
        assert_eq!(
            transport_error("operation timed out".into(), true),
            CompletionError::Timeout(None)
        );
        assert_eq!(
            transport_error("connection refused".into(), false),
            CompletionError::Network("connection refused".to_string())
        );
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(
            CompletionError::Timeout(Some(Duration::from_secs(60))).to_string(),
            "timed out after 60s"
        );
        assert_eq!(CompletionError::Timeout(None).to_string(), "timed out");
    }

    #[test]
    fn test_api_error_mapping() {
        let auth: async_openai::error::ApiError = serde_json::from_value(serde_json::json!({
            "message": "Invalid API Key",
            "type": "invalid_request_error",
            "param": null,
            "code": "invalid_api_key"
        }))
        .unwrap();
        assert_eq!(
            CompletionError::from(OpenAIError::ApiError(auth)),
            CompletionError::Authentication("Invalid API Key".to_string())
        );

        let other: async_openai::error::ApiError = serde_json::from_value(serde_json::json!({
            "message": "model not found",
            "type": "invalid_request_error",
            "param": null,
            "code": null
        }))
        .unwrap();
        let other = OpenAIError::ApiError(other);
        assert_eq!(
            CompletionError::from(other),
            CompletionError::Api("model not found".to_string())
        );
    }

    #[test]
    fn test_request_message_conversion() {
        for message in [
            ChatMessage::system("rules"),
            ChatMessage::user("question"),
            ChatMessage::assistant("answer"),
        ] {
            let converted = OpenAICompatibleClient::to_request_message(&message).unwrap();
            let matches_role = matches!(
                (&converted, message.role),
                (ChatCompletionRequestMessage::System(_), MessageRole::System)
                    | (ChatCompletionRequestMessage::User(_), MessageRole::User)
                    | (ChatCompletionRequestMessage::Assistant(_), MessageRole::Assistant)
            );
            assert!(matches_role);
        }
    }
}
