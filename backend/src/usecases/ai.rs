use std::sync::Arc;

use anyhow::Result as AnyResult;
use async_trait::async_trait;
use crates::{
    ai::llm_client::{ChatMessage, LlmClient},
    domain::value_objects::ai::{ChatMessageDto, ChatRequest, SummarizeRequest},
};
use thiserror::Error;
use tracing::{error, warn};

const CHAT_TEMPERATURE: f32 = 0.7;
const CHAT_MAX_TOKENS: u32 = 1024;
const SUMMARY_TEMPERATURE: f32 = 0.3;
const SUMMARY_MAX_TOKENS: u32 = 512;

const CHAT_SYSTEM_PROMPT: &str = "You are SomaPlus, a friendly learning and wellness \
assistant for students in Kenya. Answer clearly and concisely.";

const SUMMARY_SYSTEM_PROMPT: &str = "Summarize the provided study material into a short, \
plain-language overview with the key points a learner should retain.";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> AnyResult<String>;
}

#[async_trait]
impl LlmGateway for LlmClient {
    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
        max_tokens: u32,
    ) -> AnyResult<String> {
        self.chat_completion(&messages, temperature, max_tokens)
            .await
    }
}

#[derive(Debug, Error)]
pub enum AiError {
    #[error("messages must not be empty")]
    EmptyMessages,
    #[error("unsupported message role: {0}")]
    UnsupportedRole(String),
    #[error("text must not be empty")]
    EmptyText,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AiError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            AiError::EmptyMessages | AiError::UnsupportedRole(_) | AiError::EmptyText => {
                StatusCode::BAD_REQUEST
            }
            AiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, AiError>;

pub struct AiUseCase<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    llm_gateway: Arc<L>,
}

impl<L> AiUseCase<L>
where
    L: LlmGateway + Send + Sync + 'static,
{
    pub fn new(llm_gateway: Arc<L>) -> Self {
        Self { llm_gateway }
    }

    pub async fn chat(&self, request: ChatRequest) -> UseCaseResult<String> {
        if request.messages.is_empty() {
            let err = AiError::EmptyMessages;
            warn!(status = err.status_code().as_u16(), "ai: empty chat request");
            return Err(err);
        }

        let mut messages = vec![ChatMessage::system(CHAT_SYSTEM_PROMPT)];
        for message in &request.messages {
            messages.push(validated_message(message)?);
        }

        self.llm_gateway
            .chat_completion(messages, CHAT_TEMPERATURE, CHAT_MAX_TOKENS)
            .await
            .map_err(|err| {
                error!(error = ?err, "ai: chat relay failed");
                AiError::Internal(err)
            })
    }

    pub async fn summarize(&self, request: SummarizeRequest) -> UseCaseResult<String> {
        if request.text.trim().is_empty() {
            let err = AiError::EmptyText;
            warn!(
                status = err.status_code().as_u16(),
                "ai: empty summarize request"
            );
            return Err(err);
        }

        let messages = vec![
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
            ChatMessage::user(request.text),
        ];

        self.llm_gateway
            .chat_completion(messages, SUMMARY_TEMPERATURE, SUMMARY_MAX_TOKENS)
            .await
            .map_err(|err| {
                error!(error = ?err, "ai: summarize relay failed");
                AiError::Internal(err)
            })
    }
}

fn validated_message(message: &ChatMessageDto) -> UseCaseResult<ChatMessage> {
    match message.role.as_str() {
        "system" | "user" | "assistant" => Ok(ChatMessage {
            role: message.role.clone(),
            content: message.content.clone(),
        }),
        other => {
            let err = AiError::UnsupportedRole(other.to_string());
            warn!(
                role = other,
                status = err.status_code().as_u16(),
                "ai: rejected message role"
            );
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_request(role: &str, content: &str) -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessageDto {
                role: role.to_string(),
                content: content.to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn chat_prepends_system_prompt_and_relays_reply() {
        let mut gateway = MockLlmGateway::new();
        gateway
            .expect_chat_completion()
            .withf(|messages, _, _| {
                messages.len() == 2
                    && messages[0].role == "system"
                    && messages[1].content == "What is a balanced diet?"
            })
            .times(1)
            .returning(|_, _, _| Ok("A mix of food groups.".to_string()));

        let usecase = AiUseCase::new(Arc::new(gateway));
        let reply = usecase
            .chat(chat_request("user", "What is a balanced diet?"))
            .await
            .unwrap();

        assert_eq!(reply, "A mix of food groups.");
    }

    #[tokio::test]
    async fn empty_chat_is_rejected_without_gateway_call() {
        let mut gateway = MockLlmGateway::new();
        gateway.expect_chat_completion().never();

        let usecase = AiUseCase::new(Arc::new(gateway));
        let result = usecase.chat(ChatRequest { messages: vec![] }).await;

        assert!(matches!(result, Err(AiError::EmptyMessages)));
    }

    #[tokio::test]
    async fn unknown_roles_are_rejected() {
        let mut gateway = MockLlmGateway::new();
        gateway.expect_chat_completion().never();

        let usecase = AiUseCase::new(Arc::new(gateway));
        let result = usecase.chat(chat_request("tool", "hi")).await;

        assert!(matches!(result, Err(AiError::UnsupportedRole(_))));
    }

    #[tokio::test]
    async fn blank_summarize_text_is_rejected() {
        let mut gateway = MockLlmGateway::new();
        gateway.expect_chat_completion().never();

        let usecase = AiUseCase::new(Arc::new(gateway));
        let result = usecase
            .summarize(SummarizeRequest {
                text: "   ".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AiError::EmptyText)));
    }
}
