//! Conversational oracle client over OpenAI and Anthropic chat APIs.
//!
//! One [`LlmOracle`] holds exactly one open conversation. The full message
//! history is replayed on every call, which is what gives the oracle memory
//! of earlier answers within a session. Opening a new conversation discards
//! the old one; there is no cross-session memory.

use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, FinishReason,
    },
};
use async_trait::async_trait;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

/// Oracle provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleProvider {
    /// OpenAI (GPT models).
    OpenAI,
    /// Anthropic (Claude models).
    Anthropic,
}

/// The conversational contract the game consumes.
///
/// `open_conversation` must be called before the first `send`. The client
/// retains conversation history internally between calls.
#[async_trait]
pub trait OracleClient: Send {
    /// Establishes a fresh conversation seeded with a system instruction,
    /// discarding any previous conversation state.
    fn open_conversation(&mut self, system: &str);

    /// Appends one message to the open conversation and returns the raw
    /// textual reply.
    async fn send(&mut self, message: &str) -> Result<String, OracleError>;
}

/// One turn of recorded conversation history.
#[derive(Debug, Clone)]
struct Turn {
    from_player: bool,
    text: String,
}

/// LLM-backed oracle client.
#[derive(Debug)]
pub struct LlmOracle {
    provider: OracleProvider,
    api_key: String,
    model: String,
    max_tokens: u32,
    system: Option<String>,
    history: Vec<Turn>,
}

impl LlmOracle {
    /// Creates a new oracle client with no open conversation.
    #[instrument(skip(api_key), fields(provider = ?provider, model = %model))]
    pub fn new(provider: OracleProvider, api_key: String, model: String, max_tokens: u32) -> Self {
        info!("Creating oracle client");
        Self {
            provider,
            api_key,
            model,
            max_tokens,
            system: None,
            history: Vec::new(),
        }
    }

    /// Sends the accumulated conversation to OpenAI.
    #[instrument(skip(self))]
    async fn send_openai(&self) -> Result<String, OracleError> {
        debug!("Building OpenAI chat request");

        let client =
            OpenAIClient::with_config(OpenAIConfig::new().with_api_key(self.api_key.clone()));

        let mut messages = Vec::with_capacity(self.history.len() + 1);
        if let Some(system) = &self.system {
            messages.push(ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system.as_str())
                    .build()
                    .map_err(|e| OracleError::transport(format!("Failed to build system message: {}", e)))?,
            ));
        }
        for turn in &self.history {
            let message = if turn.from_player {
                ChatCompletionRequestMessage::User(
                    ChatCompletionRequestUserMessageArgs::default()
                        .content(turn.text.as_str())
                        .build()
                        .map_err(|e| OracleError::transport(format!("Failed to build user message: {}", e)))?,
                )
            } else {
                ChatCompletionRequestMessage::Assistant(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(turn.text.as_str())
                        .build()
                        .map_err(|e| OracleError::transport(format!("Failed to build assistant message: {}", e)))?,
                )
            };
            messages.push(message);
        }

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| OracleError::transport(format!("Failed to build request: {}", e)))?;

        debug!("Sending request to OpenAI");
        let response = client.chat().create(request).await.map_err(|e| {
            error!(error = ?e, "OpenAI API error");
            OracleError::transport(format!("OpenAI API error: {}", e))
        })?;

        let choice = response.choices.first().ok_or_else(|| {
            error!("OpenAI response has no choices");
            OracleError::empty_reply()
        })?;

        if choice.finish_reason == Some(FinishReason::ContentFilter) {
            warn!("OpenAI declined the request on content-safety grounds");
            return Err(OracleError::safety_blocked());
        }

        let content = choice
            .message
            .content
            .clone()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                error!("No content in OpenAI response");
                OracleError::empty_reply()
            })?;

        info!(content_length = content.len(), "Oracle replied");
        Ok(content)
    }

    /// Sends the accumulated conversation to the Anthropic Messages API.
    #[instrument(skip(self))]
    async fn send_anthropic(&self) -> Result<String, OracleError> {
        debug!("Building Anthropic API request");

        let client = reqwest::Client::new();

        let messages: Vec<serde_json::Value> = self
            .history
            .iter()
            .map(|turn| {
                serde_json::json!({
                    "role": if turn.from_player { "user" } else { "assistant" },
                    "content": turn.text,
                })
            })
            .collect();

        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": self.system.as_deref().unwrap_or(""),
            "messages": messages,
        });

        debug!("Sending request to Anthropic");
        let response = client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", self.api_key.clone())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Anthropic API request failed");
                OracleError::transport(format!("Anthropic API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Anthropic response");
            OracleError::transport(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Anthropic API error");
            return Err(OracleError::transport(format!(
                "Anthropic API error {}: {}",
                status, response_text
            )));
        }

        let response_json: serde_json::Value =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = ?e, "Failed to parse Anthropic response");
                OracleError::transport(format!("Failed to parse response: {}", e))
            })?;

        if response_json["stop_reason"].as_str() == Some("refusal") {
            warn!("Anthropic declined the request on content-safety grounds");
            return Err(OracleError::safety_blocked());
        }

        let content = response_json["content"][0]["text"]
            .as_str()
            .map(str::to_string)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                error!("No text content in Anthropic response");
                OracleError::empty_reply()
            })?;

        info!(content_length = content.len(), "Oracle replied");
        Ok(content)
    }
}

#[async_trait]
impl OracleClient for LlmOracle {
    #[instrument(skip(self, system))]
    fn open_conversation(&mut self, system: &str) {
        info!(discarded_turns = self.history.len(), "Opening new conversation");
        self.system = Some(system.to_string());
        self.history.clear();
    }

    #[instrument(skip(self, message), fields(provider = ?self.provider, model = %self.model, turns = self.history.len()))]
    async fn send(&mut self, message: &str) -> Result<String, OracleError> {
        if self.system.is_none() {
            return Err(OracleError::config(
                "No open conversation: open_conversation must be called first".to_string(),
            ));
        }

        self.history.push(Turn {
            from_player: true,
            text: message.to_string(),
        });

        let reply = match self.provider {
            OracleProvider::OpenAI => self.send_openai().await?,
            OracleProvider::Anthropic => self.send_anthropic().await?,
        };

        self.history.push(Turn {
            from_player: false,
            text: reply.clone(),
        });

        Ok(reply)
    }
}

/// Broad failure category for an oracle call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleErrorKind {
    /// Missing or unusable configuration (credentials, conversation).
    Config,
    /// The call itself failed (network, service error).
    Transport,
    /// The oracle declined to answer for content-safety reasons.
    SafetyBlocked,
    /// The oracle returned no usable text.
    EmptyReply,
}

/// Oracle client error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error [{:?}]: {} at {}:{}", kind, message, file, line)]
pub struct OracleError {
    /// Failure category.
    pub kind: OracleErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates an error of the given kind with caller location tracking.
    #[track_caller]
    fn new(kind: OracleErrorKind, message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Creates a configuration error.
    #[track_caller]
    pub fn config(message: String) -> Self {
        Self::new(OracleErrorKind::Config, message)
    }

    /// Creates a transport error.
    #[track_caller]
    pub fn transport(message: String) -> Self {
        Self::new(OracleErrorKind::Transport, message)
    }

    /// Creates a content-safety block error.
    #[track_caller]
    pub fn safety_blocked() -> Self {
        Self::new(
            OracleErrorKind::SafetyBlocked,
            "Oracle declined to answer for content-safety reasons".to_string(),
        )
    }

    /// Creates an empty-reply error.
    #[track_caller]
    pub fn empty_reply() -> Self {
        Self::new(OracleErrorKind::EmptyReply, "Oracle returned no text".to_string())
    }
}
