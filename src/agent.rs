//! The agent driver boundary.
//!
//! Operation selection is entirely the model's: this crate hands the chat
//! provider the registered tool declarations and a system preamble, then
//! marshals the returned tool calls through the registry until the model
//! answers in plain text. No retries; chat and tool failures propagate.

use std::fmt;

use genai::chat::{ChatMessage, ChatRequest, ToolCall, ToolResponse};
use genai::resolver::{AuthData, AuthResolver};
use genai::ModelIden;

use crate::registry::{ToolError, ToolRegistry};

/// Upper bound on tool-call rounds within one agent turn.
const MAX_TOOL_ROUNDS: usize = 8;

#[derive(Debug)]
pub enum AgentError {
    Chat(String),
    Tool(ToolError),
    EmptyResponse,
    ToolRoundsExceeded,
}

impl fmt::Display for AgentError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            AgentError::Chat(msg) => write!(f, "chat request failed: {msg}"),
            AgentError::Tool(err) => write!(f, "{err}"),
            AgentError::EmptyResponse => write!(f, "model returned no text content"),
            AgentError::ToolRoundsExceeded => {
                write!(f, "model did not produce a final answer within {MAX_TOOL_ROUNDS} tool rounds")
            }
        }
    }
}

impl std::error::Error for AgentError {}

impl From<ToolError> for AgentError {
    fn from(err: ToolError) -> Self {
        AgentError::Tool(err)
    }
}

/// Chat-completion client with a bounded tool-call loop.
pub struct ToolAgent {
    client: genai::Client,
    model: String,
}

impl ToolAgent {
    /// Creates an agent for the given model. When an API key is supplied it
    /// is installed through an auth resolver, otherwise provider credentials
    /// come from the environment.
    #[must_use]
    pub fn new(
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let client = match api_key {
            Some(key) => {
                let auth_resolver = AuthResolver::from_resolver_fn(
                    move |_model_iden: ModelIden| -> Result<Option<AuthData>, genai::resolver::Error> {
                        Ok(Some(AuthData::from_single(key.clone())))
                    },
                );
                genai::Client::builder().with_auth_resolver(auth_resolver).build()
            }
            None => genai::Client::default(),
        };

        Self {
            client,
            model: model.into(),
        }
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Answers a free-text query using the registry's tools and returns the
    /// driver's final text verbatim.
    ///
    /// # Errors
    ///
    /// Returns an error when the chat call fails, a dispatched tool fails,
    /// or the model keeps calling tools past the round limit.
    pub async fn answer(
        &self,
        system_prompt: &str,
        user_query: &str,
        registry: &ToolRegistry,
    ) -> Result<String, AgentError> {
        let mut chat_req = ChatRequest::default()
            .with_system(system_prompt)
            .append_message(ChatMessage::user(user_query));

        let tools = registry.genai_tools();
        if !tools.is_empty() {
            chat_req = chat_req.with_tools(tools);
        }

        for round in 0..MAX_TOOL_ROUNDS {
            let response = self
                .client
                .exec_chat(&self.model, chat_req.clone(), None)
                .await
                .map_err(|e| AgentError::Chat(e.to_string()))?;

            let answer = response.content_text_as_str().map(ToString::to_string);
            let tool_calls: Vec<ToolCall> = response.into_tool_calls();

            if tool_calls.is_empty() {
                return answer.ok_or(AgentError::EmptyResponse);
            }

            tracing::info!(
                "agent round {}: model requested {} tool call(s)",
                round + 1,
                tool_calls.len()
            );

            chat_req = chat_req.append_message(ChatMessage::from(tool_calls.clone()));
            for call in tool_calls {
                tracing::info!("invoking tool '{}' with args {}", call.fn_name, call.fn_arguments);
                let result = registry.dispatch(&call.fn_name, call.fn_arguments.clone()).await?;
                let payload = serde_json::to_string(&result)
                    .map_err(|e| AgentError::Chat(format!("failed to encode tool result: {e}")))?;
                chat_req = chat_req.append_message(ChatMessage::from(ToolResponse::new(call.call_id, payload)));
            }
        }

        Err(AgentError::ToolRoundsExceeded)
    }
}
