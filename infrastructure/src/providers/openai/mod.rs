//! OpenAI Chat Completions client.
//!
//! Tools are sent as `function` tools with `tool_choice: auto`; tool calls
//! come back with JSON-encoded argument strings. Request building and
//! response parsing are pure functions so they can be tested offline.

pub mod types;

use super::error::{ProviderError, parse_retry_after};
use super::{ProviderSettings, call_id_for, http_client, tool_call_from_json};
use crate::tools::JsonSchemaToolConverter;
use async_trait::async_trait;
use taskloop_application::{ModelClient, ModelError};
use taskloop_domain::{
    AgentPromptTemplate, ConversationTurn, ModelReply, ModelResponse, TokenUsage, ToolRegistry,
    interpret_text,
};
use tracing::{debug, warn};
use types::*;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Convert the conversation to Chat Completions messages.
pub fn build_messages(history: &[ConversationTurn]) -> Vec<ApiMessage> {
    let mut messages = vec![ApiMessage::text(ApiRole::System, AgentPromptTemplate::system())];

    for (index, turn) in history.iter().enumerate() {
        match turn {
            ConversationTurn::Goal { text } => {
                messages.push(ApiMessage::text(ApiRole::User, text.clone()));
            }
            ConversationTurn::ModelMessage { text } | ConversationTurn::FinalAnswer { text } => {
                messages.push(ApiMessage::text(ApiRole::Assistant, text.clone()));
            }
            ConversationTurn::ToolExchange { call, outcome } => {
                let id = call_id_for(call, index);
                messages.push(ApiMessage {
                    role: ApiRole::Assistant,
                    content: None,
                    tool_calls: Some(vec![ApiToolCall {
                        id: id.clone(),
                        call_type: "function",
                        function: ApiFunctionCall {
                            name: call.tool_name.clone(),
                            arguments: call.arguments_json().to_string(),
                        },
                    }]),
                    tool_call_id: None,
                });
                messages.push(ApiMessage {
                    role: ApiRole::Tool,
                    content: Some(outcome.render_for_model()),
                    tool_calls: None,
                    tool_call_id: Some(id),
                });
            }
            ConversationTurn::UserExchange { question, answer } => {
                messages.push(ApiMessage::text(ApiRole::Assistant, question.clone()));
                messages.push(ApiMessage::text(ApiRole::User, answer.clone()));
            }
            ConversationTurn::Omitted { .. } => {
                messages.push(ApiMessage::text(ApiRole::User, turn.render_text()));
            }
        }
    }

    messages
}

pub fn build_tools(registry: &ToolRegistry) -> Vec<ApiTool> {
    JsonSchemaToolConverter::all_tools(registry)
        .into_iter()
        .map(|schema| ApiTool {
            tool_type: "function",
            function: ApiFunction {
                name: schema.name,
                description: schema.description,
                parameters: schema.parameters,
            },
        })
        .collect()
}

pub fn build_request<'a>(
    model: &'a str,
    max_tokens: Option<u32>,
    history: &[ConversationTurn],
    registry: &ToolRegistry,
) -> ApiChatRequest<'a> {
    let tools = build_tools(registry);
    ApiChatRequest {
        model,
        messages: build_messages(history),
        tool_choice: (!tools.is_empty()).then_some("auto"),
        tools,
        max_tokens,
    }
}

/// Reduce a response to the loop's view of it.
///
/// The first tool call wins; any text next to it is kept as thinking.
pub fn parse_response(response: ApiChatResponse) -> Result<ModelReply, ProviderError> {
    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("no choices in response".to_string()))?;
    let text = choice.message.content.unwrap_or_default();

    let mut tool_calls = choice.message.tool_calls.unwrap_or_default();
    if tool_calls.len() > 1 {
        debug!("Model requested {} tool calls, using the first", tool_calls.len());
    }

    let reply = if tool_calls.is_empty() {
        ModelReply::new(interpret_text(&text))
    } else {
        let first = tool_calls.swap_remove(0);
        let arguments = match serde_json::from_str(&first.function.arguments) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Tool call '{}' has malformed arguments ({}), sending none",
                    first.function.name, e
                );
                serde_json::Value::Null
            }
        };
        let call = tool_call_from_json(first.function.name, Some(first.id), arguments);
        ModelReply::new(ModelResponse::from_tool_call(call)).with_thinking(text)
    };

    Ok(reply.with_usage(usage))
}

/// [`ModelClient`] for the OpenAI Chat Completions API.
pub struct OpenAiClient {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl OpenAiClient {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(&settings)?,
            settings,
        })
    }

    fn endpoint(&self) -> String {
        let base = self
            .settings
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/');
        format!("{}/v1/chat/completions", base)
    }

    async fn send(
        &self,
        history: &[ConversationTurn],
        tools: &ToolRegistry,
    ) -> Result<ModelReply, ProviderError> {
        let request = build_request(&self.settings.model, None, history, tools);
        debug!(
            model = %self.settings.model,
            messages = request.messages.len(),
            "OpenAI request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after);
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::from_http_status(
                status.as_u16(),
                retry_after,
                &body,
            ));
        }

        let bytes = response.bytes().await?;
        let parsed: ApiChatResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        parse_response(parsed)
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    async fn complete(
        &self,
        history: &[ConversationTurn],
        tools: &ToolRegistry,
    ) -> Result<ModelReply, ModelError> {
        self.send(history, tools).await.map_err(ModelError::from)
    }
}
