//! Anthropic Messages API client.
//!
//! The Messages API requires strictly alternating roles, so consecutive
//! turns that map to the same role are merged into one message with several
//! content blocks. A tool exchange becomes a `tool_use` block followed by a
//! `tool_result` block in the next user message.

pub mod types;

use super::error::{ProviderError, parse_retry_after};
use super::{ProviderSettings, call_id_for, http_client, tool_call_from_json};
use crate::tools::JsonSchemaToolConverter;
use async_trait::async_trait;
use taskloop_application::{ModelClient, ModelError};
use taskloop_domain::{
    AgentPromptTemplate, ConversationTurn, ModelReply, ModelResponse, TokenUsage, ToolOutcome,
    ToolRegistry, interpret_text,
};
use tracing::debug;
use types::{ApiContentBlock, ApiMessage, ApiMessagesRequest, ApiResponse, ApiRole, ApiTool};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";

/// Sent when the history ends on an assistant message.
const CONTINUE_PROMPT: &str = "Continue.";

fn push_block(messages: &mut Vec<ApiMessage>, role: ApiRole, block: ApiContentBlock) {
    match messages.last_mut() {
        Some(last) if last.role == role => last.content.push(block),
        _ => messages.push(ApiMessage {
            role,
            content: vec![block],
        }),
    }
}

fn text(text: impl Into<String>) -> ApiContentBlock {
    ApiContentBlock::Text { text: text.into() }
}

/// Convert the conversation to alternating Messages API messages.
pub fn build_messages(history: &[ConversationTurn]) -> Vec<ApiMessage> {
    let mut messages = Vec::new();

    for (index, turn) in history.iter().enumerate() {
        match turn {
            ConversationTurn::Goal { text: goal } => {
                push_block(&mut messages, ApiRole::User, text(goal.clone()));
            }
            ConversationTurn::ModelMessage { text: message }
            | ConversationTurn::FinalAnswer { text: message } => {
                push_block(&mut messages, ApiRole::Assistant, text(message.clone()));
            }
            ConversationTurn::ToolExchange { call, outcome } => {
                let id = call_id_for(call, index);
                push_block(
                    &mut messages,
                    ApiRole::Assistant,
                    ApiContentBlock::ToolUse {
                        id: id.clone(),
                        name: call.tool_name.clone(),
                        input: call.arguments_json(),
                    },
                );
                let is_error = match outcome {
                    ToolOutcome::Executed(result) => !result.success(),
                    ToolOutcome::Rejected(_) | ToolOutcome::Failed { .. } => true,
                };
                push_block(
                    &mut messages,
                    ApiRole::User,
                    ApiContentBlock::ToolResult {
                        tool_use_id: id,
                        content: outcome.render_for_model(),
                        is_error,
                    },
                );
            }
            ConversationTurn::UserExchange { question, answer } => {
                push_block(&mut messages, ApiRole::Assistant, text(question.clone()));
                push_block(&mut messages, ApiRole::User, text(answer.clone()));
            }
            ConversationTurn::Omitted { .. } => {
                push_block(&mut messages, ApiRole::User, text(turn.render_text()));
            }
        }
    }

    if messages.last().is_none_or(|m| m.role == ApiRole::Assistant) {
        push_block(&mut messages, ApiRole::User, text(CONTINUE_PROMPT));
    }

    messages
}

pub fn build_tools(registry: &ToolRegistry) -> Vec<ApiTool> {
    JsonSchemaToolConverter::all_tools(registry)
        .into_iter()
        .map(|schema| ApiTool {
            name: schema.name,
            description: schema.description,
            input_schema: schema.parameters,
        })
        .collect()
}

pub fn build_request<'a>(
    model: &'a str,
    max_tokens: u32,
    history: &[ConversationTurn],
    registry: &ToolRegistry,
) -> ApiMessagesRequest<'a> {
    ApiMessagesRequest {
        model,
        max_tokens,
        system: AgentPromptTemplate::system(),
        messages: build_messages(history),
        tools: build_tools(registry),
    }
}

/// Reduce a response to the loop's view of it.
pub fn parse_response(response: ApiResponse) -> ModelReply {
    let usage = response
        .usage
        .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
        .unwrap_or_default();

    let mut texts = Vec::new();
    let mut first_call = None;
    for block in response.content {
        match block {
            ApiContentBlock::Text { text } => texts.push(text),
            ApiContentBlock::ToolUse { id, name, input } if first_call.is_none() => {
                first_call = Some(tool_call_from_json(name, Some(id), input));
            }
            ApiContentBlock::ToolUse { name, .. } => {
                debug!("Ignoring additional tool call '{}'", name);
            }
            ApiContentBlock::ToolResult { .. } | ApiContentBlock::Unsupported => {}
        }
    }
    let text = texts.join("\n");

    let reply = match first_call {
        Some(call) => ModelReply::new(ModelResponse::from_tool_call(call)).with_thinking(text),
        None => ModelReply::new(interpret_text(&text)),
    };
    reply.with_usage(usage)
}

/// [`ModelClient`] for the Anthropic Messages API.
pub struct AnthropicClient {
    client: reqwest::Client,
    settings: ProviderSettings,
}

impl AnthropicClient {
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
        format!("{}/v1/messages", base)
    }

    async fn send(
        &self,
        history: &[ConversationTurn],
        tools: &ToolRegistry,
    ) -> Result<ModelReply, ProviderError> {
        let request = build_request(
            &self.settings.model,
            self.settings.max_tokens,
            history,
            tools,
        );
        debug!(
            model = %self.settings.model,
            messages = request.messages.len(),
            "Anthropic request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", API_VERSION)
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
            // 529 (overloaded) is retried like any 5xx
            return Err(ProviderError::from_http_status(
                status.as_u16(),
                retry_after,
                &body,
            ));
        }

        let bytes = response.bytes().await?;
        let parsed: ApiResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(parse_response(parsed))
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn complete(
        &self,
        history: &[ConversationTurn],
        tools: &ToolRegistry,
    ) -> Result<ModelReply, ModelError> {
        self.send(history, tools).await.map_err(ModelError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use taskloop_domain::{ToolCall, ToolDefinition, ValidationError};

    fn roles(messages: &[ApiMessage]) -> Vec<ApiRole> {
        messages.iter().map(|m| m.role).collect()
    }

    fn response(value: serde_json::Value) -> ApiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_consecutive_roles_are_merged() {
        let history = vec![
            ConversationTurn::goal("List the files"),
            ConversationTurn::model_message("I'll look at the directory."),
            ConversationTurn::tool_exchange(
                ToolCall::new("list_files").with_call_id("toolu_1"),
                ToolOutcome::Failed {
                    message: "Command not found: ls".into(),
                },
            ),
            ConversationTurn::user_exchange("Which directory?", "src"),
        ];

        let messages = build_messages(&history);

        assert_eq!(
            roles(&messages),
            vec![ApiRole::User, ApiRole::Assistant, ApiRole::User, ApiRole::Assistant, ApiRole::User]
        );
        // thinking text and tool_use share one assistant message
        assert_eq!(messages[1].content.len(), 2);
        assert!(matches!(
            &messages[2].content[0],
            ApiContentBlock::ToolResult { tool_use_id, is_error: true, .. } if tool_use_id == "toolu_1"
        ));
    }

    #[test]
    fn test_history_ending_with_assistant_gets_a_nudge() {
        let history = vec![
            ConversationTurn::goal("g"),
            ConversationTurn::model_message("thinking out loud"),
        ];
        let messages = build_messages(&history);
        assert_eq!(messages.last().map(|m| m.role), Some(ApiRole::User));
        assert_eq!(messages.last().unwrap().content[0], text(CONTINUE_PROMPT));
    }

    #[test]
    fn test_rejected_call_is_an_error_result() {
        let history = vec![
            ConversationTurn::goal("g"),
            ConversationTurn::tool_exchange(
                ToolCall::new("read_file"),
                ToolOutcome::Rejected(ValidationError::MissingParameter {
                    tool: "read_file".into(),
                    param: "path".into(),
                }),
            ),
        ];
        let value = serde_json::to_value(&build_messages(&history)[2].content[0]).unwrap();
        assert_eq!(value["type"], "tool_result");
        assert_eq!(value["tool_use_id"], "call_1");
        assert_eq!(value["is_error"], true);
        assert!(value["content"].as_str().unwrap().contains("Validation error"));
    }

    #[test]
    fn test_request_shape() {
        let registry =
            ToolRegistry::load(vec![ToolDefinition::new("pwd", "Print directory", "pwd")]).unwrap();
        let request = build_request("claude-sonnet-4-5", 4096, &[ConversationTurn::goal("g")], &registry);
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["max_tokens"], 4096);
        assert!(value["system"].as_str().unwrap().contains("final_answer"));
        assert_eq!(value["tools"][0]["name"], "pwd");
        assert_eq!(value["tools"][0]["input_schema"]["type"], "object");
        assert_eq!(value["tools"][2]["name"], "final_answer");
        assert_eq!(value["messages"][0]["content"][0]["text"], "g");
    }

    #[test]
    fn test_parse_tool_use_with_text() {
        let reply = parse_response(response(json!({
            "content": [
                {"type": "thinking", "thinking": "hmm", "signature": "x"},
                {"type": "text", "text": "Checking the directory."},
                {"type": "tool_use", "id": "toolu_9", "name": "list_files", "input": {"path": "src"}},
                {"type": "tool_use", "id": "toolu_10", "name": "pwd", "input": {}}
            ],
            "usage": {"input_tokens": 50, "output_tokens": 12}
        })));

        match &reply.response {
            ModelResponse::ToolCallRequested { call } => {
                assert_eq!(call.tool_name, "list_files");
                assert_eq!(call.get_string("path"), Some("src"));
                assert_eq!(call.call_id.as_deref(), Some("toolu_9"));
            }
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(reply.thinking.as_deref(), Some("Checking the directory."));
        assert_eq!(reply.usage.total(), 62);
    }

    #[test]
    fn test_parse_ask_user() {
        let reply = parse_response(response(json!({
            "content": [{"type": "tool_use", "id": "t", "name": "ask_user",
                         "input": {"question": "Which branch?"}}]
        })));
        assert_eq!(
            reply.response,
            ModelResponse::QuestionForUser {
                text: "Which branch?".to_string()
            }
        );
    }

    #[test]
    fn test_parse_completion_assessment_text() {
        let reply = parse_response(response(json!({
            "content": [{"type": "text",
                         "text": "```json\n{\"status\": \"complete\", \"result\": \"3 files\"}\n```"}]
        })));
        assert_eq!(
            reply.response,
            ModelResponse::FinalAnswer {
                text: "3 files".to_string()
            }
        );
    }

    #[test]
    fn test_endpoint() {
        let client = AnthropicClient::new(ProviderSettings::new("key", "claude-sonnet-4-5")).unwrap();
        assert_eq!(client.endpoint(), "https://api.anthropic.com/v1/messages");
    }
}
