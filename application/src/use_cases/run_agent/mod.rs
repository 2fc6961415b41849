//! Run Agent use case
//!
//! Drives one run of the autonomous loop: ask the model what to do, act on
//! the answer, feed the result back, repeat.
//!
//! | Model response      | Phase         | What happens                                   |
//! |---------------------|---------------|------------------------------------------------|
//! | `ToolCallRequested` | Executing     | look up, validate, run; outcome appended       |
//! | `QuestionForUser`   | AwaitingUser  | answer appended, or a directive is applied     |
//! | `PlainMessage`      | Planning      | message appended                               |
//! | `FinalAnswer`       | Done          | run returns the text                           |
//!
//! Every model call counts as one iteration, so `max_iterations` is an exact
//! bound on model calls. Anything the model can act on (bad arguments, a
//! missing tool, a failing command) goes back into the conversation; only
//! fatal model errors, `/quit`, the iteration limit and cancellation end a
//! run early.

mod types;

pub use types::{AgentFailure, FailureReason, RunAgentError, RunAgentInput, RunAgentOutput};

use crate::ports::agent_events::{AgentEventSink, ErrorKind, NoAgentEvents};
use crate::ports::command_executor::{CommandExecutor, ExecutorError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::model_client::ModelClient;
use crate::ports::user_input::{AutoQuitInput, UserInputError, UserInputPort};
use crate::use_cases::shared::{cancellable, check_cancelled};
use crate::use_cases::tool_helpers::tool_args_preview;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use taskloop_domain::core::string::truncate;
use taskloop_domain::{
    AgentConfiguration, AgentPhase, AgentState, Conversation, ConversationTurn, ExecutionLimits,
    ModelResponse, ParameterValidator, TokenUsage, ToolCall, ToolOutcome, ToolRegistry,
    UserDirective,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Answer used when the user ends a run before the model said anything.
const STOPPED_BY_USER: &str = "Stopped by user";

/// Use case for running an autonomous agent
pub struct RunAgentUseCase<M: ModelClient + 'static, E: CommandExecutor + 'static> {
    model: Arc<M>,
    executor: Arc<E>,
    registry: Arc<ToolRegistry>,
    user_input: Arc<dyn UserInputPort>,
    cancellation_token: Option<CancellationToken>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl<M, E> Clone for RunAgentUseCase<M, E>
where
    M: ModelClient + 'static,
    E: CommandExecutor + 'static,
{
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            executor: self.executor.clone(),
            registry: self.registry.clone(),
            user_input: self.user_input.clone(),
            cancellation_token: self.cancellation_token.clone(),
            conversation_logger: self.conversation_logger.clone(),
        }
    }
}

/// Mutable bookkeeping of a single run.
struct RunState {
    state: AgentState,
    conversation: Conversation,
    usage: TokenUsage,
    /// Consecutive executor failures per tool
    tool_failures: HashMap<String, usize>,
    disabled_tools: HashSet<String>,
}

impl RunState {
    fn new(goal: String, max_iterations: usize) -> Self {
        Self {
            state: AgentState::new(max_iterations),
            conversation: Conversation::new(goal),
            usage: TokenUsage::default(),
            tool_failures: HashMap::new(),
            disabled_tools: HashSet::new(),
        }
    }

    fn fail(&mut self, reason: FailureReason) -> RunAgentError {
        let last_phase = self.state.phase;
        self.state.set_phase(AgentPhase::Failed);
        RunAgentError::Failed(Box::new(AgentFailure {
            reason,
            iterations: self.state.iteration,
            last_phase,
            history: self.conversation.history().to_vec(),
        }))
    }

    fn finish(&mut self, answer: String, stopped_by_user: bool) -> RunAgentOutput {
        self.state.set_phase(AgentPhase::Done);
        self.conversation
            .append(ConversationTurn::final_answer(answer.clone()));
        RunAgentOutput {
            answer,
            iterations: self.state.iteration,
            state: self.state.clone(),
            history: self.conversation.history().to_vec(),
            usage: self.usage,
            stopped_by_user,
        }
    }
}

impl<M: ModelClient + 'static, E: CommandExecutor + 'static> RunAgentUseCase<M, E> {
    pub fn new(model: Arc<M>, executor: Arc<E>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            model,
            executor,
            registry,
            user_input: Arc::new(AutoQuitInput),
            cancellation_token: None,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Set the adapter that answers the model's questions
    pub fn with_user_input(mut self, user_input: Arc<dyn UserInputPort>) -> Self {
        self.user_input = user_input;
        self
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute the agent without observing events
    pub async fn execute(&self, input: RunAgentInput) -> Result<RunAgentOutput, RunAgentError> {
        self.execute_with_events(input, &NoAgentEvents).await
    }

    /// Execute the agent, reporting progress to `events`
    pub async fn execute_with_events(
        &self,
        input: RunAgentInput,
        events: &dyn AgentEventSink,
    ) -> Result<RunAgentOutput, RunAgentError> {
        let RunAgentInput { goal, config } = input;

        config
            .validate()
            .map_err(|e| RunAgentError::InvalidConfig(e.to_string()))?;
        if goal.trim().is_empty() {
            return Err(RunAgentError::InvalidConfig(
                "Goal must not be empty".to_string(),
            ));
        }

        info!(
            "Starting agent: provider={}, model={}, max_iterations={}, tools={}",
            config.provider,
            config.model,
            config.max_iterations,
            self.registry.len()
        );
        self.conversation_logger.log(ConversationEvent::new(
            "run_started",
            json!({
                "goal": goal,
                "provider": config.provider.as_str(),
                "model": config.model,
                "max_iterations": config.max_iterations,
                "tools": self.registry.names().collect::<Vec<_>>(),
            }),
        ));

        let mut run = RunState::new(goal, config.max_iterations);
        let result = self.drive(&mut run, &config, events).await;

        match &result {
            Ok(output) => {
                info!(
                    "Agent finished after {} iterations ({} tokens)",
                    output.iterations,
                    output.usage.total()
                );
                self.conversation_logger.log(ConversationEvent::new(
                    "run_finished",
                    json!({
                        "status": "done",
                        "iterations": output.iterations,
                        "answer": output.answer,
                        "stopped_by_user": output.stopped_by_user,
                        "input_tokens": output.usage.input_tokens,
                        "output_tokens": output.usage.output_tokens,
                    }),
                ));
            }
            Err(RunAgentError::Cancelled) => {
                run.state.set_phase(AgentPhase::Cancelled);
                info!("Agent cancelled after {} iterations", run.state.iteration);
                self.conversation_logger.log(ConversationEvent::new(
                    "run_finished",
                    json!({ "status": "cancelled", "iterations": run.state.iteration }),
                ));
            }
            Err(e) => {
                warn!("Agent failed: {}", e);
                self.conversation_logger.log(ConversationEvent::new(
                    "run_finished",
                    json!({
                        "status": "failed",
                        "iterations": run.state.iteration,
                        "error": e.to_string(),
                    }),
                ));
            }
        }

        result
    }

    async fn drive(
        &self,
        run: &mut RunState,
        config: &AgentConfiguration,
        events: &dyn AgentEventSink,
    ) -> Result<RunAgentOutput, RunAgentError> {
        let limits = config.execution_limits();
        let validator =
            ParameterValidator::new().with_allowed_root(config.workspace_root.clone());

        loop {
            check_cancelled(&self.cancellation_token)?;

            if run.state.iterations_exhausted() {
                let reason = FailureReason::IterationLimitExceeded {
                    max: config.max_iterations,
                };
                events.on_error(ErrorKind::IterationLimit, &reason.to_string());
                return Err(run.fail(reason));
            }

            let iteration = run.state.next_iteration();
            events.on_iteration(iteration, config.max_iterations);
            debug!("Iteration {}/{}", iteration, config.max_iterations);

            let context = run
                .conversation
                .truncate_for_context(config.context_token_budget, config.keep_recent_turns);
            if context.len() < run.conversation.len() {
                debug!(
                    "Context truncated: {} of {} turns sent",
                    context.len(),
                    run.conversation.len()
                );
            }

            let reply = match cancellable(
                &self.cancellation_token,
                self.model.complete(&context, &self.registry),
            )
            .await?
            {
                Ok(reply) => reply,
                Err(e) => {
                    warn!("Model call failed: {}", e);
                    events.on_error(ErrorKind::Model, &e.to_string());
                    return Err(run.fail(FailureReason::ModelFatal(e.to_string())));
                }
            };

            run.usage.add(reply.usage);
            events.on_token_usage(reply.usage);
            self.conversation_logger.log(ConversationEvent::new(
                "model_reply",
                json!({
                    "iteration": iteration,
                    "response": reply.response,
                    "thinking": reply.thinking,
                    "input_tokens": reply.usage.input_tokens,
                    "output_tokens": reply.usage.output_tokens,
                }),
            ));

            if let Some(thinking) = reply.thinking {
                events.on_plan(&thinking);
                run.conversation
                    .append(ConversationTurn::model_message(thinking));
            }

            match reply.response {
                ModelResponse::ToolCallRequested { call } => {
                    run.state.set_phase(AgentPhase::Executing);
                    let outcome = self
                        .run_tool(&call, run, &validator, &limits, config, events)
                        .await?;
                    self.conversation_logger.log(ConversationEvent::new(
                        "tool_exchange",
                        json!({
                            "tool": call.tool_name,
                            "arguments": call.arguments_json(),
                            "outcome": outcome,
                        }),
                    ));
                    run.conversation
                        .append(ConversationTurn::tool_exchange(call, outcome));
                    run.state.set_phase(AgentPhase::Planning);
                }
                ModelResponse::QuestionForUser { text } => {
                    run.state.set_phase(AgentPhase::AwaitingUser);
                    events.on_question(&text);
                    info!("Model asks: {}", truncate(&text, 100));

                    let answer = match cancellable(
                        &self.cancellation_token,
                        self.user_input.request_input(&text),
                    )
                    .await?
                    {
                        Ok(answer) => answer,
                        Err(UserInputError::Cancelled) => return Err(RunAgentError::Cancelled),
                        Err(e) => {
                            events.on_error(ErrorKind::UserInput, &e.to_string());
                            return Err(run.fail(FailureReason::InputFailed(e.to_string())));
                        }
                    };

                    match UserDirective::parse(&answer) {
                        UserDirective::Answer(answer) => {
                            self.conversation_logger.log(ConversationEvent::new(
                                "user_exchange",
                                json!({ "question": text, "answer": answer }),
                            ));
                            run.conversation
                                .append(ConversationTurn::user_exchange(text, answer));
                            run.state.set_phase(AgentPhase::Planning);
                        }
                        UserDirective::Done => {
                            let answer = run
                                .conversation
                                .last_model_message()
                                .unwrap_or(STOPPED_BY_USER)
                                .to_string();
                            info!("User ended the run with /done");
                            events.on_final(&answer);
                            return Ok(run.finish(answer, true));
                        }
                        UserDirective::Quit => {
                            info!("User aborted the run with /quit");
                            return Err(run.fail(FailureReason::UserAborted));
                        }
                        UserDirective::Reset => {
                            info!("User reset the conversation");
                            run.conversation.clear();
                            run.state.set_phase(AgentPhase::Planning);
                        }
                    }
                }
                ModelResponse::FinalAnswer { text } => {
                    events.on_final(&text);
                    return Ok(run.finish(text, false));
                }
                ModelResponse::PlainMessage { text } => {
                    events.on_plan(&text);
                    run.conversation.append(ConversationTurn::model_message(text));
                }
            }
        }
    }

    /// Look up, validate and run one tool call.
    ///
    /// Only cancellation is an error here; everything else becomes a
    /// [`ToolOutcome`] for the model.
    async fn run_tool(
        &self,
        call: &ToolCall,
        run: &mut RunState,
        validator: &ParameterValidator,
        limits: &ExecutionLimits,
        config: &AgentConfiguration,
        events: &dyn AgentEventSink,
    ) -> Result<ToolOutcome, RunAgentError> {
        let name = call.tool_name.as_str();
        events.on_tool_call(name, &call.arguments_json());
        info!("Tool call: {} {}", name, tool_args_preview(call));

        let outcome = if run.disabled_tools.contains(name) {
            ToolOutcome::Failed {
                message: format!(
                    "Tool '{}' is disabled after {} consecutive failures. Use a different approach.",
                    name, config.max_consecutive_tool_failures
                ),
            }
        } else {
            match self.registry.get(name) {
                Err(_) => {
                    let err = ExecutorError::ToolNotFound(name.to_string());
                    let available: Vec<&str> = self.registry.names().collect();
                    let message = format!("{}. Available tools: {}", err, available.join(", "));
                    self.record_tool_failure(name, &message, run, config, events);
                    ToolOutcome::Failed { message }
                }
                Ok(tool) => match validator.validate(tool, &call.arguments) {
                    Err(e) => {
                        warn!("Argument validation failed for {}: {}", name, e);
                        events.on_error(ErrorKind::Validation, &e.to_string());
                        ToolOutcome::Rejected(e)
                    }
                    Ok(arguments) => {
                        match cancellable(
                            &self.cancellation_token,
                            self.executor.execute(tool, &arguments, limits),
                        )
                        .await?
                        {
                            Ok(result) => {
                                run.tool_failures.remove(name);
                                if result.timed_out {
                                    warn!("{} timed out after {} ms", name, result.duration_ms);
                                }
                                ToolOutcome::Executed(result)
                            }
                            Err(e) => {
                                let message = e.to_string();
                                self.record_tool_failure(name, &message, run, config, events);
                                ToolOutcome::Failed { message }
                            }
                        }
                    }
                },
            }
        };

        events.on_tool_result(name, &outcome);
        Ok(outcome)
    }

    fn record_tool_failure(
        &self,
        name: &str,
        message: &str,
        run: &mut RunState,
        config: &AgentConfiguration,
        events: &dyn AgentEventSink,
    ) {
        warn!("Tool {} failed: {}", name, message);
        events.on_error(ErrorKind::Executor, message);

        let count = run.tool_failures.entry(name.to_string()).or_insert(0);
        *count += 1;
        if *count >= config.max_consecutive_tool_failures {
            warn!("Disabling tool {} after {} consecutive failures", name, count);
            run.disabled_tools.insert(name.to_string());
        }
    }
}
