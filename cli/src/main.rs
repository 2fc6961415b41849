//! CLI entrypoint for taskloop
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use taskloop_application::{
    AgentEventSink, AutoDoneInput, AutoQuitInput, ConversationLogger, NoConversationLogger,
    RetryPolicy, RetryingModelClient, RunAgentError, RunAgentInput, RunAgentUseCase,
    UserInputPort,
};
use taskloop_infrastructure::providers::ProviderSettings;
use taskloop_infrastructure::{
    CatalogSource, ConfigLoader, ConfigSources, FileConfig, JsonlConversationLogger,
    LocalCommandExecutor, create_model_client, generate_cli_tools, load_registry,
    resolve_api_key,
};
use taskloop_presentation::{
    AutoAnswer, Cli, ConsoleEventSink, ConsoleFormatter, InteractiveUserInput, Verbosity,
    set_color_enabled,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Exit code after Ctrl+C (128 + SIGINT)
const CANCELLED_EXIT_CODE: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // === Configuration ===
    let sources = if cli.no_config {
        ConfigSources::default()
    } else {
        ConfigSources::discover(cli.config.clone())
    };

    if cli.show_config {
        eprint!("{}", sources.describe());
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(&sources).context("Failed to load configuration")?
    };
    apply_cli_overrides(&cli, &mut config);

    set_color_enabled(config.output.color);
    let _log_guard = init_logging(cli.verbose, config.logging.file.as_deref())?;
    info!("Starting taskloop");

    let issues = config.validate();
    if !issues.is_empty() {
        eprintln!("{}", ConsoleFormatter::format_config_issues(&issues));
    }
    if issues.iter().any(|issue| issue.is_error()) {
        bail!("Invalid configuration");
    }

    let mut agent_config = config.to_agent_configuration();
    if let Some(root) = agent_config.workspace_root.take() {
        let root = std::fs::canonicalize(&root)
            .with_context(|| format!("Workspace {} is not accessible", root.display()))?;
        agent_config = agent_config.with_workspace_root(root);
    }

    let configured_verbosity = config.output.verbosity.parse().unwrap_or_default();
    let verbosity = Verbosity::resolve(configured_verbosity, cli.quiet, cli.verbose);
    let sink = Arc::new(ConsoleEventSink::new(verbosity));

    // === Dependency Injection ===
    let cwd = std::env::current_dir().context("Cannot determine the current directory")?;
    let registry = Arc::new(build_registry(&config, &cwd)?);
    info!("{} tools available", registry.len());

    let provider_config = config.providers.for_kind(agent_config.provider);
    let api_key = match provider_config.api_key.clone().filter(|k| !k.trim().is_empty()) {
        Some(key) => key,
        None => resolve_api_key(
            agent_config.provider,
            provider_config.api_key_env.as_deref(),
            |name| std::env::var(name).ok(),
        )?,
    };
    let mut settings = ProviderSettings::new(api_key, agent_config.model.clone());
    settings.base_url = provider_config.base_url.clone();
    settings.max_tokens = provider_config.max_tokens;
    settings.request_timeout = std::time::Duration::from_secs(provider_config.request_timeout);

    let client = create_model_client(agent_config.provider, settings)
        .context("Failed to create the model client")?;
    let model = Arc::new(
        RetryingModelClient::new(client, RetryPolicy::new(agent_config.max_retries))
            .with_observer(sink.clone() as Arc<dyn AgentEventSink>),
    );
    let executor =
        Arc::new(LocalCommandExecutor::new().with_working_dir(agent_config.workspace_root.clone()));

    let user_input: Arc<dyn UserInputPort> = match cli.auto_answer {
        Some(AutoAnswer::Done) => Arc::new(AutoDoneInput),
        Some(AutoAnswer::Quit) => Arc::new(AutoQuitInput),
        None => Arc::new(
            InteractiveUserInput::new().with_question_echo(verbosity == Verbosity::Quiet),
        ),
    };

    let logger: Arc<dyn ConversationLogger> = match &config.logging.transcript {
        Some(path) => Arc::new(
            JsonlConversationLogger::open(path)
                .with_context(|| format!("Cannot open transcript {}", path.display()))?,
        ),
        None => Arc::new(NoConversationLogger),
    };

    let cancellation = CancellationToken::new();
    spawn_ctrl_c_handler(cancellation.clone());

    let use_case = RunAgentUseCase::new(model, executor, registry)
        .with_user_input(user_input)
        .with_cancellation(cancellation)
        .with_conversation_logger(logger);

    // === Run ===
    let input = RunAgentInput::new(cli.goal_text(), agent_config);
    match use_case.execute_with_events(input, sink.as_ref()).await {
        Ok(output) => {
            if verbosity >= Verbosity::Normal {
                eprintln!("{}", ConsoleFormatter::format_summary(&output));
            }
            println!("{}", output.answer);
            Ok(ExitCode::SUCCESS)
        }
        Err(RunAgentError::Cancelled) => {
            eprintln!("Cancelled");
            Ok(ExitCode::from(CANCELLED_EXIT_CODE))
        }
        Err(RunAgentError::Failed(failure)) => {
            eprintln!("{}", ConsoleFormatter::format_failure(&failure));
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

/// CLI flags take precedence over every config source.
fn apply_cli_overrides(cli: &Cli, config: &mut FileConfig) {
    let agent = &mut config.agent;
    if let Some(provider) = &cli.provider {
        agent.provider = provider.clone();
        // A model from another provider's config would not make sense
        agent.model = None;
    }
    if let Some(model) = &cli.model {
        agent.model = Some(model.clone());
    }
    if let Some(n) = cli.max_iterations {
        agent.max_iterations = n;
    }
    if let Some(secs) = cli.timeout {
        agent.command_timeout = secs;
    }
    if let Some(n) = cli.max_retries {
        agent.max_retries = n;
    }
    if let Some(n) = cli.max_output_size {
        agent.max_output_size = n;
    }
    if let Some(dir) = &cli.workspace {
        agent.workspace_root = Some(dir.clone());
    }

    let tools = &mut config.tools;
    if let Some(path) = &cli.tools {
        tools.catalog = Some(path.clone());
    }
    if cli.auto_detect_cli {
        tools.auto_detect_cli = true;
    }
    if !cli.cli_allow.is_empty() {
        tools.cli_allowlist = cli.cli_allow.clone();
    }
    tools.cli_blocklist.extend(cli.cli_block.iter().cloned());

    if let Some(verbosity) = cli.verbosity {
        config.output.verbosity = verbosity.to_string();
    }
    if cli.no_color {
        config.output.color = false;
    }
    if let Some(path) = &cli.transcript {
        config.logging.transcript = Some(path.clone());
    }
    if let Some(path) = &cli.log_file {
        config.logging.file = Some(path.clone());
    }
}

fn build_registry(config: &FileConfig, cwd: &Path) -> Result<taskloop_domain::ToolRegistry> {
    let detected = if config.tools.auto_detect_cli {
        let tools = generate_cli_tools(&config.tools.to_cli_tools_config());
        debug!("Auto-detected {} CLI tools", tools.len());
        tools
    } else {
        Vec::new()
    };

    let source = CatalogSource {
        explicit: config.tools.catalog.clone(),
        detected,
    };
    let home = dirs::home_dir();
    load_registry(source, cwd, home.as_deref()).context("Failed to load tools")
}

/// Map `-v` to a filter; `RUST_LOG` wins when set.
fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Logs go to stderr, or to `file` when configured. Keep the guard alive
/// until exit so buffered file logs are flushed.
fn init_logging(verbose: u8, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = log_filter(verbose);

    match file {
        Some(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            };
            let name = path
                .file_name()
                .with_context(|| format!("Invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Cannot create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(writer)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupted, cancelling the run");
                token.cancel();
            }
            Err(e) => warn!("Cannot listen for Ctrl+C: {}", e),
        }
    });
}
