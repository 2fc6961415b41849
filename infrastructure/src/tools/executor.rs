//! Local process executor.
//!
//! Runs a tool's rendered argv directly (no shell), with a timeout and
//! per-stream output limits. A non-zero exit status is returned as data;
//! only failures to start the process are errors.

use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use taskloop_application::{CommandExecutor, ExecutorError};
use taskloop_domain::core::string::truncate_output;
use taskloop_domain::tool::template;
use taskloop_domain::{
    ExecutionLimits, ExecutionResult, SIGNAL_EXIT_CODE, TIMEOUT_EXIT_CODE, ToolDefinition,
    ValidatedArguments,
};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long to wait for pipe readers after killing a timed-out process.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Executes tools as child processes of this one.
#[derive(Debug, Clone, Default)]
pub struct LocalCommandExecutor {
    working_dir: Option<PathBuf>,
}

impl LocalCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every command from `dir` instead of the current directory.
    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    fn build_command(&self, argv: &[String]) -> Command {
        let mut cmd = Command::new(&argv[0]);
        cmd.args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        // Take the child down with us if the agent dies
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        cmd
    }
}

fn spawn_error(program: &str, err: io::Error) -> ExecutorError {
    match err.kind() {
        io::ErrorKind::NotFound => ExecutorError::ExecutableMissing {
            program: program.to_string(),
        },
        io::ErrorKind::PermissionDenied => ExecutorError::PermissionDenied {
            program: program.to_string(),
        },
        _ => ExecutorError::Spawn {
            program: program.to_string(),
            message: err.to_string(),
        },
    }
}

fn drain<R>(stream: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            // A read error just ends the capture early
            let _ = stream.read_to_end(&mut buf).await;
        }
        buf
    })
}

async fn collect(reader: JoinHandle<Vec<u8>>, grace: Option<Duration>) -> String {
    let bytes = match grace {
        Some(grace) => match tokio::time::timeout(grace, reader).await {
            Ok(Ok(bytes)) => bytes,
            _ => Vec::new(),
        },
        None => reader.await.unwrap_or_default(),
    };
    String::from_utf8_lossy(&bytes).into_owned()
}

#[async_trait]
impl CommandExecutor for LocalCommandExecutor {
    async fn execute(
        &self,
        tool: &ToolDefinition,
        arguments: &ValidatedArguments,
        limits: &ExecutionLimits,
    ) -> Result<ExecutionResult, ExecutorError> {
        let argv = template::render(&tool.command_template, arguments);
        let Some(program) = argv.first() else {
            return Err(ExecutorError::EmptyCommand {
                tool: tool.name.clone(),
            });
        };

        debug!("Executing tool '{}': {:?}", tool.name, argv);
        let start = Instant::now();

        let mut child = self
            .build_command(&argv)
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let waited = tokio::time::timeout(limits.timeout, child.wait()).await;
        let (exit_code, timed_out, grace) = match waited {
            Ok(Ok(status)) => (status.code().unwrap_or(SIGNAL_EXIT_CODE), false, None),
            Ok(Err(e)) => {
                warn!("Failed to wait for '{}': {}", program, e);
                (SIGNAL_EXIT_CODE, false, Some(DRAIN_GRACE))
            }
            Err(_) => {
                warn!(
                    "Tool '{}' timed out after {:?}, killing process",
                    tool.name, limits.timeout
                );
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill '{}': {}", program, e);
                }
                (TIMEOUT_EXIT_CODE, true, Some(DRAIN_GRACE))
            }
        };

        let stdout = collect(stdout_reader, grace).await;
        let stderr = collect(stderr_reader, grace).await;
        let (stdout, stdout_cut) = truncate_output(&stdout, limits.max_output_size);
        let (stderr, stderr_cut) = truncate_output(&stderr, limits.max_output_size);

        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Tool '{}' finished: exit={} timed_out={} in {}ms",
            tool.name, exit_code, timed_out, duration_ms
        );

        Ok(ExecutionResult {
            stdout,
            stderr,
            exit_code,
            truncated: stdout_cut || stderr_cut,
            timed_out,
            duration_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskloop_domain::{ParamType, ParameterSpec};

    fn limits() -> ExecutionLimits {
        ExecutionLimits::new(Duration::from_secs(5), 5000)
    }

    fn args(pairs: &[(&str, &[&str])]) -> ValidatedArguments {
        let mut args = ValidatedArguments::default();
        for (name, values) in pairs {
            args.insert(*name, values.iter().map(|v| v.to_string()).collect());
        }
        args
    }

    fn echo_tool() -> ToolDefinition {
        ToolDefinition::new("echo", "Echo text", "echo {text}").with_parameter(
            "text",
            ParameterSpec::new(ParamType::String, "Text"),
            true,
        )
    }

    #[tokio::test]
    async fn test_captures_stdout() {
        let result = LocalCommandExecutor::new()
            .execute(&echo_tool(), &args(&[("text", &["hello"])]), &limits())
            .await
            .unwrap();

        assert_eq!(result.stdout, "hello\n");
        assert_eq!(result.stderr, "");
        assert_eq!(result.exit_code, 0);
        assert!(result.success());
        assert!(!result.truncated);
    }

    #[tokio::test]
    async fn test_shell_metacharacters_are_literal() {
        let payload = "a; rm -rf / && echo $HOME | cat `id`";
        let result = LocalCommandExecutor::new()
            .execute(&echo_tool(), &args(&[("text", &[payload])]), &limits())
            .await
            .unwrap();

        assert_eq!(result.stdout, format!("{}\n", payload));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_data() {
        let tool = ToolDefinition::new("cat", "Read", "cat {path}").with_parameter(
            "path",
            ParameterSpec::new(ParamType::String, "File"),
            true,
        );
        let result = LocalCommandExecutor::new()
            .execute(&tool, &args(&[("path", &["/definitely/not/here"])]), &limits())
            .await
            .unwrap();

        assert_ne!(result.exit_code, 0);
        assert!(!result.stderr.is_empty());
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn test_timeout_kills_process() {
        let tool = ToolDefinition::new("sleep", "Sleep", "sleep 10");
        let limits = ExecutionLimits::new(Duration::from_millis(200), 5000);

        let start = Instant::now();
        let result = LocalCommandExecutor::new()
            .execute(&tool, &ValidatedArguments::default(), &limits)
            .await
            .unwrap();

        assert!(result.timed_out);
        assert_eq!(result.exit_code, TIMEOUT_EXIT_CODE);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_output_is_truncated_per_stream() {
        let tool = ToolDefinition::new("printf", "Print", "printf {text}").with_parameter(
            "text",
            ParameterSpec::new(ParamType::String, "Text"),
            true,
        );
        let long = "x".repeat(500);
        let limits = ExecutionLimits::new(Duration::from_secs(5), 100);

        let result = LocalCommandExecutor::new()
            .execute(&tool, &args(&[("text", &[&long])]), &limits)
            .await
            .unwrap();

        assert!(result.truncated);
        assert!(result.stdout.chars().count() <= 100);
        assert!(result.stdout.contains("... (truncated"));
    }

    #[tokio::test]
    async fn test_output_at_limit_is_untouched() {
        let tool = ToolDefinition::new("printf", "Print", "printf {text}").with_parameter(
            "text",
            ParameterSpec::new(ParamType::String, "Text"),
            true,
        );
        let exact = "y".repeat(100);
        let limits = ExecutionLimits::new(Duration::from_secs(5), 100);

        let result = LocalCommandExecutor::new()
            .execute(&tool, &args(&[("text", &[&exact])]), &limits)
            .await
            .unwrap();

        assert!(!result.truncated);
        assert_eq!(result.stdout, exact);
    }

    #[tokio::test]
    async fn test_array_argument_expands_to_separate_args() {
        let tool = ToolDefinition::new("printf", "Print", "printf %s| {parts}").with_parameter(
            "parts",
            ParameterSpec::string_array("Parts"),
            false,
        );
        let result = LocalCommandExecutor::new()
            .execute(&tool, &args(&[("parts", &["a b", "c"])]), &limits())
            .await
            .unwrap();

        assert_eq!(result.stdout, "a b|c|");
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let tool = ToolDefinition::new("ghost", "Missing", "surely-not-a-real-command-xyz");
        let err = LocalCommandExecutor::new()
            .execute(&tool, &ValidatedArguments::default(), &limits())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::ExecutableMissing { .. }));
    }

    #[tokio::test]
    async fn test_empty_command() {
        let tool = ToolDefinition::new("empty", "Nothing", "{args}").with_parameter(
            "args",
            ParameterSpec::string_array("Args"),
            false,
        );
        let err = LocalCommandExecutor::new()
            .execute(&tool, &ValidatedArguments::default(), &limits())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::EmptyCommand { .. }));
    }

    #[tokio::test]
    async fn test_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("note.txt"), "inside").unwrap();
        let tool = ToolDefinition::new("cat", "Read", "cat note.txt");

        let result = LocalCommandExecutor::new()
            .with_working_dir(Some(dir.path().to_path_buf()))
            .execute(&tool, &ValidatedArguments::default(), &limits())
            .await
            .unwrap();

        assert_eq!(result.stdout, "inside");
    }

    #[tokio::test]
    async fn test_same_call_gives_same_result() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        let tool = ToolDefinition::new("list_files", "List", "ls {path}").with_parameter(
            "path",
            ParameterSpec::new(ParamType::String, "Directory"),
            true,
        );
        let path = dir.path().to_string_lossy().to_string();
        let executor = LocalCommandExecutor::new();

        let first = executor
            .execute(&tool, &args(&[("path", &[&path])]), &limits())
            .await
            .unwrap();
        let second = executor
            .execute(&tool, &args(&[("path", &[&path])]), &limits())
            .await
            .unwrap();

        assert_eq!(first.stdout, "a.txt\nb.txt\n");
        assert_eq!(first.stdout, second.stdout);
        assert_eq!(first.stderr, second.stderr);
        assert_eq!(first.exit_code, second.exit_code);
        assert_eq!(first.truncated, second.truncated);
        assert_eq!(first.timed_out, second.timed_out);
    }

    #[cfg(target_os = "linux")]
    fn process_running_with_arg(arg: &str) -> bool {
        let Ok(entries) = std::fs::read_dir("/proc") else {
            return false;
        };
        entries.flatten().any(|entry| {
            std::fs::read(entry.path().join("cmdline"))
                .map(|cmdline| cmdline.split(|b| *b == 0).any(|part| part == arg.as_bytes()))
                .unwrap_or(false)
        })
    }

    #[cfg(target_os = "linux")]
    async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
        for _ in 0..100 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dropping_execution_kills_child() {
        // Fractional seconds make the argv unique to this test run
        let marker = format!(
            "3600.{}{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .subsec_nanos()
        );
        let tool = ToolDefinition::new("sleep", "Sleep", "sleep {secs}").with_parameter(
            "secs",
            ParameterSpec::new(ParamType::String, "Seconds"),
            true,
        );
        let arguments = args(&[("secs", &[&marker])]);
        let limits = ExecutionLimits::new(Duration::from_secs(3600), 5000);

        let task = tokio::spawn(async move {
            LocalCommandExecutor::new()
                .execute(&tool, &arguments, &limits)
                .await
        });

        assert!(wait_until(|| process_running_with_arg(&marker)).await);

        task.abort();
        assert!(task.await.unwrap_err().is_cancelled());

        assert!(wait_until(|| !process_running_with_arg(&marker)).await);
    }
}
