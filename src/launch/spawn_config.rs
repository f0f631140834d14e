use std::process::{Command, ExitStatus};

use thiserror::Error;

/// Errors from launching Claude Code.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to launch '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration for launching the Claude Code process.
///
/// Owns the command and the user's pass-through args; the provider's
/// environment is supplied per build.
pub struct LaunchConfig {
    command: String,
    base_args: Vec<String>,
}

/// Ready-to-use args and env for [`launch`].
#[derive(Debug)]
pub struct LaunchParams {
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl LaunchConfig {
    pub fn new(command: String, base_args: Vec<String>) -> Self {
        Self { command, base_args }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Build launch parameters.
    ///
    /// A user `--settings` flag is dropped so it cannot shadow `env`.
    pub fn build(&self, env: Vec<(String, String)>) -> LaunchParams {
        let args = strip_flags(&self.base_args, &["--settings"]);
        LaunchParams { args, env }
    }
}

/// Run the command to completion with an explicit environment.
///
/// The child inherits stdio and the parent's environment; `params.env`
/// is layered on top without touching this process's own environment.
pub fn launch(command: &str, params: &LaunchParams) -> Result<ExitStatus, LaunchError> {
    tracing::info!(
        "Launching {} with {} args and {} env vars",
        command,
        params.args.len(),
        params.env.len()
    );

    Command::new(command)
        .args(&params.args)
        .envs(params.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .status()
        .map_err(|source| LaunchError::Spawn {
            command: command.to_string(),
            source,
        })
}

/// Remove flags and their values from an argument list.
///
/// Handles `--flag value`, `--flag=value` and bare `--flag`. A flag's
/// next argument is consumed as its value only if it does not start
/// with `--`.
fn strip_flags(args: &[String], flags: &[&str]) -> Vec<String> {
    let mut filtered = Vec::new();
    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        let name = arg.split_once('=').map_or(arg.as_str(), |(name, _)| name);
        if flags.contains(&name) {
            if name == arg.as_str() {
                if let Some(next) = iter.peek() {
                    if !next.starts_with("--") {
                        iter.next();
                    }
                }
            }
            continue;
        }
        filtered.push(arg.clone());
    }
    filtered
}
