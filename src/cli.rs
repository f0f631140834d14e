//! Command dispatch for the `claude-switch` binary.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::config::{mask_secret, AuthKeyName, Config};
use crate::launch::{launch, EnvSet, LaunchConfig};
use crate::provider::{
    fields, registry, ConfigureRequest, DefaultTarget, ProviderSettingsStore, SettingsError,
    TokenSource,
};

#[derive(Debug, Parser)]
#[command(
    name = "claude-switch",
    version,
    about = "Switch the model provider used by Claude Code"
)]
pub struct Cli {
    /// Directory holding provider settings (overrides config)
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Path to config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List known providers and their configuration state
    #[command(alias = "ls")]
    List,
    /// Create or update a provider's settings
    Configure {
        provider: String,
        /// API token; `-` reads one line from stdin. Empty keeps the stored token.
        #[arg(long)]
        token: Option<String>,
        #[arg(long, value_name = "URL")]
        base_url: Option<String>,
        #[arg(long)]
        model: Option<String>,
    },
    /// Print a stored settings field, or the whole bundle (secrets masked)
    Get {
        provider: String,
        field: Option<String>,
    },
    /// Print a provider's settings file path
    Path { provider: String },
    /// Delete a provider's settings file
    Remove { provider: String },
    /// Print or set the default model
    Default { model: Option<String> },
    /// Launch Claude Code with a provider (default model when omitted)
    Run {
        provider: Option<String>,
        /// One of the provider's available models
        #[arg(long)]
        model: Option<String>,
        /// Arguments passed through to Claude Code
        #[arg(last = true)]
        args: Vec<String>,
    },
}

/// Execute a parsed command. Returns the process exit code.
pub fn run(cli: Cli) -> Result<i32> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    let mut store = ProviderSettingsStore::from_config(&config);
    if let Some(dir) = cli.dir {
        store = ProviderSettingsStore::new(dir)
            .with_api_timeout_ms(config.defaults.api_timeout_ms)
            .with_overrides(config.providers.clone());
    }

    match cli.command {
        Commands::List => list(&store),
        Commands::Configure {
            provider,
            token,
            base_url,
            model,
        } => configure(&store, provider, token, base_url, model),
        Commands::Get { provider, field } => get(&store, &provider, field.as_deref()),
        Commands::Path { provider } => {
            println!("{}", store.resolve_path(&provider)?.display());
            Ok(0)
        }
        Commands::Remove { provider } => {
            if store.remove(&provider)? {
                println!("Removed {provider} settings");
            } else {
                println!("{provider} was not configured");
            }
            Ok(0)
        }
        Commands::Default { model: None } => {
            println!("{}", store.get_default_model());
            Ok(0)
        }
        Commands::Default { model: Some(model) } => {
            store.set_default_model(&model)?;
            println!("Default model: {}", model.trim());
            Ok(0)
        }
        Commands::Run {
            provider,
            model,
            args,
        } => run_claude(&store, &config, provider, model, args),
    }
}

/// Exit code for an error returned by [`run`].
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<SettingsError>()
        .map(SettingsError::exit_code)
        .unwrap_or(1)
}

fn list(store: &ProviderSettingsStore) -> Result<i32> {
    let default_provider = match store.resolve_default_target() {
        Ok(DefaultTarget::Provider { def, .. }) => Some(def.id),
        _ => None,
    };

    for row in store.status() {
        let marker = if default_provider == Some(row.provider_id) { "*" } else { " " };
        match &row.config {
            Some(config) => println!(
                "{} {:<10} {:<18} {:<24} {}",
                marker,
                row.provider_id,
                row.display_name,
                config.model_name,
                config.auth_token.preview()
            ),
            None => println!(
                "{} {:<10} {:<18} not configured",
                marker, row.provider_id, row.display_name
            ),
        }
    }
    Ok(0)
}

fn configure(
    store: &ProviderSettingsStore,
    provider: String,
    token: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
) -> Result<i32> {
    // Fail on unknown ids before prompting.
    store.resolve_path(&provider)?;

    let token = match token {
        Some(t) if t == "-" => Some(read_line(io::stdin().lock())?),
        Some(t) => Some(t),
        None if io::stdin().is_terminal() => Some(prompt_token(&provider)?),
        None => None,
    };

    let mut request = ConfigureRequest::new(provider);
    request.token = token;
    request.base_url = base_url;
    request.model = model;

    let outcome = store.configure(&request)?;
    if outcome.migrated_base_url {
        println!("Updated deprecated endpoint to {}", outcome.config.base_url);
    }
    let kept = match outcome.token_source {
        TokenSource::Provided => "",
        TokenSource::CarriedForward => " (kept existing token)",
    };
    println!(
        "Configured {} with {} at {}{}",
        outcome.config.provider_id,
        outcome.config.model_name,
        outcome.path.display(),
        kept
    );
    Ok(0)
}

fn get(store: &ProviderSettingsStore, provider: &str, field: Option<&str>) -> Result<i32> {
    if let Some(field) = field {
        return match store.read_existing_field(provider, field)? {
            Some(value) => {
                println!("{}", display_value(field, &value));
                Ok(0)
            }
            None => Ok(1),
        };
    }

    let names = [
        fields::BASE_URL,
        AuthKeyName::ApiKey.as_str(),
        AuthKeyName::AuthToken.as_str(),
        fields::API_TIMEOUT_MS,
        fields::MODEL,
        fields::SMALL_FAST_MODEL,
        fields::DEFAULT_SONNET_MODEL,
        fields::DEFAULT_OPUS_MODEL,
        fields::DEFAULT_HAIKU_MODEL,
        fields::SUBAGENT_MODEL,
        fields::AVAILABLE_MODELS,
    ];
    let mut found = false;
    for name in names {
        if let Some(value) = store.read_existing_field(provider, name)? {
            println!("{}={}", name, display_value(name, &value));
            found = true;
        }
    }
    Ok(if found { 0 } else { 1 })
}

fn run_claude(
    store: &ProviderSettingsStore,
    config: &Config,
    provider: Option<String>,
    model: Option<String>,
    args: Vec<String>,
) -> Result<i32> {
    let (provider, model) = resolve_target(store, provider, model)?;

    let env = match provider {
        None => EnvSet::new(),
        Some(provider) => {
            let resolved = store
                .load(&provider)?
                .ok_or_else(|| SettingsError::NotConfigured {
                    provider: provider.clone(),
                })?;
            let env = EnvSet::new().with_provider(&resolved, store.api_timeout_ms());
            match model {
                Some(model) if !resolved.available_models.contains(&model) => {
                    return Err(SettingsError::UnknownModel {
                        model,
                        scope: format!("provider '{provider}'"),
                    }
                    .into());
                }
                Some(model) => env.with_model(&model),
                None => env,
            }
        }
    };

    let launch_config = LaunchConfig::new(config.defaults.command.clone(), args);
    let params = launch_config.build(env.build());
    let status = launch(launch_config.command(), &params)?;
    Ok(status.code().unwrap_or(1))
}

/// Provider and model to launch with.
///
/// Without a provider argument the default model decides. When that is
/// plain Claude Code, `--model` selects the provider offering it.
fn resolve_target(
    store: &ProviderSettingsStore,
    provider: Option<String>,
    model: Option<String>,
) -> Result<(Option<String>, Option<String>), SettingsError> {
    if provider.is_some() {
        return Ok((provider, model));
    }

    match (store.resolve_default_target()?, model) {
        (DefaultTarget::Provider { def, model: pinned }, model) => {
            Ok((Some(def.id.to_string()), model.or(pinned.map(String::from))))
        }
        (DefaultTarget::Plain, None) => Ok((None, None)),
        (DefaultTarget::Plain, Some(model)) => match registry::find_by_model(&model) {
            Some(def) => Ok((Some(def.id.to_string()), Some(model))),
            None => Err(SettingsError::UnknownModel {
                model,
                scope: "any provider".to_string(),
            }),
        },
    }
}

fn display_value(field: &str, value: &str) -> String {
    if AuthKeyName::is_credential_field(field) {
        mask_secret(value)
    } else {
        value.to_string()
    }
}

fn prompt_token(provider: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "Token for {provider} (leave empty to keep existing): ")?;
    stderr.flush()?;
    read_line(io::stdin().lock())
}

fn read_line(mut input: impl BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read token")?;
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_fields_are_masked() {
        assert_eq!(display_value("ANTHROPIC_API_KEY", "sk-abcdefghijk"), "sk-a…");
        assert_eq!(
            display_value("ANTHROPIC_BASE_URL", "https://x"),
            "https://x"
        );
    }

    fn temp_store() -> (tempfile::TempDir, ProviderSettingsStore) {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ProviderSettingsStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn explicit_provider_is_kept() {
        let (_dir, store) = temp_store();
        let target = resolve_target(&store, Some("kimi".into()), None).unwrap();
        assert_eq!(target, (Some("kimi".to_string()), None));
    }

    #[test]
    fn plain_default_without_model_launches_plain() {
        let (_dir, store) = temp_store();
        assert_eq!(resolve_target(&store, None, None).unwrap(), (None, None));
    }

    #[test]
    fn plain_default_with_model_selects_its_provider() {
        let (_dir, store) = temp_store();
        let target = resolve_target(&store, None, Some("glm-4.6".into())).unwrap();
        assert_eq!(target, (Some("glm".to_string()), Some("glm-4.6".to_string())));
    }

    #[test]
    fn plain_default_with_unknown_model_is_rejected() {
        let (_dir, store) = temp_store();
        let err = resolve_target(&store, None, Some("sonnet".into())).unwrap_err();
        assert!(matches!(err, SettingsError::UnknownModel { ref model, .. } if model == "sonnet"));
    }

    #[test]
    fn provider_default_takes_model_argument_over_pinned() {
        let (_dir, store) = temp_store();
        store.set_default_model("kimi-k2-0905-preview").unwrap();

        let pinned = resolve_target(&store, None, None).unwrap();
        assert_eq!(
            pinned,
            (Some("kimi".to_string()), Some("kimi-k2-0905-preview".to_string()))
        );

        let chosen = resolve_target(&store, None, Some("kimi-k2-turbo-preview".into())).unwrap();
        assert_eq!(chosen.1.as_deref(), Some("kimi-k2-turbo-preview"));
    }

    #[test]
    fn read_line_trims_newline() {
        let input = io::Cursor::new("sk-123\nrest");
        assert_eq!(read_line(input).unwrap(), "sk-123");
    }

    #[test]
    fn run_args_after_separator_pass_through() {
        let cli = Cli::try_parse_from([
            "claude-switch",
            "run",
            "glm",
            "--",
            "--resume",
            "abc",
        ])
        .unwrap();
        match cli.command {
            Commands::Run { provider, args, .. } => {
                assert_eq!(provider.as_deref(), Some("glm"));
                assert_eq!(args, vec!["--resume", "abc"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
