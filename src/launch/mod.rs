//! Launching Claude Code against a resolved provider.
//!
//! The provider bundle travels as an explicit env list on the child
//! `Command`; the wrapper never mutates its own environment.

mod env_builder;
mod spawn_config;

pub use env_builder::EnvSet;
pub use spawn_config::{launch, LaunchConfig, LaunchError, LaunchParams};
