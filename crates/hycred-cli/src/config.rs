//! # Config Subcommand
//!
//! Prints the registry configuration resolved from the environment, so an
//! operator can confirm what a deployment will run with.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use hycred_registry::RegistryConfig;

/// Output encoding for `hycred config`.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

/// Arguments for the `hycred config` subcommand.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Output encoding.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Write to a file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Execute the config subcommand.
pub fn run_config(args: &ConfigArgs) -> Result<u8> {
    let config = RegistryConfig::from_env().context("invalid registry configuration")?;
    let text = render(&config, args.format)?;
    crate::emit(&text, args.output.as_deref())?;
    Ok(0)
}

fn render(config: &RegistryConfig, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(config)?,
        Format::Yaml => serde_yaml::to_string(config)?,
    })
}
