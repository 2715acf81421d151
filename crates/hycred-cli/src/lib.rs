//! # hycred-cli — Command Line Front End
//!
//! Provides the `hycred` binary.
//!
//! ## Subcommands
//!
//! - `hycred replay <script.yaml>`: run a scripted sequence of registry
//!   operations against a fresh in-memory registry and print the outcome.
//! - `hycred config`: print the configuration the environment yields.
//!
//! ```bash
//! MIN_VERIFICATION_COUNT=3 hycred -v replay demos/batch.yaml --events
//! hycred config
//! ```

pub mod config;
pub mod replay;
pub mod script;

use std::path::Path;

use anyhow::{Context, Result};

/// Write `text` to `path`, or stdout when no path is given.
pub fn emit(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
