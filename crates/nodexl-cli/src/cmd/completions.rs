//! `nodexl completions`: print a shell completion script.

use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `nodexl completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate for, e.g. `bash` or `zsh`.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `command` to stdout.
///
/// Runs before configuration is loaded, so a broken `nodexl.toml` never
/// blocks completion setup.
pub fn run_completions(shell: Shell, command: &mut clap::Command) -> Result<()> {
    let bin_name = command.get_name().to_string();
    let mut out = std::io::stdout().lock();
    generate(shell, command, bin_name, &mut out);
    Ok(())
}
