use anyhow::{Context, Result};
use std::io::IsTerminal;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the global fmt subscriber at `level`; colour only on a terminal.
pub fn init_logging(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_ansi(std::io::stdout().is_terminal())
        .with_line_number(true)
        .with_file(true)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("a global tracing subscriber is already installed")?;
    Ok(())
}
