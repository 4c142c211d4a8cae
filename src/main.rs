//! tg_broadcast CLI - send one message to every linked directory user.
//!
//! Usage:
//!   cargo run --bin tg_broadcast                       # send ./message to everyone
//!   cargo run --bin tg_broadcast -- --dry-run          # only log who would get it
//!   cargo run --bin tg_broadcast -- --message news.html --disable-preview

use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tg_broadcast::{broadcast, Config};

#[derive(Parser, Debug)]
#[command(name = "tg_broadcast")]
#[command(about = "Broadcast a message to directory users with a linked Telegram id", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the message file (overrides MESSAGE_FILE)
    #[arg(short, long)]
    message: Option<PathBuf>,

    /// Telegram parse mode (HTML, MarkdownV2, ...)
    #[arg(long, conflicts_with = "no_parse_mode")]
    parse_mode: Option<String>,

    /// Send the message as plain text
    #[arg(long, default_value_t = false)]
    no_parse_mode: bool,

    /// Disable link previews
    #[arg(long, default_value_t = false)]
    disable_preview: bool,

    /// Request timeout in seconds (overrides REQUEST_TIMEOUT_SECS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Log recipients without sending anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(path) = self.message {
            config.message_file = path;
        }
        if self.no_parse_mode {
            config.parse_mode = None;
        } else if let Some(mode) = self.parse_mode {
            config.parse_mode = Some(mode);
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = secs;
        }
        config.disable_preview = self.disable_preview;
        config.dry_run = self.dry_run;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for local development
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tg_broadcast=info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    cli.apply(&mut config);
    info!(?config, "Starting broadcast");

    let report = broadcast::run(&config).await?;

    if report.failed() > 0 {
        warn!(
            failed = report.failed(),
            total = report.total,
            "Some messages were not delivered, see errors above"
        );
    }

    Ok(())
}
