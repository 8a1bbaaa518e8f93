use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clip_relay::channels::Transport;
use clip_relay::media::{self, YtDlp};
use clip_relay::{Config, Daemon, RunMode, daemon};

/// clip-relay - Telegram bot that downloads videos and sends them back
#[derive(Parser)]
#[command(name = "clip-relay", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "CLIP_RELAY_CONFIG")]
    config: Option<PathBuf>,

    /// How to receive updates (overrides MODE)
    #[arg(long, value_enum)]
    mode: Option<RunMode>,

    /// Webhook listener port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the bot identity
    Whoami,
    /// Show the current webhook registration
    WebhookInfo,
    /// Remove the registered webhook
    DeleteWebhook,
    /// List mobile-friendly formats for a video
    Formats {
        /// Video URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = match cli.verbose {
        0 => "info,clip_relay=info",
        1 => "info,clip_relay=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Whoami => cmd_whoami(&config).await,
            Command::WebhookInfo => cmd_webhook_info(&config).await,
            Command::DeleteWebhook => cmd_delete_webhook(&config).await,
            Command::Formats { url } => cmd_formats(&config, &url).await,
        };
    }

    tracing::info!(mode = %config.mode, port = config.port, "starting clip-relay");

    let daemon = Daemon::new(config)?;
    daemon.run().await?;

    tracing::info!("clip-relay stopped");
    Ok(())
}

fn require_token(config: &Config) -> anyhow::Result<()> {
    if config.telegram_token.trim().is_empty() {
        anyhow::bail!("TELEGRAM_BOT_TOKEN is not set");
    }
    Ok(())
}

async fn cmd_whoami(config: &Config) -> anyhow::Result<()> {
    require_token(config)?;
    let me = daemon::telegram_client(config).get_me().await?;

    println!("Bot Name: {}", me.first_name);
    if let Some(username) = &me.username {
        println!("Bot Username: @{username}");
    }
    println!("Bot ID: {}", me.id);
    Ok(())
}

async fn cmd_webhook_info(config: &Config) -> anyhow::Result<()> {
    require_token(config)?;
    let info = daemon::telegram_client(config).callback_info().await?;

    if info.url.is_empty() {
        println!("No webhook registered (polling mode)");
    } else {
        println!("URL: {}", info.url);
    }
    println!("Custom certificate: {}", info.has_custom_certificate);
    println!("Pending updates: {}", info.pending_update_count);
    if let Some(message) = &info.last_error_message {
        let date = info.last_error_date.unwrap_or_default();
        println!("Last error ({date}): {message}");
    }
    Ok(())
}

async fn cmd_delete_webhook(config: &Config) -> anyhow::Result<()> {
    require_token(config)?;
    daemon::telegram_client(config).deregister_callback().await?;
    println!("Webhook deleted");
    Ok(())
}

async fn cmd_formats(config: &Config, url: &str) -> anyhow::Result<()> {
    let url = url.trim();
    if !media::is_valid_url(url) {
        return Err(clip_relay::Error::Validation(format!("not a YouTube URL: {url}")).into());
    }

    let ytdlp = YtDlp::new(&config.ytdlp_path, &config.download_dir);
    let (title, formats) = ytdlp.list_formats(url).await?;
    let mobile = media::filter_mobile_friendly(&formats);

    println!("{}", media::format_message(&title, &mobile));
    Ok(())
}
