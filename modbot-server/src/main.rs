use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};
use twilight_model::id::Id;

use modbot_common::models::ChatMessage;
use modbot_core::cache::HistoryConfig;

mod replay;

use replay::{ReplayOptions, replay};

#[derive(Parser, Debug, Clone)]
#[command(name = "modbot")]
#[command(author, version, about = "Replay a channel's message dump through the antispam filters")]
struct Args {
    /// JSON file holding an array of messages
    #[arg(long)]
    history: PathBuf,

    /// User id whose behaviour is evaluated
    #[arg(long)]
    author: u64,

    /// Extra settings for the links filter, as JSON
    #[arg(long, default_value = "{}")]
    settings: String,

    /// Evaluate as if the dump were live at this RFC 3339 instant
    #[arg(long)]
    now: Option<String>,

    /// Messages older than this many seconds are dropped from the history
    #[arg(
        long,
        env = "MODBOT_HISTORY_MAX_AGE",
        default_value_t = 600,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    history_max_age: u32,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("modbot: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let raw = fs::read_to_string(&args.history)
        .with_context(|| format!("reading {}", args.history.display()))?;
    let messages: Vec<ChatMessage> =
        serde_json::from_str(&raw).context("parsing message history")?;
    let settings: serde_json::Value =
        serde_json::from_str(&args.settings).context("parsing --settings")?;
    let now = args
        .now
        .as_deref()
        .map(|s| DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)))
        .transpose()
        .context("parsing --now")?;
    let author = Id::new_checked(args.author).context("author id must be non-zero")?;

    info!("modbot: replaying {} messages for {}", messages.len(), author);

    let outcome = replay(ReplayOptions {
        messages,
        author,
        settings,
        now,
        history: HistoryConfig {
            max_age_seconds: Some(args.history_max_age),
            ..HistoryConfig::default()
        },
    })
    .await?;

    if outcome.triggered.is_empty() {
        println!("no filters triggered");
    } else {
        for (key, reason) in &outcome.filter_info {
            println!("{}: {}", key, reason);
        }
        println!("{} related messages", outcome.related_messages.len());
        for msg in &outcome.related_messages {
            println!("  {} {} {}", msg.id, msg.created_at.to_rfc3339(), msg.content);
        }
    }
    Ok(())
}
