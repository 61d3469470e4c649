use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use hangle::banner::{BannerInfo, print_banner, print_session_summary};
use hangle::consts::{DEFAULT_CONNECT_TIMEOUT, EPHEMERAL_DB, default_db_path};
use hangle::engine::Engine;
use hangle::engine::poller::PollerEngine;
use hangle::eval::Environment;
use hangle::logging;
use hangle::transcript::sqlite::SqliteTranscript;
use hangle::transport::http::{HttpConfig, HttpTransport};

#[derive(Parser)]
#[command(
    name = "hangle",
    version,
    about = "Evaluate commands from a remote counterpart over an HTTP long-poll tunnel."
)]
struct Cli {
    /// Tunnel endpoint URL
    url: String,

    /// SQLite database for the turn transcript (use :memory: for ephemeral)
    #[arg(short, long)]
    transcript: Option<String>,

    /// JSON object whose entries are bound in the environment at startup
    #[arg(short, long)]
    seed: Option<PathBuf>,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT.as_secs())]
    connect_timeout: u64,

    /// Don't print the startup banner
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init()?;

    let mut env = Environment::for_process(&cli.url);
    if let Some(seed) = &cli.seed {
        let bound = env.seed_from_file(seed)?;
        info!(bound, path = %seed.display(), "seeded environment");
    }

    let transport = HttpTransport::new(
        &cli.url,
        HttpConfig {
            connect_timeout: Duration::from_secs(cli.connect_timeout),
        },
    )?;

    let transcript_path = cli
        .transcript
        .unwrap_or_else(|| default_db_path().to_string_lossy().into_owned());
    if transcript_path != EPHEMERAL_DB
        && let Some(parent) = Path::new(&transcript_path).parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let transcript = SqliteTranscript::new(&transcript_path)?;
    info!(session = transcript.session(), path = %transcript_path, "recording transcript");

    if !cli.quiet {
        let transcript_label = if transcript_path == EPHEMERAL_DB {
            "ephemeral"
        } else {
            &transcript_path
        };
        print_banner(&BannerInfo {
            endpoint: transport.endpoint().as_str(),
            transcript: transcript_label,
            bindings: env.len(),
        });
    }

    let mut engine = PollerEngine::new(Arc::new(transport), env, Arc::new(transcript));
    let result = engine.run().await;

    print_session_summary(engine.stats());
    result.map(|_| ())
}
