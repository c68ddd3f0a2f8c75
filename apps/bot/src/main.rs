use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::prelude::*;

use huddle_session_core::{
    EndCause, ScriptStep, ScriptedSurface, SessionConfig, SessionController, meeting,
};

/// One automated call participant: joins the meeting, captures live
/// captions, and appends deduplicated transcript chunks to
/// `<transcripts-dir>/<session-id>.jsonl`. Prints the final session state.
#[derive(Parser)]
#[command(name = "huddle-bot")]
struct Cli {
    /// Meeting invite URL.
    meeting_url: String,

    /// Session id; minted when not supplied.
    #[arg(env = "BOT_SESSION_ID")]
    session_id: Option<String>,

    #[arg(long, env = "BOT_TRANSCRIPTS_DIR", default_value = "transcripts")]
    transcripts_dir: PathBuf,

    /// Drive the session from a scripted surface-event file instead of a
    /// live conferencing surface.
    #[arg(long, env = "BOT_SCRIPT")]
    script: PathBuf,

    /// Run the browsing surface with a visible window.
    #[arg(long)]
    headed: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let session_id = cli
        .session_id
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let transcript_path = cli.transcripts_dir.join(format!("{session_id}.jsonl"));

    let target = meeting::to_web_client_url(&cli.meeting_url);
    tracing::info!(session_id = %session_id, %target, headed = cli.headed, "session_starting");

    let script = std::fs::read_to_string(&cli.script).expect("failed to read script file");
    let steps: Vec<ScriptStep> = serde_json::from_str(&script).expect("invalid script file");

    let surface = ScriptedSurface::new();
    surface.play(steps);

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutdown_requested");
        shutdown.cancel();
    });

    let config = SessionConfig::new(session_id, transcript_path).with_meeting_url(target);
    let controller = SessionController::new(config, Arc::new(surface));
    let report = controller.run(cancel).await;

    // The final state name is the process's contract with its supervisor.
    println!("{}", report.state);

    if let EndCause::Fault(reason) = &report.cause {
        tracing::error!(%reason, "session_faulted");
        std::process::exit(1);
    }
}
