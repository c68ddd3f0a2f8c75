use std::process::Stdio;
use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use utoipa::ToSchema;

use huddle_session_core::meeting;
use huddle_transcript::{MergedUtterance, merge_chunks, read_chunks};

use crate::config::{BotApiConfig, Launcher};
use crate::error::{BotApiError, Result};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InviteRequest {
    pub meeting_url: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InviteResponse {
    pub status: String,
    pub session_id: uuid::Uuid,
}

/// Validate the invite, mint a session id, and start the session. Replies
/// immediately; the transcript becomes available as the session writes it.
pub(crate) async fn invite(
    State(config): State<Arc<BotApiConfig>>,
    Json(request): Json<InviteRequest>,
) -> Result<Json<InviteResponse>> {
    if !meeting::is_meeting_url(&request.meeting_url) {
        return Err(BotApiError::BadRequest(
            "not a recognized meeting URL".to_string(),
        ));
    }

    let session_id = uuid::Uuid::new_v4();
    launch(&config, &request.meeting_url, &session_id)?;
    tracing::info!(session_id = %session_id, "session_invited");

    Ok(Json(InviteResponse {
        status: "invited".to_string(),
        session_id,
    }))
}

/// Merged utterances for a session. A session with no transcript file yet
/// yields an empty list, not an error; a malformed record fails the whole
/// request.
pub(crate) async fn transcript(
    State(config): State<Arc<BotApiConfig>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<MergedUtterance>>> {
    // Session ids are UUIDs; parsing also keeps the id path-safe.
    let session_id: uuid::Uuid = session_id
        .parse()
        .map_err(|_| BotApiError::BadRequest("invalid session id".to_string()))?;

    match read_chunks(config.transcript_path(&session_id)).await {
        Ok(chunks) => Ok(Json(merge_chunks(chunks))),
        Err(huddle_transcript::Error::Io(err))
            if err.kind() == std::io::ErrorKind::NotFound =>
        {
            Ok(Json(vec![]))
        }
        Err(err) => Err(err.into()),
    }
}

fn launch(config: &BotApiConfig, meeting_url: &str, session_id: &uuid::Uuid) -> Result<()> {
    let (program, args) = match &config.launcher {
        Launcher::Manual => {
            tracing::info!(session_id = %session_id, "launcher_manual_noop");
            return Ok(());
        }
        Launcher::Spawn { program, args } => (program, args),
    };

    let mut child = tokio::process::Command::new(program)
        .args(args)
        .arg(meeting_url)
        .arg(session_id.to_string())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| BotApiError::Launch(err.to_string()))?;

    if let Some(stdout) = child.stdout.take() {
        relay_output(*session_id, stdout, false);
    }
    if let Some(stderr) = child.stderr.take() {
        relay_output(*session_id, stderr, true);
    }

    let session_id = *session_id;
    tokio::spawn(async move {
        match child.wait().await {
            Ok(status) => {
                tracing::info!(session_id = %session_id, code = ?status.code(), "session_process_exited")
            }
            Err(err) => {
                tracing::warn!(session_id = %session_id, error = %err, "session_process_wait_failed")
            }
        }
    });

    Ok(())
}

fn relay_output(
    session_id: uuid::Uuid,
    stream: impl tokio::io::AsyncRead + Unpin + Send + 'static,
    is_err: bool,
) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if is_err {
                tracing::warn!(session_id = %session_id, line, "session_stderr");
            } else {
                tracing::info!(session_id = %session_id, line, "session_stdout");
            }
        }
    });
}
