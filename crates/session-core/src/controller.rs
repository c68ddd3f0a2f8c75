use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use huddle_transcript::{TranscriptChunk, TranscriptWriter, find_new_text};

use crate::config::SessionConfig;
use crate::directory::SpeakerDirectory;
use crate::error::SessionError;
use crate::state::{EndCause, SessionReport, SessionState};
use crate::surface::{CallSurface, SurfaceError};
use crate::watcher::{CaptionSnapshot, CaptionWatcher};

/// Pause between the two caption-toggle triggers so the surface registers
/// the first one.
const MENU_SETTLE: Duration = Duration::from_millis(300);

const SNAPSHOT_CHANNEL_CAPACITY: usize = 64;

/// Drives one call end to end: admission state machine, caption
/// activation, and the snapshot → diff → append pipeline.
///
/// Every transition is decided by racing two waits; whichever resolves
/// first wins and the loser is dropped. All long-lived waits also race the
/// supervisory cancellation token.
pub struct SessionController<S> {
    surface: Arc<S>,
    config: SessionConfig,
    state: SessionState,
    path: Vec<SessionState>,
}

impl<S: CallSurface> SessionController<S> {
    pub fn new(config: SessionConfig, surface: Arc<S>) -> Self {
        Self {
            surface,
            config,
            state: SessionState::Joining,
            path: vec![SessionState::Joining],
        }
    }

    /// Run the session to completion. Always closes the surface and always
    /// returns a report; unexpected failures are caught here and mapped to
    /// the last-reached state rather than propagated.
    pub async fn run(mut self, cancel: CancellationToken) -> SessionReport {
        let cause = match self.drive(&cancel).await {
            Ok(cause) => cause,
            Err(err) => {
                tracing::error!(error = %err, state = %self.state, "session_fault");
                EndCause::Fault(err.to_string())
            }
        };

        self.surface.close().await;
        tracing::info!(state = %self.state, cause = %cause, "session_closed");

        SessionReport {
            session_id: self.config.session_id.clone(),
            state: self.state,
            cause,
            path: self.path,
        }
    }

    fn transition(&mut self, next: SessionState) {
        tracing::info!(from = %self.state, to = %next, "state_transition");
        self.state = next;
        self.path.push(next);
    }

    async fn drive(&mut self, cancel: &CancellationToken) -> Result<EndCause, SessionError> {
        // Pre-join setup is best effort: if navigation or the form really
        // failed, no indicator ever appears and the join deadline reports
        // the fault.
        if let Some(url) = &self.config.meeting_url {
            tracing::info!(%url, name = %self.config.display_name, "joining_meeting");
            if let Err(err) = self.surface.join(url, &self.config.display_name).await {
                tracing::warn!(error = %err, "join_preparation_failed");
            }
        }

        // Whichever indicator appears first decides where we landed.
        tokio::select! {
            _ = cancel.cancelled() => {
                self.transition(SessionState::Ended);
                return Ok(EndCause::Shutdown);
            }
            _ = self.surface.waiting_room_shown() => self.transition(SessionState::WaitingRoom),
            _ = self.surface.admitted() => self.transition(SessionState::InCall),
            _ = tokio::time::sleep(self.config.join_deadline) => {
                return Err(SessionError::JoinDetectionTimeout);
            }
        }

        if self.state == SessionState::WaitingRoom {
            tracing::info!(
                deadline_secs = self.config.waiting_room_deadline.as_secs(),
                "waiting_for_admission"
            );
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.transition(SessionState::Ended);
                    return Ok(EndCause::Shutdown);
                }
                _ = self.surface.admitted() => self.transition(SessionState::InCall),
                _ = tokio::time::sleep(self.config.waiting_room_deadline) => {
                    tracing::warn!("admission_timeout");
                    self.transition(SessionState::Ended);
                    return Ok(EndCause::AdmissionTimeout);
                }
            }
        }

        let cause = self.in_call(cancel).await?;
        self.transition(SessionState::Ended);
        Ok(cause)
    }

    /// Inside the meeting: activate the directory, enable captions (best
    /// effort), start the watcher, then pump snapshots until the call ends.
    async fn in_call(&mut self, cancel: &CancellationToken) -> Result<EndCause, SessionError> {
        let mut writer = TranscriptWriter::open(&self.config.transcript_path).await?;

        let directory = SpeakerDirectory::new();
        let workers = cancel.child_token();

        if let Err(err) = self.surface.open_participant_panel().await {
            tracing::warn!(error = %err, "participant_panel_failed");
        }
        let directory_task = tokio::spawn(
            directory
                .clone()
                .run(self.surface.clone(), workers.clone()),
        );

        // A silent transcript beats a dead session: caption activation
        // failures are logged and swallowed.
        if let Err(err) = self.enable_captions().await {
            tracing::warn!(error = %err, "enable_captions_failed");
        }

        let (tx, mut rx) = mpsc::channel(SNAPSHOT_CHANNEL_CAPACITY);
        let watcher = CaptionWatcher::new(
            self.surface.clone(),
            directory,
            tx,
            self.config.poll_interval,
        );
        let watcher_task = tokio::spawn(watcher.run(workers.clone()));

        // SpeakerKey → last seen full caption line. Lives for the in-call
        // state only.
        let mut last_text: HashMap<String, String> = HashMap::new();

        // No deadline here: a call may run indefinitely.
        let cause = loop {
            tokio::select! {
                _ = cancel.cancelled() => break EndCause::Shutdown,
                _ = self.surface.call_ended() => break EndCause::MeetingEnded,
                Some(snapshot) = rx.recv() => {
                    Self::handle_snapshot(&mut last_text, &mut writer, snapshot).await;
                }
            }
        };

        workers.cancel();
        let _ = directory_task.await;
        let _ = watcher_task.await;

        Ok(cause)
    }

    /// Diff the snapshot against the speaker's previous full line and
    /// append whatever is new. The cache always takes the new full text,
    /// even when the diff comes back empty.
    async fn handle_snapshot(
        last_text: &mut HashMap<String, String>,
        writer: &mut TranscriptWriter,
        snapshot: CaptionSnapshot,
    ) {
        let previous = last_text
            .get(&snapshot.speaker)
            .map(String::as_str)
            .unwrap_or("");
        let new_text = find_new_text(previous, &snapshot.text);
        last_text.insert(snapshot.speaker.clone(), snapshot.text);

        if new_text.is_empty() {
            return;
        }

        let chunk = TranscriptChunk {
            speaker: snapshot.speaker,
            text: new_text,
            time: snapshot.time,
        };
        if let Err(err) = writer.append(&chunk).await {
            tracing::warn!(error = %err, "transcript_append_failed");
        }
    }

    /// Best-effort caption activation: overflow menu (repeat trigger for
    /// the known first-click no-op), toggle twice with a settle pause, then
    /// either see the confirmation toast or fall back to saving the
    /// settings dialog.
    async fn enable_captions(&self) -> Result<(), SurfaceError> {
        self.surface.open_overflow_menu().await?;
        self.surface.open_overflow_menu().await?;

        self.surface.toggle_captions().await?;
        tokio::time::sleep(MENU_SETTLE).await;
        self.surface.toggle_captions().await?;

        if !self
            .surface
            .caption_confirmation(self.config.toast_timeout)
            .await
        {
            tracing::info!("caption_confirmation_not_seen");
            self.surface.save_caption_settings().await?;
        }

        tracing::info!("captions_enabled");
        Ok(())
    }
}
