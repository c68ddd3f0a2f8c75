use std::path::PathBuf;
use std::time::Duration;

/// Per-session tunables. Defaults mirror the platform's observed behavior;
/// tests shrink the deadlines.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub session_id: String,
    pub transcript_path: PathBuf,
    /// Web-client URL the surface navigates to before the admission race.
    /// Unset means the surface is already on the meeting page.
    pub meeting_url: Option<String>,
    /// Name filled into the pre-join form.
    pub display_name: String,
    /// How long the first waiting-room/in-call indicator may take to appear
    /// after navigation. Elapsing is treated as an automation fault.
    pub join_deadline: Duration,
    /// How long to wait for admission once in the waiting room.
    pub waiting_room_deadline: Duration,
    /// Caption scan backstop interval.
    pub poll_interval: Duration,
    /// How long to wait for the captions-enabled confirmation toast before
    /// falling back to the settings dialog.
    pub toast_timeout: Duration,
}

impl SessionConfig {
    pub fn new(session_id: impl Into<String>, transcript_path: impl Into<PathBuf>) -> Self {
        Self {
            session_id: session_id.into(),
            transcript_path: transcript_path.into(),
            meeting_url: None,
            display_name: "Notetaker Bot".to_string(),
            join_deadline: Duration::from_secs(15),
            waiting_room_deadline: Duration::from_secs(5 * 60),
            poll_interval: Duration::from_millis(500),
            toast_timeout: Duration::from_secs(3),
        }
    }

    pub fn with_meeting_url(mut self, url: impl Into<String>) -> Self {
        self.meeting_url = Some(url.into());
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_join_deadline(mut self, deadline: Duration) -> Self {
        self.join_deadline = deadline;
        self
    }

    pub fn with_waiting_room_deadline(mut self, deadline: Duration) -> Self {
        self.waiting_room_deadline = deadline;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_toast_timeout(mut self, timeout: Duration) -> Self {
        self.toast_timeout = timeout;
        self
    }
}
