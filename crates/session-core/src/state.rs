/// Call-admission state machine. `Ended` is terminal; an in-progress call
/// has no deadline, so `InCall` can persist for hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    Joining,
    WaitingRoom,
    InCall,
    Ended,
}

/// Why the session stopped driving the call.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EndCause {
    /// The platform reported the meeting over, or the participant was
    /// removed.
    MeetingEnded,
    /// The waiting-room deadline elapsed without admission. Expected
    /// outcome, not a fault.
    AdmissionTimeout,
    /// External cancellation (supervisory shutdown).
    Shutdown,
    /// Unexpected automation failure; the session was abandoned in the
    /// last-reached state.
    Fault(String),
}

/// Final report of one session run, returned regardless of which path led
/// to termination.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionReport {
    pub session_id: String,
    pub state: SessionState,
    pub cause: EndCause,
    /// States in the order they were entered.
    pub path: Vec<SessionState>,
}

impl SessionReport {
    pub fn visited(&self, state: SessionState) -> bool {
        self.path.contains(&state)
    }
}
