use std::future::Future;
use std::time::Duration;

/// Stable synthetic identity of one caption-rendering region. Assigned by
/// the surface backend; valid for the region's on-screen lifetime.
pub type RegionId = u64;

/// Stable synthetic identity of one caption text element within a region.
/// Distinct from the speaker: a later element for the same speaker gets a
/// fresh identity.
pub type ElementId = u64;

/// A participant's caption-attribution element: either an avatar image or a
/// rendered-initials fallback. [`AvatarRef::speaker_key`] is the opaque
/// SpeakerKey used before resolution to a display name.
///
/// Keys are not stable across a representation change (image ↔ initials)
/// for the same person. Accepted limitation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvatarRef {
    Image { src: String },
    Initials { text: String },
}

impl AvatarRef {
    pub fn speaker_key(&self) -> String {
        match self {
            Self::Image { src } => src.clone(),
            Self::Initials { text } => text.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ParticipantRow {
    pub display_name: Option<String>,
    pub avatar: Option<AvatarRef>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CaptionElement {
    pub id: ElementId,
    pub text: String,
    #[serde(default)]
    pub icon: Option<AvatarRef>,
}

/// One caption-rendering region: the UI subtree holding the live,
/// continuously-rewritten caption line(s) for one actively-speaking
/// participant.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CaptionRegion {
    pub id: RegionId,
    #[serde(default)]
    pub icon: Option<AvatarRef>,
    pub elements: Vec<CaptionElement>,
}

#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("control not found: {0}")]
    ControlNotFound(&'static str),
    #[error("surface closed")]
    Closed,
    #[error("{0}")]
    Other(String),
}

/// Seam to the conferencing UI.
///
/// One implementation drives one automated browsing session; everything the
/// session controller, speaker directory, and caption watcher need from the
/// platform goes through here. Signal waits resolve when the corresponding
/// indicator appears and are meant to be raced with `tokio::select!`; the
/// losing wait is dropped, never cancelled.
pub trait CallSurface: Send + Sync + 'static {
    /// Pre-admission setup: navigate to the meeting, mute the microphone,
    /// stop video, and fill in the display name. Failures are survivable;
    /// the admission race decides whether the join actually landed.
    fn join(
        &self,
        target_url: &str,
        display_name: &str,
    ) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Resolves when the "waiting for the host" banner is visible.
    fn waiting_room_shown(&self) -> impl Future<Output = ()> + Send;

    /// Resolves when an in-call-only control (e.g. the mute button) is
    /// visible, meaning the session was admitted.
    fn admitted(&self) -> impl Future<Output = ()> + Send;

    /// Resolves when a "meeting ended" or "you were removed" indicator
    /// appears.
    fn call_ended(&self) -> impl Future<Output = ()> + Send;

    fn open_overflow_menu(&self) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    fn toggle_captions(&self) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Wait for the captions-enabled confirmation toast. `false` on timeout.
    fn caption_confirmation(&self, timeout: Duration) -> impl Future<Output = bool> + Send;

    fn save_caption_settings(&self) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    fn open_participant_panel(&self) -> impl Future<Output = Result<(), SurfaceError>> + Send;

    /// Current participant rows, or `None` when the list container is
    /// absent (panel closed, virtualized list not mounted).
    fn participant_rows(&self) -> Option<Vec<ParticipantRow>>;

    /// Resolves on the next structural change of the participant list.
    fn roster_changed(&self) -> impl Future<Output = ()> + Send;

    /// Current caption regions, one per actively-speaking participant.
    fn caption_regions(&self) -> Vec<CaptionRegion>;

    /// Resolves on the next structural change under any caption region.
    fn captions_changed(&self) -> impl Future<Output = ()> + Send;

    /// Resolves on the next structural change anywhere in the document.
    /// Used to discover the first caption region.
    fn document_changed(&self) -> impl Future<Output = ()> + Send;

    /// Tear down the browsing session. Idempotent.
    fn close(&self) -> impl Future<Output = ()> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_key_is_trimmed() {
        let avatar = AvatarRef::Initials {
            text: " AB ".to_string(),
        };
        assert_eq!(avatar.speaker_key(), "AB");
    }

    #[test]
    fn image_key_is_the_source() {
        let avatar = AvatarRef::Image {
            src: "https://cdn.example.com/a.png".to_string(),
        };
        assert_eq!(avatar.speaker_key(), "https://cdn.example.com/a.png");
    }
}
