use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

use crate::surface::{
    AvatarRef, CallSurface, CaptionElement, CaptionRegion, ElementId, ParticipantRow, RegionId,
    SurfaceError,
};

/// One timed surface event. `at_ms` is relative to [`ScriptedSurface::play`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    /// The "waiting for the host" banner appears.
    WaitingRoom,
    /// An in-call-only control appears.
    Admit,
    /// The "meeting ended" / "you were removed" indicator appears.
    EndMeeting,
    /// The captions-enabled confirmation toast appears.
    CaptionConfirmation,
    /// The participant list re-renders with these rows.
    Roster { rows: Vec<ParticipantRow> },
    /// A caption element re-renders with its current full text.
    Caption {
        region: RegionId,
        element: ElementId,
        #[serde(default)]
        icon: Option<AvatarRef>,
        #[serde(default)]
        region_icon: Option<AvatarRef>,
        text: String,
    },
    /// A caption region is detached from the document.
    RemoveRegion { region: RegionId },
}

#[derive(Default)]
struct SurfaceState {
    joined_url: Option<String>,
    display_name: Option<String>,
    muted: bool,
    video_stopped: bool,
    roster: Option<Vec<ParticipantRow>>,
    regions: Vec<CaptionRegion>,
    panel_open: bool,
    menu_clicks: u32,
    caption_toggles: u32,
    settings_saved: bool,
    closed: bool,
}

struct Inner {
    state: Mutex<SurfaceState>,
    waiting_room: watch::Sender<bool>,
    admitted: watch::Sender<bool>,
    ended: watch::Sender<bool>,
    confirmation: watch::Sender<bool>,
    roster_notify: Notify,
    caption_notify: Notify,
    document_notify: Notify,
}

/// [`CallSurface`] backend driven by a timed event script instead of a live
/// browsing session. Powers the replay mode of the bot binary and every
/// integration test; a real conferencing backend implements the same trait.
///
/// Signal waits are level-triggered (a signal fired before anyone awaits it
/// still resolves); structural-change waits are edge-triggered, which is
/// exactly the hole the watcher's poll backstop exists to cover.
#[derive(Clone)]
pub struct ScriptedSurface {
    inner: Arc<Inner>,
}

impl Default for ScriptedSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSurface {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SurfaceState::default()),
                waiting_room: watch::channel(false).0,
                admitted: watch::channel(false).0,
                ended: watch::channel(false).0,
                confirmation: watch::channel(false).0,
                roster_notify: Notify::new(),
                caption_notify: Notify::new(),
                document_notify: Notify::new(),
            }),
        }
    }

    /// Apply one surface event immediately.
    pub fn apply(&self, action: ScriptAction) {
        match action {
            ScriptAction::WaitingRoom => {
                let _ = self.inner.waiting_room.send(true);
            }
            ScriptAction::Admit => {
                let _ = self.inner.admitted.send(true);
            }
            ScriptAction::EndMeeting => {
                let _ = self.inner.ended.send(true);
            }
            ScriptAction::CaptionConfirmation => {
                let _ = self.inner.confirmation.send(true);
            }
            ScriptAction::Roster { rows } => {
                self.inner.state.lock().unwrap().roster = Some(rows);
                self.inner.roster_notify.notify_one();
                self.inner.document_notify.notify_one();
            }
            ScriptAction::Caption {
                region,
                element,
                icon,
                region_icon,
                text,
            } => {
                {
                    let mut state = self.inner.state.lock().unwrap();
                    let region_idx = match state.regions.iter().position(|r| r.id == region) {
                        Some(idx) => idx,
                        None => {
                            state.regions.push(CaptionRegion {
                                id: region,
                                icon: None,
                                elements: vec![],
                            });
                            state.regions.len() - 1
                        }
                    };
                    let region = &mut state.regions[region_idx];
                    if region_icon.is_some() {
                        region.icon = region_icon;
                    }
                    match region.elements.iter().position(|e| e.id == element) {
                        Some(idx) => {
                            region.elements[idx].text = text;
                            if icon.is_some() {
                                region.elements[idx].icon = icon;
                            }
                        }
                        None => region.elements.push(CaptionElement {
                            id: element,
                            text,
                            icon,
                        }),
                    }
                }
                self.inner.caption_notify.notify_one();
                self.inner.document_notify.notify_one();
            }
            ScriptAction::RemoveRegion { region } => {
                self.inner
                    .state
                    .lock()
                    .unwrap()
                    .regions
                    .retain(|r| r.id != region);
                self.inner.caption_notify.notify_one();
                self.inner.document_notify.notify_one();
            }
        }
    }

    /// Spawn a task replaying the steps on their relative timeline.
    pub fn play(&self, steps: Vec<ScriptStep>) -> JoinHandle<()> {
        let surface = self.clone();
        tokio::spawn(async move {
            let start = tokio::time::Instant::now();
            for step in steps {
                tokio::time::sleep_until(start + Duration::from_millis(step.at_ms)).await;
                surface.apply(step.action);
            }
        })
    }

    pub fn joined_url(&self) -> Option<String> {
        self.inner.state.lock().unwrap().joined_url.clone()
    }

    pub fn display_name(&self) -> Option<String> {
        self.inner.state.lock().unwrap().display_name.clone()
    }

    pub fn is_muted(&self) -> bool {
        self.inner.state.lock().unwrap().muted
    }

    pub fn is_video_stopped(&self) -> bool {
        self.inner.state.lock().unwrap().video_stopped
    }

    pub fn settings_saved(&self) -> bool {
        self.inner.state.lock().unwrap().settings_saved
    }

    pub fn caption_toggle_count(&self) -> u32 {
        self.inner.state.lock().unwrap().caption_toggles
    }

    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().unwrap().closed
    }

    async fn wait_flag(tx: &watch::Sender<bool>) {
        let mut rx = tx.subscribe();
        let _ = rx.wait_for(|set| *set).await;
    }
}

impl CallSurface for ScriptedSurface {
    async fn join(&self, target_url: &str, display_name: &str) -> Result<(), SurfaceError> {
        let mut state = self.inner.state.lock().unwrap();
        state.joined_url = Some(target_url.to_string());
        state.display_name = Some(display_name.to_string());
        state.muted = true;
        state.video_stopped = true;
        Ok(())
    }

    async fn waiting_room_shown(&self) {
        Self::wait_flag(&self.inner.waiting_room).await;
    }

    async fn admitted(&self) {
        Self::wait_flag(&self.inner.admitted).await;
    }

    async fn call_ended(&self) {
        Self::wait_flag(&self.inner.ended).await;
    }

    async fn open_overflow_menu(&self) -> Result<(), SurfaceError> {
        self.inner.state.lock().unwrap().menu_clicks += 1;
        Ok(())
    }

    async fn toggle_captions(&self) -> Result<(), SurfaceError> {
        let mut state = self.inner.state.lock().unwrap();
        // The real surface ignores the first menu trigger; the menu item
        // only exists after a repeat trigger.
        if state.menu_clicks < 2 {
            return Err(SurfaceError::ControlNotFound("captions menu item"));
        }
        state.caption_toggles += 1;
        Ok(())
    }

    async fn caption_confirmation(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, Self::wait_flag(&self.inner.confirmation))
            .await
            .is_ok()
    }

    async fn save_caption_settings(&self) -> Result<(), SurfaceError> {
        self.inner.state.lock().unwrap().settings_saved = true;
        Ok(())
    }

    async fn open_participant_panel(&self) -> Result<(), SurfaceError> {
        self.inner.state.lock().unwrap().panel_open = true;
        Ok(())
    }

    fn participant_rows(&self) -> Option<Vec<ParticipantRow>> {
        let state = self.inner.state.lock().unwrap();
        if !state.panel_open {
            return None;
        }
        state.roster.clone()
    }

    async fn roster_changed(&self) {
        self.inner.roster_notify.notified().await;
    }

    fn caption_regions(&self) -> Vec<CaptionRegion> {
        self.inner.state.lock().unwrap().regions.clone()
    }

    async fn captions_changed(&self) {
        self.inner.caption_notify.notified().await;
    }

    async fn document_changed(&self) {
        self.inner.document_notify.notified().await;
    }

    async fn close(&self) {
        self.inner.state.lock().unwrap().closed = true;
    }
}
