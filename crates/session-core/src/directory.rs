use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio_util::sync::CancellationToken;

use crate::surface::{AvatarRef, CallSurface, ParticipantRow};

/// Live SpeakerKey → display-name map, rebuilt wholesale from the
/// participant list on every roster change. Roster mutations are
/// infrequent, so correctness wins over incremental patching.
///
/// Handles are cheap clones sharing one map; the rebuild loop is the single
/// writer, the caption watcher reads.
#[derive(Debug, Clone, Default)]
pub struct SpeakerDirectory {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl SpeakerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display name for an attribution element, falling back to the raw
    /// speaker key when the roster has no entry for it.
    pub fn resolve(&self, avatar: &AvatarRef) -> String {
        let key = avatar.speaker_key();
        self.inner
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or(key)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().is_empty()
    }

    /// Replace the whole map from the current participant rows. Rows
    /// missing a name or an avatar are skipped.
    pub fn rebuild(&self, rows: &[ParticipantRow]) {
        let map: HashMap<String, String> = rows
            .iter()
            .filter_map(|row| {
                let name = row.display_name.as_deref()?.trim();
                let key = row.avatar.as_ref()?.speaker_key();
                (!name.is_empty() && !key.is_empty()).then(|| (key, name.to_string()))
            })
            .collect();

        tracing::debug!(participants = map.len(), "speaker_directory_rebuilt");
        *self.inner.write().unwrap() = map;
    }

    /// Build once from the open panel, then rebuild on every structural
    /// change notification. An absent list container is logged and
    /// tolerated; roster changes simply go unobserved until it appears.
    pub async fn run<S: CallSurface>(self, surface: Arc<S>, cancel: CancellationToken) {
        match surface.participant_rows() {
            Some(rows) => self.rebuild(&rows),
            None => tracing::warn!("participant_list_unavailable"),
        }

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = surface.roster_changed() => {
                    if let Some(rows) = surface.participant_rows() {
                        self.rebuild(&rows);
                    }
                }
            }
        }
    }
}
