use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::directory::SpeakerDirectory;
use crate::surface::{CallSurface, CaptionElement, CaptionRegion, ElementId, RegionId};

/// One observed (speaker, full-text, timestamp) reading from a caption
/// element. `text` is the element's *entire accumulated line*, not a delta;
/// the controller diffs it against the previous reading.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionSnapshot {
    /// Resolved display name, or the raw speaker key when unmapped, or
    /// `"unknown"` when the element carries no attribution at all.
    pub speaker: String,
    pub text: String,
    /// Seconds since captions went live, two-decimal precision.
    pub time: f64,
}

/// Watches every caption region and reports a snapshot whenever an
/// element's text changes.
///
/// Two overlapping detection mechanisms feed one scan routine: structural
/// change notifications from the surface, and a fixed-interval poll as a
/// backstop against missed or coalesced notifications. Duplicate triggers
/// are absorbed by the per-element last-seen comparison, so the two paths
/// may interleave arbitrarily.
pub struct CaptionWatcher<S> {
    surface: Arc<S>,
    directory: SpeakerDirectory,
    tx: mpsc::Sender<CaptionSnapshot>,
    poll_interval: Duration,
    started: Instant,
    watched: HashSet<RegionId>,
    last_seen: HashMap<ElementId, String>,
}

impl<S: CallSurface> CaptionWatcher<S> {
    pub fn new(
        surface: Arc<S>,
        directory: SpeakerDirectory,
        tx: mpsc::Sender<CaptionSnapshot>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            surface,
            directory,
            tx,
            poll_interval,
            started: Instant::now(),
            watched: HashSet::new(),
            last_seen: HashMap::new(),
        }
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        // No regions yet: watch the whole document until the first one
        // appears, then stop watching the document.
        if self.surface.caption_regions().is_empty() {
            tracing::info!("no_caption_regions_yet");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = self.surface.document_changed() => {}
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
                if !self.surface.caption_regions().is_empty() {
                    break;
                }
            }
        }

        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        poll.tick().await; // the first tick completes immediately

        loop {
            if !self.scan().await {
                return;
            }
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = self.surface.captions_changed() => {}
                _ = poll.tick() => {}
            }
        }
    }

    /// Scan every region and emit a snapshot per changed element. Returns
    /// `false` once the receiving side is gone.
    async fn scan(&mut self) -> bool {
        let regions = self.surface.caption_regions();
        let mut live: HashSet<ElementId> = HashSet::new();

        for region in &regions {
            if self.watched.insert(region.id) {
                tracing::debug!(region = region.id, "caption_region_attached");
            }

            for element in &region.elements {
                live.insert(element.id);

                let text = element.text.trim();
                if text.is_empty() {
                    continue;
                }
                if self
                    .last_seen
                    .get(&element.id)
                    .is_some_and(|seen| seen == text)
                {
                    continue;
                }

                let snapshot = CaptionSnapshot {
                    speaker: self.attribute(element, region),
                    text: text.to_string(),
                    time: self.elapsed(),
                };
                self.last_seen.insert(element.id, text.to_string());

                if self.tx.send(snapshot).await.is_err() {
                    return false;
                }
            }
        }

        // Detached elements must not pin cache entries forever.
        self.last_seen.retain(|id, _| live.contains(id));
        self.watched
            .retain(|id| regions.iter().any(|region| region.id == *id));

        true
    }

    fn attribute(&self, element: &CaptionElement, region: &CaptionRegion) -> String {
        element
            .icon
            .as_ref()
            .or(region.icon.as_ref())
            .map(|icon| self.directory.resolve(icon))
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn elapsed(&self) -> f64 {
        (self.started.elapsed().as_secs_f64() * 100.0).round() / 100.0
    }
}
