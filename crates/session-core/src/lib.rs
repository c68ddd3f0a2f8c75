mod config;
mod controller;
mod directory;
mod error;
pub mod meeting;
mod scripted;
mod state;
mod surface;
mod watcher;

pub use config::SessionConfig;
pub use controller::SessionController;
pub use directory::SpeakerDirectory;
pub use error::SessionError;
pub use scripted::{ScriptAction, ScriptStep, ScriptedSurface};
pub use state::{EndCause, SessionReport, SessionState};
pub use surface::{
    AvatarRef, CallSurface, CaptionElement, CaptionRegion, ElementId, ParticipantRow, RegionId,
    SurfaceError,
};
pub use watcher::{CaptionSnapshot, CaptionWatcher};
