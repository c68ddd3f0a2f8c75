use crate::surface::SurfaceError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("no waiting-room or in-call indicator within the join deadline")]
    JoinDetectionTimeout,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Transcript(#[from] huddle_transcript::Error),
}
