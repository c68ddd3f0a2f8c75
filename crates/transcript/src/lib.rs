mod diff;
mod error;
mod merge;
mod store;
mod types;

pub use diff::find_new_text;
pub use error::Error;
pub use merge::{MERGE_WINDOW_SECS, merge_chunks};
pub use store::{TranscriptWriter, read_chunks};
pub use types::{MergedUtterance, TranscriptChunk};
