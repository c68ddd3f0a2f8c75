/// One persisted increment of caption text, as written to the session's
/// `.jsonl` file. `text` is the newly-appended portion only; concatenating
/// the chunks of a speaker run reproduces the full caption line.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptChunk {
    pub speaker: String,
    pub text: String,
    /// Seconds since session start.
    pub time: f64,
}

/// A display-ready run of same-speaker chunks, produced by
/// [`crate::merge_chunks`] on read. Never persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MergedUtterance {
    pub speaker: String,
    pub text: String,
    /// Time of the last contributing chunk.
    pub time: f64,
}

impl From<TranscriptChunk> for MergedUtterance {
    fn from(chunk: TranscriptChunk) -> Self {
        Self {
            speaker: chunk.speaker,
            text: chunk.text,
            time: chunk.time,
        }
    }
}
