use crate::types::{MergedUtterance, TranscriptChunk};

/// Chunks from the same speaker closer together than this merge into one
/// utterance. Strict comparison: a gap of exactly this many seconds splits.
pub const MERGE_WINDOW_SECS: f64 = 2.0;

/// Merge adjacent same-speaker chunks within [`MERGE_WINDOW_SECS`] into
/// display-ready utterances. Stateless; run on read, never on write.
pub fn merge_chunks<I>(chunks: I) -> Vec<MergedUtterance>
where
    I: IntoIterator<Item = TranscriptChunk>,
{
    let mut merged: Vec<MergedUtterance> = Vec::new();

    for chunk in chunks {
        match merged.last_mut() {
            Some(last)
                if last.speaker == chunk.speaker
                    && chunk.time - last.time < MERGE_WINDOW_SECS =>
            {
                last.text.push(' ');
                last.text.push_str(&chunk.text);
                last.time = chunk.time;
            }
            _ => merged.push(chunk.into()),
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(speaker: &str, text: &str, time: f64) -> TranscriptChunk {
        TranscriptChunk {
            speaker: speaker.to_string(),
            text: text.to_string(),
            time,
        }
    }

    #[test]
    fn close_chunks_from_same_speaker_merge() {
        let merged = merge_chunks([chunk("ada", "hello", 10.0), chunk("ada", "there", 11.5)]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "hello there");
        assert_eq!(merged[0].time, 11.5);
    }

    #[test]
    fn distant_chunks_from_same_speaker_split() {
        let merged = merge_chunks([chunk("ada", "hello", 10.0), chunk("ada", "there", 13.0)]);

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn gap_of_exactly_the_window_splits() {
        let merged = merge_chunks([chunk("ada", "hello", 10.0), chunk("ada", "there", 12.0)]);

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn speaker_change_always_splits() {
        let merged = merge_chunks([
            chunk("ada", "one", 10.0),
            chunk("grace", "two", 10.1),
            chunk("ada", "three", 10.2),
        ]);

        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn window_is_measured_chunk_to_chunk() {
        // Each hop is under the window even though the run spans more than it.
        let merged = merge_chunks([
            chunk("ada", "a", 10.0),
            chunk("ada", "b", 11.5),
            chunk("ada", "c", 13.0),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].text, "a b c");
        assert_eq!(merged[0].time, 13.0);
    }

    #[test]
    fn merging_is_idempotent() {
        let once = merge_chunks([
            chunk("ada", "hello", 10.0),
            chunk("ada", "there", 11.0),
            chunk("grace", "hi", 11.2),
        ]);

        let again = merge_chunks(once.clone().into_iter().map(|u| TranscriptChunk {
            speaker: u.speaker,
            text: u.text,
            time: u.time,
        }));

        assert_eq!(once, again);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(merge_chunks([]).is_empty());
    }
}
