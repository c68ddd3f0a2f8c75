/// Extract the newly-appended portion of a caption line.
///
/// The caption surface re-renders a speaker's entire accumulated line on
/// every update, so `current` usually repeats most of `previous`. Returns
/// only what is new:
///
/// - first observation (`previous` empty) passes `current` through,
/// - an unchanged line yields an empty string,
/// - a grown line yields the trimmed remainder after `previous`,
/// - a shifted re-render yields the trimmed remainder after the longest
///   suffix of `previous` that is also a prefix of `current`,
/// - no overlap at all means an unrelated line (speaker change, caption
///   reset) and `current` is returned whole.
pub fn find_new_text(previous: &str, current: &str) -> String {
    if previous.is_empty() {
        return current.to_string();
    }
    if current == previous {
        return String::new();
    }

    if let Some(rest) = current.strip_prefix(previous) {
        return rest.trim().to_string();
    }

    // Longest candidate first, down to a single character.
    for (start, _) in previous.char_indices() {
        let suffix = &previous[start..];
        if let Some(rest) = current.strip_prefix(suffix) {
            return rest.trim().to_string();
        }
    }

    current.to_string()
}
