//! Meeting-link helpers: validation for job submission, and the join-link →
//! web-client rewrite the automated session navigates to.

use std::sync::LazyLock;

use regex::Regex;

static MEETING_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)zoom\.(us|com)/(?:j|s|wc/join)/(\d+)").unwrap()
});

static JOIN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(https://[^/]+)/j/(\d+)(?:\?(.*))?$").unwrap());

/// Loose validation of a meeting invite URL, applied before a session is
/// launched for it.
pub fn is_meeting_url(url: &str) -> bool {
    MEETING_URL.is_match(url)
}

/// Rewrite a `/j/<id>` join link to its in-browser web-client form,
/// preferring the browser flow over the native-app handoff. Links already
/// in another shape pass through unchanged.
pub fn to_web_client_url(url: &str) -> String {
    let Some(caps) = JOIN_LINK.captures(url) else {
        return url.to_string();
    };

    let host = &caps[1];
    let id = &caps[2];
    match caps.get(3).map(|m| m.as_str()).filter(|q| !q.is_empty()) {
        Some(query) => format!("{host}/wc/join/{id}?{query}&prefer=1&browser=1"),
        None => format!("{host}/wc/join/{id}?prefer=1&browser=1"),
    }
}
