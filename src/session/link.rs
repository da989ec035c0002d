//! Shareable meeting links.

use regex::Regex;
use std::sync::OnceLock;

use crate::calls::CallId;

/// `<base>/meeting/<id>`; a trailing slash on `base_url` is ignored.
pub fn derive_link(base_url: &str, call_id: &CallId) -> String {
    format!("{}/meeting/{}", base_url.trim_end_matches('/'), call_id)
}

fn meeting_path_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|/)meeting/([^/?#\s]+)/?(?:[?#].*)?$").expect("valid meeting path regex")
    })
}

/// Extracts the call id from a pasted link, a `/meeting/<id>` path or a bare id.
pub fn parse_join_link(input: &str) -> Option<CallId> {
    let input = input.trim();
    if let Some(captures) = meeting_path_re().captures(input) {
        return CallId::parse(&captures[1]).ok();
    }
    CallId::parse(input).ok()
}
