//! Chat identity derived from the host app's location.

use crate::model::ChatId;

pub const DEFAULT_MIN_CHAT_ID_LEN: usize = 6;

/// Resolve the conversation currently shown from a location path.
///
/// Takes the last non-empty segment and rejects it when shorter than
/// `min_len` characters, so generic routes such as `/` or `/abc` resolve to
/// `None`. Route prefixes are deliberately not consulted here.
pub fn resolve_chat_id(path: &str, min_len: usize) -> Option<ChatId> {
    let path = strip_query(path);
    let last = path.split('/').filter(|segment| !segment.is_empty()).last()?;
    if last.chars().count() < min_len {
        return None;
    }
    Some(ChatId::new(last))
}

/// Like [`resolve_chat_id`], but only for paths under a known conversation
/// route. Used to recognise conversation links in the host sidebar.
pub fn conversation_chat_id<S: AsRef<str>>(
    path: &str,
    route_prefixes: &[S],
    min_len: usize,
) -> Option<ChatId> {
    let path = strip_query(path);
    let under_known_route = route_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_ref()));
    if !under_known_route {
        return None;
    }
    resolve_chat_id(path, min_len)
}

fn strip_query(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..end]
}
