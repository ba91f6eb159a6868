//! Shared utility functions.

/// Shorten an utterance for log lines.
///
/// Cuts at `max_bytes` on a UTF-8 character boundary and appends `…` when
/// anything was removed. Newlines are flattened so one turn stays on one line.
pub fn preview(s: &str, max_bytes: usize) -> String {
    let flat = s.replace(['\n', '\r'], " ");
    if flat.len() <= max_bytes {
        return flat;
    }
    let mut end = max_bytes;
    while end > 0 && !flat.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &flat[..end])
}
