const JSON_FENCE_OPEN: &str = "```json";
const FENCE_CLOSE: &str = "```";

/// Removes a leading "```json" and a trailing "```" from a model reply, then
/// trims whitespace.
///
/// Both markers must sit at the very edges of the reply. Unlabelled opening
/// fences and prose around the fence are left as they are.
pub fn strip_code_fences(reply: &str) -> &str {
    let text = reply.strip_prefix(JSON_FENCE_OPEN).unwrap_or(reply);
    let text = text.strip_suffix(FENCE_CLOSE).unwrap_or(text);
    text.trim()
}

/// Shortens long strings for log lines.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
