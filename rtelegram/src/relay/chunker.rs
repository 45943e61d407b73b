//! Splits rendered text into transport-sized segments.
//!
//! Limits are counted in characters, the unit the chat transport enforces.
//! A segment ends just after the last newline that fits in the window so a
//! rendered line stays in one message; a window without any newline is cut
//! at the character limit.

/// Default per-message character limit of the chat transport
pub const DEFAULT_MESSAGE_LIMIT: usize = 4096;

/// Split `text` into segments of at most `limit` characters.
///
/// Concatenating the result reproduces `text` exactly. Empty input yields no
/// segments.
pub fn chunk(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut remaining = text;

    // nth(limit) exists only while more than `limit` characters remain
    while let Some((window_end, _)) = remaining.char_indices().nth(limit) {
        let window = &remaining[..window_end];
        let cut = match window.rfind('\n') {
            Some(newline) => newline + 1,
            None => window_end,
        };
        debug_assert!(remaining.is_char_boundary(cut));

        chunks.push(remaining[..cut].to_string());
        remaining = &remaining[cut..];
    }

    if !remaining.is_empty() {
        chunks.push(remaining.to_string());
    }
    chunks
}
