//! UTF-8 safe byte-budget truncation.

/// Budget used when the caller does not name one.
pub const DEFAULT_MAX_BYTES: usize = 4000;

/// Largest budget a caller may request.
pub const MAX_BYTES_CEILING: usize = 6000;

/// Clamp a caller-supplied budget into `[1, MAX_BYTES_CEILING]`.
pub fn clamp_budget(requested: Option<i64>) -> usize {
    match requested {
        None => DEFAULT_MAX_BYTES,
        Some(n) if n < 1 => 1,
        Some(n) => usize::try_from(n).map_or(MAX_BYTES_CEILING, |n| n.min(MAX_BYTES_CEILING)),
    }
}

/// Longest prefix of `text` whose UTF-8 encoding fits in `max_bytes`.
///
/// A multi-byte character straddling the cut is dropped whole, so the
/// result is always valid text. Input that already fits is returned as is.
pub fn truncate_utf8(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
