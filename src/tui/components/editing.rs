//! Text editing primitives shared by the single-line fields and the
//! multi-line message box: UTF-8 safe cursor steps and wrap measurement.
//!
//! Cursor positions are byte offsets that always sit on a char boundary.

/// Wrap settings matching how the message box lays out its text.
pub(crate) fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(usize::from(width.max(1)))
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Number of rows `text` occupies at `width`, never less than one.
/// A trailing newline opens a fresh (empty) row.
pub(crate) fn wrapped_rows(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }
    let rows = textwrap::wrap(text, wrap_options(width));
    let mut count = rows.len().max(1);
    if text.ends_with('\n') && rows.last().is_none_or(|r| !r.is_empty()) {
        count += 1;
    }
    u16::try_from(count).unwrap_or(u16::MAX)
}

/// (row, column) of byte offset `pos` once `text` is wrapped at `width`.
pub(crate) fn cursor_cell(text: &str, pos: usize, width: u16) -> (u16, u16) {
    let before = &text[..pos];
    let row = wrapped_rows(before, width).saturating_sub(1);

    // textwrap trims trailing spaces, so count columns on the raw logical line
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let logical = &before[line_start..];
    let segments = textwrap::wrap(logical, wrap_options(width));
    let consumed: usize = segments
        .iter()
        .take(segments.len().saturating_sub(1))
        .map(|s| s.chars().count())
        .sum();
    let col = logical.chars().count().saturating_sub(consumed);
    (row, u16::try_from(col).unwrap_or(u16::MAX))
}

pub(crate) fn prev_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

pub(crate) fn next_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map(|c| pos + c.len_utf8())
        .unwrap_or(text.len())
}

/// Start of the logical line containing `pos`.
pub(crate) fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// End of the logical line containing `pos` (before its newline).
pub(crate) fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len())
}
