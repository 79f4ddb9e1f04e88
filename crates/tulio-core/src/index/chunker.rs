//! Content chunking for retrieval

use crate::error::{Result, TulioError};
use std::ops::Range;

/// Default maximum chunk size in bytes
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between fixed-size windows in bytes
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Bytes inspected for NUL when deciding whether content is binary
const BINARY_SNIFF_BYTES: usize = 8192;

/// A chunk produced from one file's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub seq: usize,
    /// Byte offset of `text` in the content
    pub position: usize,
    pub text: String,
}

/// Find a valid char boundary at or before the given byte index
pub(crate) fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Find a valid char boundary at or after the given byte index
fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Decode raw file bytes for chunking
///
/// Binary content (a NUL in the first 8 KiB) and invalid UTF-8 are errors.
/// A leading byte-order mark is dropped.
pub fn prepare_content(path: &str, bytes: &[u8]) -> Result<String> {
    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_BYTES)];
    if sniff.contains(&0) {
        return Err(TulioError::Chunk {
            path: path.to_string(),
            reason: "binary content".to_string(),
        });
    }

    let text = std::str::from_utf8(bytes).map_err(|e| TulioError::Chunk {
        path: path.to_string(),
        reason: format!("not valid UTF-8 (at byte {})", e.valid_up_to()),
    })?;

    Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
}

/// A piece of content that is either packed with neighbours or stands alone
enum Unit {
    Packable(Range<usize>),
    Window(Range<usize>),
}

/// Split content into chunks of at most `max_chunk_size` bytes
///
/// Paragraphs (blank-line separated) are packed greedily. A paragraph over
/// the limit falls back to its lines, and a line over the limit to
/// overlapping fixed-size windows.
pub fn chunk(content: &str, max_chunk_size: usize, overlap: usize) -> Vec<TextChunk> {
    let max = max_chunk_size.max(1);
    let overlap = if overlap >= max { max / 2 } else { overlap };

    let mut units = Vec::new();
    for para in paragraphs(content) {
        if para.len() <= max {
            units.push(Unit::Packable(para));
            continue;
        }
        for line in lines(content, para) {
            if line.len() <= max {
                units.push(Unit::Packable(line));
            } else {
                units.extend(
                    windows(content, line, max, overlap)
                        .into_iter()
                        .map(Unit::Window),
                );
            }
        }
    }

    let mut ranges = Vec::new();
    let mut current: Option<Range<usize>> = None;
    for unit in units {
        match unit {
            Unit::Packable(range) => {
                if let Some(open) = current.as_mut() {
                    if range.end - open.start <= max {
                        open.end = range.end;
                        continue;
                    }
                }
                ranges.extend(current.take());
                current = Some(range);
            }
            Unit::Window(range) => {
                ranges.extend(current.take());
                ranges.push(range);
            }
        }
    }
    ranges.extend(current);

    ranges
        .into_iter()
        .enumerate()
        .map(|(seq, range)| TextChunk {
            seq,
            position: range.start,
            text: content[range].to_string(),
        })
        .collect()
}

/// Ranges of non-blank line runs, trailing whitespace trimmed
fn paragraphs(content: &str) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut open: Option<Range<usize>> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let start = offset;
        offset += line.len();

        let trimmed = line.trim_end();
        if trimmed.trim_start().is_empty() {
            out.extend(open.take());
            continue;
        }

        let lead = trimmed.len() - trimmed.trim_start().len();
        let end = start + trimmed.len();
        match open.as_mut() {
            Some(range) => range.end = end,
            None => open = Some(start + lead..end),
        }
    }
    out.extend(open);
    out
}

/// Trimmed line ranges inside `range`
fn lines(content: &str, range: Range<usize>) -> Vec<Range<usize>> {
    let mut out = Vec::new();
    let mut offset = range.start;
    for line in content[range].split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        if let Some(trimmed) = trim_range(content, start..start + line.len()) {
            out.push(trimmed);
        }
    }
    out
}

/// Fixed-size windows over `range`, preferring a space in the last 30%
fn windows(content: &str, range: Range<usize>, max: usize, overlap: usize) -> Vec<Range<usize>> {
    let text = &content[range.clone()];
    let base = range.start;
    let mut out = Vec::new();
    let mut start = 0;

    loop {
        let mut end = floor_char_boundary(text, (start + max).min(text.len()));
        if end <= start {
            // A single character wider than the window
            end = ceil_char_boundary(text, start + 1);
        }

        if end < text.len() {
            let search_start = ceil_char_boundary(text, start + max * 70 / 100);
            if search_start < end {
                if let Some(pos) = text[search_start..end].rfind([' ', '\t']) {
                    end = search_start + pos + 1;
                }
            }
        }

        if let Some(window) = trim_range(content, base + start..base + end) {
            out.push(window);
        }

        if end >= text.len() {
            break;
        }

        let next = ceil_char_boundary(text, end.saturating_sub(overlap));
        start = if next > start { next } else { end };
    }

    out
}

fn trim_range(content: &str, range: Range<usize>) -> Option<Range<usize>> {
    let slice = &content[range.clone()];
    let trimmed_start = slice.trim_start();
    let lead = slice.len() - trimmed_start.len();
    let trimmed = trimmed_start.trim_end();
    if trimmed.is_empty() {
        None
    } else {
        Some(range.start + lead..range.start + lead + trimmed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_content() {
        assert!(chunk("", 100, 10).is_empty());
        assert!(chunk("  \n\n \t\n", 100, 10).is_empty());
    }

    #[test]
    fn test_small_content_single_chunk() {
        let content = "Small content.";
        let chunks = chunk(content, 100, 20);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, content);
        assert_eq!(chunks[0].position, 0);
        assert_eq!(chunks[0].seq, 0);
    }

    #[test]
    fn test_paragraphs_are_packed() {
        let content = "First paragraph.\n\nSecond paragraph.\n\nThird paragraph.";
        let chunks = chunk(content, 40, 5);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "First paragraph.\n\nSecond paragraph.");
        assert_eq!(chunks[1].text, "Third paragraph.");
        assert_eq!(&content[chunks[1].position..], "Third paragraph.");
    }

    #[test]
    fn test_long_paragraph_splits_into_lines() {
        let content = "line one is here\nline two is here\nline three is here";
        let chunks = chunk(content, 20, 5);
        let texts: Vec<_> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["line one is here", "line two is here", "line three is here"]
        );
    }

    #[test]
    fn test_long_line_uses_overlapping_windows() {
        let content = "word ".repeat(60);
        let chunks = chunk(&content, 50, 10);
        assert!(chunks.len() > 1);
        for c in &chunks {
            assert!(c.text.len() <= 50);
            assert_eq!(&content[c.position..c.position + c.text.len()], c.text);
        }
        // consecutive windows overlap
        for pair in chunks.windows(2) {
            assert!(pair[1].position < pair[0].position + pair[0].text.len());
        }
        let seqs: Vec<_> = chunks.iter().map(|c| c.seq).collect();
        assert_eq!(seqs, (0..chunks.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_unicode_boundaries() {
        let content = "Hello 世界! Emoji 🎉 and box drawing ─ here. ".repeat(5);
        for size in [1, 3, 7, 20] {
            let chunks = chunk(&content, size, 2);
            assert!(!chunks.is_empty());
            for c in &chunks {
                assert!(!c.text.is_empty());
                assert!(content.is_char_boundary(c.position));
            }
        }
    }

    #[test]
    fn test_overlap_clamped_and_zero_size() {
        let content = "abcdefghij".repeat(3);
        let a = chunk(&content, 10, 50);
        let b = chunk(&content, 10, 5);
        assert_eq!(a, b);
        assert!(!chunk(&content, 0, 0).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let content = "Para one.\n\n".to_string() + &"long ".repeat(100) + "\n\nEnd.";
        assert_eq!(chunk(&content, 64, 16), chunk(&content, 64, 16));
    }

    #[test]
    fn test_prepare_content() {
        assert_eq!(prepare_content("a", b"hello").unwrap(), "hello");
        assert_eq!(prepare_content("a", "\u{feff}hi".as_bytes()).unwrap(), "hi");
        assert!(matches!(
            prepare_content("a", b"ab\0cd"),
            Err(TulioError::Chunk { .. })
        ));
        assert!(matches!(
            prepare_content("a", &[0x66, 0xff, 0xfe]),
            Err(TulioError::Chunk { .. })
        ));
    }

    #[test]
    fn test_floor_char_boundary() {
        let s = "Hello 世界";
        assert_eq!(floor_char_boundary(s, 6), 6);
        assert_eq!(floor_char_boundary(s, 7), 6);
        assert_eq!(floor_char_boundary(s, 9), 9);
        assert_eq!(floor_char_boundary(s, 100), s.len());
    }
}
