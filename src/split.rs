//! Splitting long text into message-sized chunks
//!
//! Chunks end at a paragraph break when one fits, else at a line break,
//! else at the byte limit (moved back to a char boundary). The newline
//! characters at a chosen break are dropped. Every chunk but the last
//! carries a [`ResumeMarker`] naming the byte offset where the next chunk
//! starts, so a "continue" button can restart the split from there.

use serde::{Deserialize, Serialize};

/// Byte offset into the original text where splitting resumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResumeMarker(pub usize);

impl ResumeMarker {
    pub fn offset(&self) -> usize {
        self.0
    }
}

/// One message-sized piece of a longer text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentChunk {
    /// Position of the chunk, counted from the resume point of the split
    pub sequence_index: usize,
    pub text: String,
    /// Where the next chunk starts; `None` on the last chunk
    pub resume_marker: Option<ResumeMarker>,
}

impl ContentChunk {
    pub fn is_last(&self) -> bool {
        self.resume_marker.is_none()
    }
}

/// Split `text` into chunks of at most `max_bytes` bytes
pub fn split(text: &str, max_bytes: usize) -> Vec<ContentChunk> {
    split_from(text, max_bytes, ResumeMarker(0))
}

/// Split the remainder of `text` starting at `from`
///
/// Produces exactly the chunks [`split`] would produce after the one that
/// returned `from` as its marker. A marker past the end, or not on a char
/// boundary, yields a single empty chunk.
pub fn split_from(text: &str, max_bytes: usize, from: ResumeMarker) -> Vec<ContentChunk> {
    let mut chunks = Vec::new();
    let mut cursor = Some(from);

    while let Some(marker) = cursor {
        let chunk = next_chunk(text, max_bytes, marker, chunks.len());
        cursor = chunk.resume_marker;
        chunks.push(chunk);
    }
    chunks
}

/// Produce only the chunk starting at `from`
///
/// Views use this to send one chunk per interaction.
pub fn next_chunk(
    text: &str,
    max_bytes: usize,
    from: ResumeMarker,
    sequence_index: usize,
) -> ContentChunk {
    let max_bytes = max_bytes.max(1);
    let rest = text.get(from.offset()..).unwrap_or_default();

    if rest.len() <= max_bytes {
        return ContentChunk {
            sequence_index,
            text: rest.to_string(),
            resume_marker: None,
        };
    }

    let (end, skip) = find_break(rest, max_bytes);
    let next = end + skip;
    // Trailing separators only: the rest is empty, so this chunk is the last
    if next >= rest.len() {
        return ContentChunk {
            sequence_index,
            text: rest[..end].to_string(),
            resume_marker: None,
        };
    }

    ContentChunk {
        sequence_index,
        text: rest[..end].to_string(),
        resume_marker: Some(ResumeMarker(from.offset() + next)),
    }
}

/// Pick where to cut `rest` so that the chunk fits in `max_bytes`
///
/// Returns the chunk length and how many separator bytes to skip.
fn find_break(rest: &str, max_bytes: usize) -> (usize, usize) {
    // A separator right at the limit still ends a full-size chunk
    let paragraphs = &rest[..floor_char_boundary(rest, max_bytes + 2)];
    if let Some(pos) = paragraphs.rfind("\n\n").filter(|&p| p > 0) {
        return (pos, 2);
    }
    let lines = &rest[..floor_char_boundary(rest, max_bytes + 1)];
    if let Some(pos) = lines.rfind('\n').filter(|&p| p > 0) {
        return (pos, 1);
    }

    let cut = floor_char_boundary(rest, max_bytes);
    if cut == 0 {
        // A single char wider than the limit goes out whole
        let width = rest.chars().next().map_or(1, char::len_utf8);
        return (width, 0);
    }
    (cut, 0)
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
