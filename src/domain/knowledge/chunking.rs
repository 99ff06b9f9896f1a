//! Recursive character chunker with overlap.
//!
//! Sizes are measured in characters, not bytes, so Cyrillic text chunks the
//! same way Latin text does.

use std::collections::VecDeque;

const SEPARATORS: &[&str] = &["\n\n", "\n", ". ", " "];

/// Chunk size and overlap, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingPolicy {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingPolicy {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Splits `text` into chunks of at most `policy.chunk_size` characters.
///
/// Splits prefer paragraph, then line, then sentence, then word boundaries.
/// Consecutive chunks share up to `policy.chunk_overlap` trailing characters.
pub fn chunk_text(text: &str, policy: ChunkingPolicy) -> Vec<String> {
    if text.trim().is_empty() || policy.chunk_size == 0 {
        return Vec::new();
    }
    let size = policy.chunk_size;
    let overlap = policy.chunk_overlap.min(size.saturating_sub(1));

    let pieces = split_recursive(text, size, SEPARATORS);

    let mut chunks = Vec::new();
    let mut window: VecDeque<(String, usize)> = VecDeque::new();
    let mut window_len = 0;

    for piece in pieces {
        let len = char_len(&piece);
        if window_len + len > size && !window.is_empty() {
            push_chunk(&mut chunks, &window);
            while window_len > overlap || (window_len + len > size && !window.is_empty()) {
                match window.pop_front() {
                    Some((_, dropped)) => window_len -= dropped,
                    None => break,
                }
            }
        }
        window_len += len;
        window.push_back((piece, len));
    }
    push_chunk(&mut chunks, &window);

    chunks
}

fn push_chunk(chunks: &mut Vec<String>, window: &VecDeque<(String, usize)>) {
    let joined: String = window.iter().map(|(piece, _)| piece.as_str()).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

fn split_recursive(text: &str, size: usize, separators: &[&str]) -> Vec<String> {
    if char_len(text) <= size {
        return vec![text.to_string()];
    }
    let Some((separator, rest)) = separators.split_first() else {
        return hard_split(text, size);
    };
    if !text.contains(separator) {
        return split_recursive(text, size, rest);
    }

    let mut pieces = Vec::new();
    for part in text.split_inclusive(separator) {
        if char_len(part) <= size {
            pieces.push(part.to_string());
        } else {
            pieces.extend(split_recursive(part, size, rest));
        }
    }
    pieces
}

fn hard_split(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(size).map(|c| c.iter().collect()).collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(chunk_size: usize, chunk_overlap: usize) -> ChunkingPolicy {
        ChunkingPolicy {
            chunk_size,
            chunk_overlap,
        }
    }

    #[test]
    fn small_text_is_a_single_chunk() {
        let chunks = chunk_text("Привет, мир!", ChunkingPolicy::default());
        assert_eq!(chunks, vec!["Привет, мир!".to_string()]);
    }

    #[test]
    fn blank_text_has_no_chunks() {
        assert!(chunk_text("  \n\n ", ChunkingPolicy::default()).is_empty());
    }

    #[test]
    fn chunks_respect_size_in_characters() {
        let text = "слово ".repeat(400);
        let chunks = chunk_text(&text, policy(100, 20));
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100, "chunk too long: {}", chunk.chars().count());
        }
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text: String = (0..30).map(|i| format!("word{:02} ", i)).collect();
        let chunks = chunk_text(&text, policy(50, 20));
        assert!(chunks.len() >= 2);
        let first_word_of_second = chunks[1].split_whitespace().next().unwrap();
        assert!(chunks[0].contains(first_word_of_second));
    }

    #[test]
    fn paragraphs_are_preferred_split_points() {
        let para = "a".repeat(60);
        let text = format!("{}\n\n{}\n\n{}", para, para, para);
        let chunks = chunk_text(&text, policy(100, 0));
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c == &para));
    }

    #[test]
    fn unbreakable_text_is_hard_split() {
        let text = "x".repeat(250);
        let chunks = chunk_text(&text, policy(100, 0));
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].len(), 50);
    }
}
