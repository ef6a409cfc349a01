//! Sentence-respecting text chunking with approximate word-level overlap.

use webvec_core::{Chunk, ChunkingConfig, Document};

/// Splits a document's normalized text into overlapping chunks.
///
/// Sentences are the atomic unit: a chunk closes when the next sentence
/// would push it past `chunk_size` characters, and a sentence longer than
/// `chunk_size` is emitted whole rather than split mid-sentence. Each new
/// chunk is seeded with the last `chunk_overlap / 10` words of the previous
/// one, approximating `chunk_overlap` characters of shared context at
/// roughly ten characters per word.
///
/// Offsets accumulate with the growing buffer, so once overlap text is
/// reintroduced they approximate source positions rather than index back
/// into the original document exactly.
#[derive(Debug, Clone)]
pub struct SentenceChunker {
    config: ChunkingConfig,
}

impl SentenceChunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        let sentences = split_sentences(&document.raw_text);
        let overlap_words = self.config.chunk_overlap / 10;

        let mut chunks: Vec<Chunk> = Vec::new();
        // Each buffered sentence is accounted with one trailing space, the
        // same shape the joined chunk text plus its separator would have.
        let mut buffer: Vec<String> = Vec::new();
        let mut buffer_chars = 0usize;
        let mut start_offset = 0usize;

        for sentence in sentences {
            let sentence_chars = sentence.chars().count();
            if !buffer.is_empty() && buffer_chars + sentence_chars + 1 > self.config.chunk_size {
                let text = buffer.join(" ");
                let end_offset = start_offset + text.chars().count();
                let seed = tail_words(&text, overlap_words);
                chunks.push(Chunk {
                    text,
                    index: chunks.len(),
                    source_url: document.source_url.clone(),
                    start_offset,
                    end_offset,
                });

                buffer.clear();
                buffer_chars = 0;
                start_offset = end_offset;
                if !seed.is_empty() {
                    start_offset = end_offset.saturating_sub(seed.chars().count());
                    buffer_chars = seed.chars().count() + 1;
                    buffer.push(seed);
                }
            }
            buffer_chars += sentence_chars + 1;
            buffer.push(sentence);
        }

        if !buffer.is_empty() {
            let text = buffer.join(" ");
            if !text.trim().is_empty() {
                let end_offset = start_offset + text.chars().count();
                chunks.push(Chunk {
                    text,
                    index: chunks.len(),
                    source_url: document.source_url.clone(),
                    start_offset,
                    end_offset,
                });
            }
        }

        chunks
    }
}

/// Splits after `.`, `!`, or `?` followed by whitespace. Text without any
/// boundary comes back as a single sentence; blank text yields none.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            while chars.peek().is_some_and(|n| n.is_whitespace()) {
                chars.next();
            }
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let sentence = current.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
    sentences
}

/// Last `count` whitespace-separated words of `text`, space-joined. A count
/// of zero yields the empty string.
fn tail_words(text: &str, count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let words: Vec<&str> = text.split_whitespace().collect();
    words[words.len().saturating_sub(count)..].join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use webvec_core::ContentType;

    fn doc(text: &str) -> Document {
        Document {
            source_url: "https://example.com/page".to_string(),
            content_type: ContentType::Text,
            raw_text: text.to_string(),
        }
    }

    fn chunker(size: usize, overlap: usize) -> SentenceChunker {
        SentenceChunker::new(
            ChunkingConfig::default()
                .with_chunk_size(size)
                .with_overlap(overlap),
        )
    }

    #[test]
    fn splits_sentences_on_terminal_punctuation() {
        assert_eq!(
            split_sentences("One. Two! Three? Four"),
            vec!["One.", "Two!", "Three?", "Four"]
        );
        assert_eq!(split_sentences("no boundary here"), vec!["no boundary here"]);
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn tiny_chunk_size_yields_one_sentence_per_chunk() {
        let chunks = chunker(5, 0).chunk(&doc("A. B. C."));
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["A.", "B.", "C."]);
    }

    #[test]
    fn empty_text_yields_zero_chunks() {
        assert!(chunker(100, 10).chunk(&doc("")).is_empty());
        assert!(chunker(100, 10).chunk(&doc("   \n  ")).is_empty());
    }

    #[test]
    fn oversized_sentence_is_emitted_whole() {
        let long = "this single sentence is much longer than the configured size.";
        let text = format!("Short. {long} Tail.");
        let chunks = chunker(10, 0).chunk(&doc(&text));
        assert!(chunks.iter().any(|c| c.text == long));
    }

    #[test]
    fn indices_are_contiguous_from_zero() {
        let text = "One sentence here. Another sentence there. Yet another one. And a last one.";
        let chunks = chunker(30, 0).chunk(&doc(text));
        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(!chunk.text.is_empty());
        }
    }

    #[test]
    fn overlap_seeds_next_chunk_with_tail_words() {
        let text = "The quick brown fox jumps over dogs. Pack my box.";
        let chunks = chunker(40, 20).chunk(&doc(text));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "The quick brown fox jumps over dogs.");
        assert_eq!(chunks[1].text, "over dogs. Pack my box.");
        // Seeded start rewinds by the overlap text length.
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[0].end_offset, 36);
        assert_eq!(chunks[1].start_offset, 26);
        assert_eq!(chunks[1].end_offset, 26 + chunks[1].text.chars().count());
    }

    #[test]
    fn zero_overlap_produces_no_shared_prefix() {
        let text = "The quick brown fox jumps over dogs. Pack my box.";
        let chunks = chunker(40, 0).chunk(&doc(text));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text, "Pack my box.");
        assert_eq!(chunks[1].start_offset, chunks[0].end_offset);
    }

    #[test]
    fn chunking_is_deterministic() {
        let text = "Alpha beta gamma. Delta epsilon zeta. Eta theta iota. Kappa lambda mu.";
        let a = chunker(35, 20).chunk(&doc(text));
        let b = chunker(35, 20).chunk(&doc(text));
        assert_eq!(a, b);
    }
}
