//! Sentence boundary splitting for plain transcripts.

/// Split `text` into sentences on `.`, `!` or `?` followed by whitespace.
///
/// The terminator stays attached to its sentence, and a run of terminators
/// ("?!", "...") is kept together. Whitespace-only pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            while let Some(&next) = chars.peek() {
                if matches!(next, '.' | '!' | '?') {
                    current.push(next);
                    chars.next();
                } else {
                    break;
                }
            }
            // Only a terminator followed by whitespace (or end of input)
            // closes a sentence; "3.14" stays intact.
            if chars.peek().map_or(true, |next| next.is_whitespace()) {
                while chars.peek().is_some_and(|next| next.is_whitespace()) {
                    chars.next();
                }
                let sentence = current.trim();
                if !sentence.is_empty() {
                    sentences.push(sentence.to_string());
                }
                current.clear();
            }
        }
    }

    let tail = current.trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}
