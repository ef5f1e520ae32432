// Sentence capitalization applied after substitution.
// Only ASCII letters change case, so byte offsets (and therefore spans) are preserved.

use super::spans::MarkedText;

/// Sentence-terminal punctuation
const TERMINALS: [char; 3] = ['.', '!', '?'];

/// Uppercase any lowercase ASCII letter that follows `.`, `!` or `?` and optional whitespace
pub fn capitalize_sentences(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    capitalize_sentences_into(text, &mut result);
    result
}

/// Capitalize into a supplied buffer, clearing it first
pub fn capitalize_sentences_into(text: &str, buffer: &mut String) {
    buffer.clear();
    buffer.reserve(text.len());

    let mut after_terminal = false;

    for ch in text.chars() {
        if after_terminal {
            if ch.is_whitespace() {
                buffer.push(ch);
                continue;
            }
            after_terminal = false;
            if ch.is_ascii_lowercase() {
                buffer.push(ch.to_ascii_uppercase());
                continue;
            }
        }

        if TERMINALS.contains(&ch) {
            after_terminal = true;
        }
        buffer.push(ch);
    }
}

/// Capitalize the text of a marked line, keeping its spans
pub fn capitalize_marked(marked: MarkedText) -> MarkedText {
    let (text, spans) = marked.into_parts();
    let capitalized = capitalize_sentences(&text);
    debug_assert_eq!(capitalized.len(), text.len());
    MarkedText::new(capitalized, spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expander::spans::{MatchSpan, SpanKind};

    #[test]
    fn test_capitalize_after_period() {
        assert_eq!(
            capitalize_sentences("dwcc. without guarantee. charterers to pay."),
            "dwcc. Without guarantee. Charterers to pay."
        );
    }

    #[test]
    fn test_capitalize_without_whitespace() {
        assert_eq!(capitalize_sentences("a.b"), "a.B");
        assert_eq!(capitalize_sentences("e.g. this"), "e.G. This");
    }

    #[test]
    fn test_other_terminals() {
        assert_eq!(capitalize_sentences("ready? yes! go"), "ready? Yes! Go");
    }

    #[test]
    fn test_digits_and_uppercase_untouched() {
        assert_eq!(capitalize_sentences("1.5 tons. 20 days"), "1.5 tons. 20 days");
        assert_eq!(capitalize_sentences("End. Start"), "End. Start");
    }

    #[test]
    fn test_terminal_then_punctuation_resets() {
        // only the very next non-space character is considered
        assert_eq!(capitalize_sentences("end. (note)"), "end. (note)");
    }

    #[test]
    fn test_leading_text_untouched() {
        assert_eq!(capitalize_sentences("lowercase start"), "lowercase start");
    }

    #[test]
    fn test_buffer_reuse() {
        let mut buffer = String::new();
        capitalize_sentences_into("one. two", &mut buffer);
        assert_eq!(buffer, "one. Two");
        capitalize_sentences_into("three! four", &mut buffer);
        assert_eq!(buffer, "three! Four");
    }

    #[test]
    fn test_marked_spans_preserved() {
        let marked = MarkedText::new(
            "ok. without guarantee",
            vec![MatchSpan::new(4, 21, SpanKind::Expansion)],
        );
        let capitalized = capitalize_marked(marked);
        assert_eq!(capitalized.text(), "ok. Without guarantee");
        assert_eq!(&capitalized.text()[4..21], "Without guarantee");
        assert_eq!(capitalized.spans().len(), 1);
    }
}
