// Slash phrase normalization.
//
// Rules, in precedence order:
//   A. "and / or" (any spacing, any case)      -> "and/or"
//   B. three or more words joined by slashes   -> "a / b / c"
//   C. any other word pair joined by a slash   -> "a / b"
//
// A chain is scanned once as a whole, which gives the same result as applying
// A, B and C one after another: a chain containing "and / or" plus another word
// is a B chain and ends up fully spaced either way.
//
// Expansion spans take part in chains as single tokens. Their text is copied
// through untouched, only the separators around them are respaced.

use super::spans::{MarkedText, MarkedTextBuilder, SpanKind};

/// Characters that make up a slash-joined word token
fn is_token_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-'
}

fn is_blank(ch: char) -> bool {
    ch == ' ' || ch == '\t'
}

/// A run of slash-joined word tokens, in char indices
struct SlashChain {
    tokens: Vec<(usize, usize)>,
    /// Char index just past the last token
    end: usize,
}

struct Scanner<'a> {
    text: &'a str,
    chars: Vec<(usize, char)>,
    /// Char ranges of expansion spans
    protected: Vec<(usize, usize)>,
}

impl<'a> Scanner<'a> {
    fn new(marked: &'a MarkedText) -> Self {
        let text = marked.text();
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let char_index = |byte: usize| chars.partition_point(|&(offset, _)| offset < byte);
        let protected = marked
            .spans()
            .iter()
            .filter(|span| span.kind == SpanKind::Expansion)
            .map(|span| (char_index(span.start), char_index(span.end)))
            .collect();

        Self {
            text,
            chars,
            protected,
        }
    }

    fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).map(|&(_, c)| c)
    }

    fn byte_offset(&self, index: usize) -> usize {
        self.chars.get(index).map_or(self.text.len(), |&(offset, _)| offset)
    }

    /// Expansion span covering char `index`, if any
    fn protected_at(&self, index: usize) -> Option<(usize, usize)> {
        self.protected
            .iter()
            .copied()
            .find(|&(start, end)| start <= index && index < end)
    }

    fn is_protected(&self, start: usize, end: usize) -> bool {
        self.protected.contains(&(start, end))
    }

    fn token_end(&self, from: usize) -> usize {
        if let Some((start, end)) = self.protected_at(from) {
            if start == from {
                return end;
            }
        }
        let mut index = from;
        while self.char_at(index).is_some_and(is_token_char) && self.protected_at(index).is_none() {
            index += 1;
        }
        index
    }

    /// True when a chain token may begin at char `index`
    fn starts_token(&self, index: usize) -> bool {
        if let Some((start, _)) = self.protected_at(index) {
            return start == index;
        }
        let Some(ch) = self.char_at(index) else {
            return false;
        };
        is_token_char(ch)
            && (index == 0
                || !is_token_char(self.chars[index - 1].1)
                || self.protected_at(index - 1).is_some())
    }

    fn skip_blanks(&self, from: usize) -> usize {
        let mut index = from;
        while self.char_at(index).is_some_and(is_blank) {
            index += 1;
        }
        index
    }

    /// Word tokens must carry a letter; numeric runs such as dates are left alone
    fn is_word_token(&self, start: usize, end: usize) -> bool {
        start < end && self.chars[start..end].iter().any(|&(_, c)| c.is_alphabetic())
    }

    /// True when the nearest non-blank character before `index` is a slash
    fn preceded_by_slash(&self, index: usize) -> bool {
        self.chars[..index]
            .iter()
            .rev()
            .find(|&&(_, c)| !is_blank(c))
            .is_some_and(|&(_, c)| c == '/')
    }

    fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[self.byte_offset(start)..self.byte_offset(end)]
    }

    /// Scan a chain starting at token index `first`.
    ///
    /// `Err(resume)` means no normalizable chain starts here; scanning resumes
    /// at char index `resume`.
    fn scan_chain(&self, first: usize) -> Result<SlashChain, usize> {
        let first_end = self.token_end(first);
        if !self.is_word_token(first, first_end) || self.preceded_by_slash(first) {
            return Err(first_end.max(first + 1));
        }

        let mut tokens = vec![(first, first_end)];
        let mut cursor = first_end;

        loop {
            let slash = self.skip_blanks(cursor);
            if self.char_at(slash) != Some('/') || self.protected_at(slash).is_some() {
                break;
            }
            let next = self.skip_blanks(slash + 1);
            let next_end = self.token_end(next);
            if !self.is_word_token(next, next_end) {
                // dangling slash or a non-word member: leave the whole run as written
                return Err(next_end.max(slash + 1));
            }
            tokens.push((next, next_end));
            cursor = next_end;
        }

        if tokens.len() < 2 {
            return Err(first_end);
        }
        Ok(SlashChain {
            tokens,
            end: cursor,
        })
    }

    fn separator(&self, chain: &SlashChain) -> &'static str {
        match chain.tokens.as_slice() {
            [(a, b), (c, d)]
                if self.slice(*a, *b).eq_ignore_ascii_case("and")
                    && self.slice(*c, *d).eq_ignore_ascii_case("or") =>
            {
                "/"
            }
            _ => " / ",
        }
    }

    fn canonical(&self, chain: &SlashChain) -> String {
        let words: Vec<&str> = chain
            .tokens
            .iter()
            .map(|&(start, end)| self.slice(start, end))
            .collect();
        words.join(self.separator(chain))
    }

    /// Append the canonical chain; expansion tokens keep their own span
    fn push_chain(&self, chain: &SlashChain, mark_changes: bool, builder: &mut MarkedTextBuilder) {
        let separator = self.separator(chain);
        for (i, &(start, end)) in chain.tokens.iter().enumerate() {
            if i > 0 {
                push_rewritten(builder, separator, mark_changes);
            }
            let token = self.slice(start, end);
            if self.is_protected(start, end) {
                builder.push_marked(token, SpanKind::Expansion);
            } else {
                push_rewritten(builder, token, mark_changes);
            }
        }
    }
}

fn push_rewritten(builder: &mut MarkedTextBuilder, segment: &str, mark_changes: bool) {
    if mark_changes {
        builder.push_marked(segment, SpanKind::SlashNormalization);
    } else {
        builder.push_plain(segment);
    }
}

/// Normalize slash phrases in plain `text`.
///
/// With `mark_changes`, every rewritten chain is highlighted as a
/// slash normalization span; chains already in canonical form are not marked.
pub fn normalize_slashes(text: &str, mark_changes: bool) -> MarkedText {
    normalize_marked(&MarkedText::plain(text), mark_changes)
}

/// Normalize slash phrases in `marked`, keeping its spans.
///
/// Text inside expansion spans was produced by the dictionary and is never
/// respaced, so full forms keep their own slash spelling. An expansion that
/// borders a slash counts as one word of the chain.
pub fn normalize_marked(marked: &MarkedText, mark_changes: bool) -> MarkedText {
    let text = marked.text();
    let scanner = Scanner::new(marked);
    let mut builder = MarkedTextBuilder::with_capacity(text.len());
    let mut copied_to = 0;
    let mut index = 0;

    while index < scanner.chars.len() {
        if !scanner.starts_token(index) {
            index += 1;
            continue;
        }

        match scanner.scan_chain(index) {
            Ok(chain) => {
                let start = scanner.byte_offset(chain.tokens[0].0);
                let end = scanner.byte_offset(chain.end);

                if scanner.canonical(&chain) != text[start..end] {
                    builder.push_marked_text(&marked.slice(copied_to..start));
                    scanner.push_chain(&chain, mark_changes, &mut builder);
                    copied_to = end;
                }
                index = chain.end;
            }
            Err(resume) => index = resume,
        }
    }

    builder.push_marked_text(&marked.slice(copied_to..text.len()));
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expander::spans::MatchSpan;

    fn plain(text: &str) -> String {
        normalize_slashes(text, false).text().to_string()
    }

    #[test]
    fn test_mixed_phrase() {
        assert_eq!(
            plain("time / charter and / or voyage/charter"),
            "time / charter and/or voyage / charter"
        );
    }

    #[test]
    fn test_and_or_collapses_and_keeps_case() {
        assert_eq!(plain("owners and /or charterers"), "owners and/or charterers");
        assert_eq!(plain("AND / OR"), "AND/OR");
        assert_eq!(plain("and/or"), "and/or");
    }

    #[test]
    fn test_three_or_more_words() {
        assert_eq!(plain("a/b /c"), "a / b / c");
        assert_eq!(plain("load/discharge/  shift"), "load / discharge / shift");
        assert_eq!(plain("x / and / or"), "x / and / or");
    }

    #[test]
    fn test_pairs() {
        assert_eq!(plain("owners/charterers"), "owners / charterers");
        assert_eq!(plain("owners  /charterers"), "owners / charterers");
        assert_eq!(plain("ship-to/consignee"), "ship-to / consignee");
    }

    #[test]
    fn test_numbers_left_alone() {
        assert_eq!(plain("dated 12/05/2024"), "dated 12/05/2024");
        assert_eq!(plain("service 24/7"), "service 24/7");
        assert_eq!(plain("usd 5/mt"), "usd 5/mt");
        assert_eq!(plain("usd 5/mt/day"), "usd 5/mt/day");
    }

    #[test]
    fn test_dangling_slash_left_alone() {
        assert_eq!(plain("owners/ "), "owners/ ");
        assert_eq!(plain("/charterers"), "/charterers");
    }

    #[test]
    fn test_marks_only_changed_chains() {
        let marked = normalize_slashes("time / charter and / or voyage/charter", true);
        assert_eq!(marked.text(), "time / charter and/or voyage / charter");
        let changed: Vec<&str> = marked
            .spans()
            .iter()
            .map(|s| &marked.text()[s.start..s.end])
            .collect();
        assert_eq!(changed, vec!["and/or", "voyage / charter"]);
        assert!(marked
            .spans()
            .iter()
            .all(|s| s.kind == SpanKind::SlashNormalization));

        assert!(normalize_slashes("owners/charterers", false).spans().is_empty());
    }

    #[test]
    fn test_expansion_is_one_chain_token() {
        let marked = MarkedText::new(
            "bill of lading/invoice, loading/discharging",
            vec![MatchSpan::new(0, 14, SpanKind::Expansion)],
        );
        let normalized = normalize_marked(&marked, true);
        assert_eq!(
            normalized.text(),
            "bill of lading / invoice, loading / discharging"
        );
        assert_eq!(
            normalized.spans(),
            &[
                MatchSpan::new(0, 14, SpanKind::Expansion),
                MatchSpan::new(14, 24, SpanKind::SlashNormalization),
                MatchSpan::new(26, 47, SpanKind::SlashNormalization),
            ]
        );
    }

    #[test]
    fn test_slash_inside_expansion_untouched() {
        let marked = MarkedText::new(
            "charterers'/owners' option/agents",
            vec![MatchSpan::new(0, 26, SpanKind::Expansion)],
        );
        let normalized = normalize_marked(&marked, false);
        assert_eq!(normalized.text(), "charterers'/owners' option / agents");
        assert_eq!(normalized.spans(), &[MatchSpan::new(0, 26, SpanKind::Expansion)]);
    }

    #[test]
    fn test_two_expansions_joined_by_slash() {
        let marked = MarkedText::new(
            "charter party/bill of lading",
            vec![
                MatchSpan::new(0, 13, SpanKind::Expansion),
                MatchSpan::new(14, 28, SpanKind::Expansion),
            ],
        );
        let normalized = normalize_marked(&marked, true);
        assert_eq!(normalized.text(), "charter party / bill of lading");
        let kinds: Vec<SpanKind> = normalized.spans().iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![SpanKind::Expansion, SpanKind::SlashNormalization, SpanKind::Expansion]
        );

        // already canonical: nothing to rewrite on a second pass
        let again = normalize_slashes(normalized.text(), true);
        assert_eq!(again.text(), normalized.text());
        assert!(again.spans().is_empty());
    }

    #[test]
    fn test_numeric_member_next_to_expansion_left_alone() {
        let marked = MarkedText::new("usd 5/metric ton", vec![MatchSpan::new(6, 16, SpanKind::Expansion)]);
        assert_eq!(normalize_marked(&marked, false).text(), "usd 5/metric ton");
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(plain("Höhe/Breite"), "Höhe / Breite");
    }
}
