// Abbreviation rewriter: substitutes dictionary abbreviations line by line and
// reports every substitution as a highlight span over the plain output.

use tracing::debug;

use crate::dictionary::{has_left_boundary, AbbreviationDictionary};

pub mod normalization;
pub mod quantity;
pub mod slash;
pub mod spans;

pub use normalization::{capitalize_sentences, capitalize_sentences_into};
pub use slash::normalize_slashes;
pub use spans::{MarkedText, MarkedTextBuilder, MatchSpan, SpanKind};

/// Plain and highlighted renderings of an expanded document
///
/// Each line keeps its own spans so the clause classifier can carry them into
/// paragraph records. The plain text of a line is exactly the marked text
/// with its spans ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionResult {
    lines: Vec<MarkedText>,
}

impl ExpansionResult {
    pub fn lines(&self) -> &[MarkedText] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<MarkedText> {
        self.lines
    }

    /// Expanded text, lines joined by `\n`
    pub fn plain(&self) -> String {
        self.lines
            .iter()
            .map(MarkedText::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Expanded text with document-level highlight spans
    pub fn marked(&self) -> MarkedText {
        MarkedText::join(&self.lines, "\n")
    }

    /// Number of dictionary substitutions across all lines
    pub fn expansion_count(&self) -> usize {
        self.count_kind(SpanKind::Expansion)
    }

    /// Number of slash phrases rewritten across all lines
    pub fn slash_count(&self) -> usize {
        self.count_kind(SpanKind::SlashNormalization)
    }

    fn count_kind(&self, kind: SpanKind) -> usize {
        self.lines.iter().map(|line| line.count_kind(kind)).sum()
    }
}

/// One pending replacement of `line[start..end]`
#[derive(Debug, Clone)]
struct Substitution {
    start: usize,
    end: usize,
    replacement: String,
    /// Sentence period swallowed by a dotted abbreviation, re-emitted after the span
    keep_period: bool,
}

/// Longest-match abbreviation rewriter over a borrowed dictionary
#[derive(Debug, Clone, Copy)]
pub struct AbbreviationRewriter<'d> {
    dictionary: &'d AbbreviationDictionary,
}

impl<'d> AbbreviationRewriter<'d> {
    pub fn new(dictionary: &'d AbbreviationDictionary) -> Self {
        Self { dictionary }
    }

    /// Expand every line of `text` independently
    pub fn expand(&self, text: &str) -> ExpansionResult {
        let lines: Vec<MarkedText> = text.lines().map(|line| self.expand_line(line)).collect();
        let result = ExpansionResult { lines };

        debug!(
            lines = result.lines.len(),
            expansions = result.expansion_count(),
            slash_normalizations = result.slash_count(),
            "Expanded document"
        );
        result
    }

    /// Expand a single line (no newline handling)
    ///
    /// Order: quantity + abbreviation, then standalone abbreviations in the
    /// gaps the first pass left, then sentence capitalization, then slash
    /// normalization outside the expanded spans. Both passes read only the
    /// original line, so replacement text is never matched again.
    pub fn expand_line(&self, line: &str) -> MarkedText {
        let quantities = self.find_quantity_substitutions(line);

        let mut substitutions = Vec::with_capacity(quantities.len());
        let mut cursor = 0;
        for quantity in quantities {
            self.find_standalone_substitutions(line, cursor, quantity.start, &mut substitutions);
            cursor = quantity.end;
            substitutions.push(quantity);
        }
        self.find_standalone_substitutions(line, cursor, line.len(), &mut substitutions);

        let mut builder = MarkedTextBuilder::with_capacity(line.len() * 2);
        let mut copied_to = 0;
        for substitution in &substitutions {
            builder.push_plain(&line[copied_to..substitution.start]);
            builder.push_marked(&substitution.replacement, SpanKind::Expansion);
            if substitution.keep_period {
                builder.push_plain(".");
            }
            copied_to = substitution.end;
        }
        builder.push_plain(&line[copied_to..]);

        let capitalized = normalization::capitalize_marked(builder.finish());
        slash::normalize_marked(&capitalized, true)
    }

    /// Pass 1: a number, optional whitespace, then a dictionary abbreviation
    fn find_quantity_substitutions(&self, line: &str) -> Vec<Substitution> {
        let mut found = Vec::new();
        let mut pos = 0;

        while let Some(ch) = line[pos..].chars().next() {
            if ch.is_ascii_digit() && has_left_boundary(line, pos) {
                if let Some(number_end) = quantity::scan_quantity(line, pos) {
                    let abbreviation_start = skip_whitespace(line, number_end);
                    if let Some(found_match) =
                        self.dictionary.longest_match_at(line, abbreviation_start)
                    {
                        let number = &line[pos..number_end];
                        let full_form = quantity::full_form_for_quantity(number, found_match.full_form);
                        let abbreviation = &line[abbreviation_start..found_match.end];
                        found.push(Substitution {
                            start: pos,
                            end: found_match.end,
                            keep_period: keeps_sentence_period(
                                abbreviation,
                                &full_form,
                                &line[found_match.end..],
                            ),
                            replacement: format!("{number} {full_form}"),
                        });
                        pos = found_match.end;
                        continue;
                    }
                    pos = number_end;
                    continue;
                }
            }
            pos += ch.len_utf8();
        }

        found
    }

    /// Pass 2: standalone abbreviations inside `line[from..to]`
    fn find_standalone_substitutions(
        &self,
        line: &str,
        from: usize,
        to: usize,
        found: &mut Vec<Substitution>,
    ) {
        let mut pos = from;

        while pos < to {
            let Some(ch) = line[pos..].chars().next() else {
                break;
            };

            if has_left_boundary(line, pos) {
                if let Some(found_match) = self.dictionary.longest_match_within(line, pos, to) {
                    let abbreviation = &line[pos..found_match.end];
                    found.push(Substitution {
                        start: pos,
                        end: found_match.end,
                        keep_period: keeps_sentence_period(
                            abbreviation,
                            found_match.full_form,
                            &line[found_match.end..],
                        ),
                        replacement: found_match.full_form.to_string(),
                    });
                    pos = found_match.end;
                    continue;
                }
            }
            pos += ch.len_utf8();
        }
    }
}

/// Expand `text` with `dictionary`
pub fn expand(text: &str, dictionary: &AbbreviationDictionary) -> ExpansionResult {
    AbbreviationRewriter::new(dictionary).expand(text)
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    text[from..]
        .char_indices()
        .find(|&(_, c)| !c.is_whitespace())
        .map_or(text.len(), |(i, _)| from + i)
}

/// A dotted abbreviation that also ends its sentence ("... w.o.g. Charterers")
/// would lose the sentence period when replaced by an undotted full form.
fn keeps_sentence_period(abbreviation: &str, full_form: &str, rest: &str) -> bool {
    if !abbreviation.ends_with('.') || full_form.ends_with('.') {
        return false;
    }
    let rest = rest.trim_start();
    rest.is_empty() || rest.chars().next().is_some_and(char::is_uppercase)
}
