// Numbered heading recognition: "31. Demurrage", "31: Demurrage", "31 - Demurrage",
// "31\. Demurrage", "Clause 31 Demurrage", "CLAUSE 31. DEMURRAGE".

use anyhow::Result;
use regex_automata::meta::Regex;

use crate::config::ClassifierConfig;

/// Leading clause number with its separator and the remaining title text
///
/// Groups: 1 number after "Clause", 2 its optional separator, 3 bare number,
/// 4 its required separator, 5 the rest of the line.
const HEADING_PATTERN: &str =
    r"(?i)^[ \t]*(?:clause[ \t]*([0-9]{1,3})[ \t]*(\\?[.:\-])?|([0-9]{1,3})[ \t]*(\\?[.:\-]))(.*)$";

/// A line that looks like a numbered heading, before any sequencing checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseHeading<'a> {
    pub number: u32,
    /// Title text, trimmed; may be empty
    pub title: &'a str,
    /// Byte offset of `title` within the line
    pub title_start: usize,
    /// Separator after the number as written (`.`, `:` or `-`)
    pub separator: Option<char>,
    /// Written with the word "Clause"
    pub clause_word: bool,
}

impl<'a> ClauseHeading<'a> {
    pub fn word_count(&self) -> usize {
        self.title.split_whitespace().count()
    }
}

/// Compiled heading pattern
#[derive(Debug)]
pub struct HeadingMatcher {
    pattern: Regex,
}

impl HeadingMatcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(HEADING_PATTERN)?,
        })
    }

    /// Parse a heading candidate out of `line`
    pub fn parse<'a>(&self, line: &'a str) -> Option<ClauseHeading<'a>> {
        let mut caps = self.pattern.create_captures();
        self.pattern.captures(line, &mut caps);
        if !caps.is_match() {
            return None;
        }

        let (number_span, separator_span, clause_word) = match caps.get_group(1) {
            Some(number) => (number, caps.get_group(2), true),
            None => (caps.get_group(3)?, caps.get_group(4), false),
        };
        let number: u32 = line[number_span.start..number_span.end].parse().ok()?;
        let separator = separator_span.and_then(|s| line[s.start..s.end].chars().last());

        let rest_span = caps.get_group(5)?;
        let rest = &line[rest_span.start..rest_span.end];
        let title = rest.trim();
        let title_start = rest_span.start + (rest.len() - rest.trim_start().len());

        // "1.5 tons", "1.1 Sub-clause", "Clause 1234": a digit right after the marker.
        // A spaced digit opens a title ("12. 24 Hours Notice").
        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        // "3-way valve", "Clause 5a": a dash or a missing separator must be followed by a space
        let marker_end = separator_span.map_or(number_span.end, |s| s.end);
        let tail = &line[marker_end..];
        let needs_space = matches!(separator, None | Some('-'));
        if needs_space && !tail.is_empty() && !tail.starts_with(char::is_whitespace) {
            return None;
        }

        Some(ClauseHeading {
            number,
            title,
            title_start,
            separator,
            clause_word,
        })
    }
}

/// True when `title` opens with one of `phrases` as whole words (case-insensitive)
pub fn starts_with_phrase(title: &str, phrases: &[String]) -> bool {
    let lowered = title.to_lowercase();
    phrases.iter().any(|phrase| {
        lowered
            .strip_prefix(phrase.as_str())
            .is_some_and(|rest| rest.chars().next().map_or(true, |c| !c.is_alphanumeric()))
    })
}

/// Occurrences of modal or auxiliary verbs among the title's words
pub fn modal_count(title: &str, config: &ClassifierConfig) -> usize {
    title
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|word| config.modal_words.iter().any(|modal| modal == word))
        .count()
}

/// "Deleted", "DELETED.", "deleted:"
pub fn is_deleted(title: &str) -> bool {
    title
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .eq_ignore_ascii_case("deleted")
}
