// Clause heading classifier: decides line by line which numbered lines are
// genuine sequential clause headings and turns the document into paragraph records.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::expander::spans::{char_to_byte, MarkedText, MatchSpan, SpanKind};

pub mod heading;

pub use heading::{ClauseHeading, HeadingMatcher};

/// Running classification state for one document
///
/// `expected_next_number` only ever moves forward: it is set to one past the
/// last accepted heading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClauseState {
    pub expected_next_number: Option<u32>,
}

/// Why a heading-shaped line was kept as body text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Number lower than the expected next clause number
    NumberRegressed { expected: u32, found: u32 },
    /// Number too far ahead of the expected next clause number
    GapTooLarge { expected: u32, found: u32 },
    TitleTooLong { words: usize },
    ProseOpener,
    TooManyModals { modals: usize },
}

/// How an accepted heading is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingLayout {
    /// `CLAUSE N`
    NumberOnly,
    /// `CLAUSE N. DELETED`
    Deleted,
    /// `CLAUSE N. TITLE`
    Titled,
    /// `CLAUSE N`, followed by the title as its own body paragraph
    NumberThenBody,
}

impl HeadingLayout {
    pub fn heading_text(&self, number: u32, title: &str) -> String {
        match self {
            HeadingLayout::NumberOnly | HeadingLayout::NumberThenBody => format!("CLAUSE {number}"),
            HeadingLayout::Deleted => format!("CLAUSE {number}. DELETED"),
            HeadingLayout::Titled => format!("CLAUSE {number}. {}", title.to_uppercase()),
        }
    }
}

/// Outcome of one classification step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDecision<'a> {
    Blank,
    Body { rejected: Option<Rejection> },
    Heading {
        heading: ClauseHeading<'a>,
        layout: HeadingLayout,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphRole {
    Heading,
    Body,
}

/// One paragraph handed to a document writer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub role: ParagraphRole,
    pub text: String,
    pub bold: bool,
    pub underline: bool,
    /// Ordered, non-overlapping spans over `text`, in character offsets
    pub highlight_spans: Vec<MatchSpan>,
}

impl ParagraphRecord {
    /// Heading paragraph; marked as standardized when it differs from the source line
    pub fn heading(text: String, original: &str) -> Self {
        let highlight_spans = if text != original.trim() {
            vec![MatchSpan::new(0, text.chars().count(), SpanKind::ClauseHeader)]
        } else {
            Vec::new()
        };
        Self {
            role: ParagraphRole::Heading,
            text,
            bold: true,
            underline: true,
            highlight_spans,
        }
    }

    pub fn body(marked: MarkedText) -> Self {
        let highlight_spans = marked.char_spans();
        let (text, _) = marked.into_parts();
        Self {
            role: ParagraphRole::Body,
            text,
            bold: false,
            underline: false,
            highlight_spans,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.role == ParagraphRole::Heading
    }

    /// Text and spans as a `MarkedText` for rendering
    pub fn marked(&self) -> MarkedText {
        MarkedText::from_char_spans(self.text.clone(), &self.highlight_spans)
    }

    /// Text covered by each highlight span
    pub fn highlighted(&self) -> Vec<&str> {
        self.highlight_spans
            .iter()
            .map(|span| {
                &self.text[char_to_byte(&self.text, span.start)..char_to_byte(&self.text, span.end)]
            })
            .collect()
    }
}

/// Numbered clause classifier
///
/// Holds only configuration; state lives in each `classify` call, so one
/// classifier can serve many documents concurrently.
#[derive(Debug)]
pub struct ClauseClassifier {
    config: ClassifierConfig,
    matcher: HeadingMatcher,
}

impl ClauseClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self> {
        Ok(Self {
            config,
            matcher: HeadingMatcher::new()?,
        })
    }

    pub fn with_default_config() -> Result<Self> {
        Self::new(ClassifierConfig::default())
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Pure state-machine step: classify `line` given `state`, returning the next state
    pub fn step<'a>(&self, state: ClauseState, line: &'a str) -> (LineDecision<'a>, ClauseState) {
        if line.trim().is_empty() {
            return (LineDecision::Blank, state);
        }

        let Some(heading) = self.matcher.parse(line) else {
            return (LineDecision::Body { rejected: None }, state);
        };

        if let Some(rejection) = self.rejection(state, &heading) {
            debug!(number = heading.number, ?rejection, "Numbered line kept as body text");
            return (
                LineDecision::Body {
                    rejected: Some(rejection),
                },
                state,
            );
        }

        let layout = self.layout(&heading);
        let next = ClauseState {
            expected_next_number: Some(heading.number.saturating_add(1)),
        };
        debug!(number = heading.number, ?layout, "Accepted clause heading");
        (LineDecision::Heading { heading, layout }, next)
    }

    /// Classify a document's lines with fresh state
    pub fn classify<I>(&self, lines: I) -> Vec<ParagraphRecord>
    where
        I: IntoIterator<Item = MarkedText>,
    {
        let mut state = ClauseState::default();
        let mut records = Vec::new();

        for line in lines {
            let (decision, next) = self.step(state, line.text());
            state = next;

            match decision {
                LineDecision::Blank => {}
                LineDecision::Body { .. } => records.push(ParagraphRecord::body(line.trimmed())),
                LineDecision::Heading { heading, layout } => {
                    let text = layout.heading_text(heading.number, heading.title);
                    records.push(ParagraphRecord::heading(text, line.text()));

                    if layout == HeadingLayout::NumberThenBody {
                        let start = heading.title_start;
                        let title = line.slice(start..start + heading.title.len());
                        records.push(ParagraphRecord::body(title));
                    }
                }
            }
        }

        records
    }

    /// Classify unmarked lines
    pub fn classify_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<ParagraphRecord> {
        self.classify(lines.iter().map(|line| MarkedText::plain(line.as_ref())))
    }

    fn rejection(&self, state: ClauseState, heading: &ClauseHeading<'_>) -> Option<Rejection> {
        let found = heading.number;

        if let Some(expected) = state.expected_next_number {
            if found < expected {
                return Some(Rejection::NumberRegressed { expected, found });
            }
            if found > expected.saturating_add(self.config.max_gap_for(found)) {
                return Some(Rejection::GapTooLarge { expected, found });
            }
        }

        let words = heading.word_count();
        if words > self.config.max_title_words {
            return Some(Rejection::TitleTooLong { words });
        }
        if heading::starts_with_phrase(heading.title, &self.config.prose_openers) {
            return Some(Rejection::ProseOpener);
        }
        let modals = heading::modal_count(heading.title, &self.config);
        if modals > self.config.max_modal_words {
            return Some(Rejection::TooManyModals { modals });
        }

        None
    }

    fn layout(&self, heading: &ClauseHeading<'_>) -> HeadingLayout {
        let words = heading.word_count();
        if words == 0 {
            HeadingLayout::NumberOnly
        } else if words > self.config.inline_title_words
            || heading::starts_with_phrase(heading.title, &self.config.split_openers)
        {
            HeadingLayout::NumberThenBody
        } else if words <= 2 && heading::is_deleted(heading.title) {
            HeadingLayout::Deleted
        } else {
            HeadingLayout::Titled
        }
    }
}
