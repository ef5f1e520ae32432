// Highlight spans over immutable text.
// Offsets are byte offsets into UTF-8 text and always fall on character boundaries;
// `char_spans` gives the character-offset view handed to document writers.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// What produced a highlighted region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    /// Dictionary substitution, with or without a leading quantity
    Expansion,
    /// Slash phrase rewritten into canonical spacing
    SlashNormalization,
    /// Clause heading rewritten into the standard `CLAUSE N. TITLE` form
    ClauseHeader,
}

impl SpanKind {
    /// Stable name used for CSS classes and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            SpanKind::Expansion => "expansion",
            SpanKind::SlashNormalization => "slash_normalization",
            SpanKind::ClauseHeader => "clause_header",
        }
    }
}

/// Byte offset of character `index` in `text`, or `text.len()` past the end
pub fn char_to_byte(text: &str, index: usize) -> usize {
    text.char_indices().nth(index).map_or(text.len(), |(offset, _)| offset)
}

/// A marked region `[start, end)` of some text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub kind: SpanKind,
}

impl MatchSpan {
    pub fn new(start: usize, end: usize, kind: SpanKind) -> Self {
        Self { start, end, kind }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Same span moved `offset` bytes to the right
    pub fn shifted(&self, offset: usize) -> Self {
        Self::new(self.start + offset, self.end + offset, self.kind)
    }

    /// Convert the byte range into a character range over `text`
    ///
    /// Document writers that address runs by character index use this instead
    /// of the raw byte offsets.
    pub fn char_range(&self, text: &str) -> Range<usize> {
        let start = text[..self.start].chars().count();
        let len = text[self.start..self.end].chars().count();
        start..start + len
    }
}

/// Text plus an ordered, non-overlapping list of highlight spans
///
/// Stripping the spans always yields `text()` unchanged: the spans never
/// embed markup into the string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkedText {
    text: String,
    spans: Vec<MatchSpan>,
}

impl MarkedText {
    /// Build from text and arbitrary spans; spans are clipped, sorted and flattened
    pub fn new(text: impl Into<String>, spans: Vec<MatchSpan>) -> Self {
        let text = text.into();
        let spans = flatten_spans(spans, text.len());
        Self { text, spans }
    }

    /// Text without any highlighting
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            spans: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn spans(&self) -> &[MatchSpan] {
        &self.spans
    }

    /// Spans re-expressed in character offsets over the text
    pub fn char_spans(&self) -> Vec<MatchSpan> {
        self.spans
            .iter()
            .map(|span| {
                let range = span.char_range(&self.text);
                MatchSpan::new(range.start, range.end, span.kind)
            })
            .collect()
    }

    /// Build from spans given in character offsets
    pub fn from_char_spans(text: impl Into<String>, spans: &[MatchSpan]) -> Self {
        let text = text.into();
        let spans = spans
            .iter()
            .map(|span| {
                MatchSpan::new(
                    char_to_byte(&text, span.start),
                    char_to_byte(&text, span.end),
                    span.kind,
                )
            })
            .collect();
        Self::new(text, spans)
    }

    pub fn into_parts(self) -> (String, Vec<MatchSpan>) {
        (self.text, self.spans)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of spans of the given kind
    pub fn count_kind(&self, kind: SpanKind) -> usize {
        self.spans.iter().filter(|s| s.kind == kind).count()
    }

    /// Split into consecutive `(segment, kind)` pieces; unmarked pieces carry `None`
    pub fn segments(&self) -> Vec<(&str, Option<SpanKind>)> {
        let mut segments = Vec::with_capacity(self.spans.len() * 2 + 1);
        let mut cursor = 0;

        for span in &self.spans {
            if span.start > cursor {
                segments.push((&self.text[cursor..span.start], None));
            }
            segments.push((&self.text[span.start..span.end], Some(span.kind)));
            cursor = span.end;
        }

        if cursor < self.text.len() {
            segments.push((&self.text[cursor..], None));
        }

        segments
    }

    /// Sub-range of the text with spans clipped to it and rebased to zero
    pub fn slice(&self, range: Range<usize>) -> MarkedText {
        let spans = self
            .spans
            .iter()
            .filter(|s| s.start < range.end && s.end > range.start)
            .map(|s| {
                MatchSpan::new(
                    s.start.max(range.start) - range.start,
                    s.end.min(range.end) - range.start,
                    s.kind,
                )
            })
            .collect();

        MarkedText {
            text: self.text[range].to_string(),
            spans,
        }
    }

    /// Leading and trailing whitespace removed, spans kept in place
    pub fn trimmed(&self) -> MarkedText {
        let start = self.text.len() - self.text.trim_start().len();
        let end = self.text.trim_end().len().max(start);
        self.slice(start..end)
    }

    /// Concatenate parts with `separator` between them, rebasing every span
    pub fn join(parts: &[MarkedText], separator: &str) -> MarkedText {
        let mut builder = MarkedTextBuilder::default();
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                builder.push_plain(separator);
            }
            builder.push_marked_text(part);
        }
        builder.finish()
    }
}

/// Incremental construction of a `MarkedText`
#[derive(Debug, Default)]
pub struct MarkedTextBuilder {
    text: String,
    spans: Vec<MatchSpan>,
}

impl MarkedTextBuilder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            text: String::with_capacity(capacity),
            spans: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn push_plain(&mut self, segment: &str) {
        self.text.push_str(segment);
    }

    pub fn push_marked(&mut self, segment: &str, kind: SpanKind) {
        if segment.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(segment);
        self.spans.push(MatchSpan::new(start, self.text.len(), kind));
    }

    /// Append already-marked text, keeping its spans
    pub fn push_marked_text(&mut self, marked: &MarkedText) {
        let offset = self.text.len();
        self.text.push_str(&marked.text);
        self.spans
            .extend(marked.spans.iter().map(|s| s.shifted(offset)));
    }

    pub fn finish(self) -> MarkedText {
        MarkedText::new(self.text, self.spans)
    }
}

/// Clip, sort and flatten spans so no two overlap.
///
/// Overlapping spans collapse into one carrying the earlier span's kind;
/// spans that merely touch are merged only when they share a kind.
fn flatten_spans(spans: Vec<MatchSpan>, text_len: usize) -> Vec<MatchSpan> {
    let mut spans: Vec<MatchSpan> = spans
        .into_iter()
        .map(|s| MatchSpan::new(s.start, s.end.min(text_len), s.kind))
        .filter(|s| s.start < s.end)
        .collect();
    spans.sort_by_key(|s| (s.start, s.end));

    let mut flattened: Vec<MatchSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match flattened.last_mut() {
            Some(last)
                if span.start < last.end || (span.start == last.end && span.kind == last.kind) =>
            {
                last.end = last.end.max(span.end);
            }
            _ => flattened.push(span),
        }
    }
    flattened
}
