// Abbreviation dictionary threaded read-only through every expansion call.
// Keys are stored trimmed and lowercased; values trimmed with case preserved.

use std::collections::HashMap;

/// Word characters as used for match boundaries: alphanumerics and underscore
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// True when the character before `pos` is absent or not a word character
pub(crate) fn has_left_boundary(text: &str, pos: usize) -> bool {
    text[..pos]
        .chars()
        .next_back()
        .map_or(true, |c| !is_word_char(c))
}

/// True when the character at `pos` is absent or not a word character
pub(crate) fn has_right_boundary(text: &str, pos: usize) -> bool {
    text[pos..].chars().next().map_or(true, |c| !is_word_char(c))
}

/// Result of inserting a row into the dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// Key existed; the new value replaced the old one
    Replaced,
    /// Empty key or value; nothing stored
    Skipped,
}

/// A dictionary match found in some text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryMatch<'d> {
    /// Byte offset just past the matched abbreviation
    pub end: usize,
    pub full_form: &'d str,
}

/// Mapping from lowercase abbreviation to full form
#[derive(Debug, Clone, Default)]
pub struct AbbreviationDictionary {
    entries: HashMap<String, String>,
    /// Length in characters of the longest key, bounds the candidate window
    max_key_chars: usize,
}

impl AbbreviationDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry; the last value inserted for a key wins
    pub fn insert(&mut self, abbreviation: &str, full_form: &str) -> InsertOutcome {
        let key = abbreviation.trim().to_lowercase();
        let value = full_form.trim();
        if key.is_empty() || value.is_empty() {
            return InsertOutcome::Skipped;
        }

        self.max_key_chars = self.max_key_chars.max(key.chars().count());
        match self.entries.insert(key, value.to_string()) {
            Some(_) => InsertOutcome::Replaced,
            None => InsertOutcome::Inserted,
        }
    }

    /// Case-insensitive lookup of a single abbreviation
    pub fn get(&self, abbreviation: &str) -> Option<&str> {
        self.entries
            .get(&abbreviation.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, abbreviation: &str) -> bool {
        self.get(abbreviation).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_key_chars(&self) -> usize {
        self.max_key_chars
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Longest key starting exactly at `start` and ending no later than `limit`.
    ///
    /// The match must be followed by a non-word character (checked against the
    /// full `text`, not the limit) so it never stops inside a longer word. The
    /// left boundary is the caller's concern.
    pub fn longest_match_within(
        &self,
        text: &str,
        start: usize,
        limit: usize,
    ) -> Option<DictionaryMatch<'_>> {
        if start >= limit || self.entries.is_empty() {
            return None;
        }

        // Candidate end offsets for keys of 1..=max_key_chars characters
        let window = &text[start..limit];
        let ends: Vec<usize> = window
            .char_indices()
            .skip(1)
            .map(|(i, _)| start + i)
            .chain(std::iter::once(limit))
            .take(self.max_key_chars)
            .collect();

        ends.into_iter().rev().find_map(|end| {
            if !has_right_boundary(text, end) {
                return None;
            }
            self.entries
                .get(&text[start..end].to_lowercase())
                .map(|full_form| DictionaryMatch {
                    end,
                    full_form: full_form.as_str(),
                })
        })
    }

    /// Longest key starting at `start`, anywhere up to the end of `text`
    pub fn longest_match_at(&self, text: &str, start: usize) -> Option<DictionaryMatch<'_>> {
        self.longest_match_within(text, start, text.len())
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for AbbreviationDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dictionary = Self::new();
        dictionary.extend(iter);
        dictionary
    }
}

impl<K: AsRef<str>, V: AsRef<str>> Extend<(K, V)> for AbbreviationDictionary {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (abbreviation, full_form) in iter {
            self.insert(abbreviation.as_ref(), full_form.as_ref());
        }
    }
}
