// Run configuration loaded from an optional TOML file.
// Every field defaults to the built-in heuristic constants, so an empty file is valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::dictionary::AbbreviationDictionary;
use crate::loader::{load_dictionary, LoadReport};

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RidersConfig {
    /// Dictionary source used when none is given on the command line
    pub dictionary: Option<PathBuf>,
    /// Inline entries merged over the loaded dictionary (inline wins)
    pub abbreviations: BTreeMap<String, String>,
    /// Clause heading heuristic
    pub classifier: ClassifierConfig,
}

impl RidersConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid riders configuration")
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        // a relative dictionary path is relative to the config file
        if let (Some(dictionary), Some(base)) = (config.dictionary.as_mut(), path.parent()) {
            if dictionary.is_relative() {
                *dictionary = base.join(&*dictionary);
            }
        }

        info!(
            "Loaded config {}: {} inline abbreviations",
            path.display(),
            config.abbreviations.len()
        );
        Ok(config)
    }

    /// Load the dictionary from `source` (or the configured path) and merge
    /// the inline abbreviations over it; inline entries win.
    pub fn build_dictionary(
        &self,
        source: Option<&Path>,
    ) -> Result<(AbbreviationDictionary, LoadReport)> {
        let source = source.or(self.dictionary.as_deref());
        let (mut dictionary, report) = match source {
            Some(path) => load_dictionary(path)
                .with_context(|| format!("Failed to load dictionary {}", path.display()))?,
            None if !self.abbreviations.is_empty() => {
                (AbbreviationDictionary::new(), LoadReport::default())
            }
            None => anyhow::bail!("No dictionary given: pass --dictionary or set one in the config"),
        };

        dictionary.extend(self.abbreviations.iter());
        Ok((dictionary, report))
    }
}

/// Constants of the numbered clause heading heuristic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Largest forward jump from the expected clause number
    pub max_gap: u32,
    /// Jump allowed once clause numbers reach `late_threshold`
    pub late_max_gap: u32,
    pub late_threshold: u32,
    /// Titles longer than this are prose, not headings
    pub max_title_words: usize,
    /// Titles longer than this are moved into a body paragraph under the heading
    pub inline_title_words: usize,
    /// More modal verbs than this marks a sentence
    pub max_modal_words: usize,
    /// Title openings that mark prose; such lines are never headings
    pub prose_openers: Vec<String>,
    /// Title openings that keep the heading but move the title into the body
    pub split_openers: Vec<String>,
    pub modal_words: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_gap: 5,
            late_max_gap: 10,
            late_threshold: 90,
            max_title_words: 30,
            inline_title_words: 10,
            max_modal_words: 1,
            prose_openers: to_strings(&[
                "if",
                "when",
                "should",
                "in case",
                "notwithstanding",
                "subject to",
                "provided that",
                "it is understood that",
                "all",
                "any",
                "referring to",
                "during the",
                "the charterers shall",
                "the owners shall",
            ]),
            split_openers: to_strings(&[
                "in case",
                "if",
                "referring to",
                "during the",
                "where and when",
                "should the",
            ]),
            modal_words: to_strings(&["shall", "will", "must", "should", "may", "can"]),
        }
    }
}

impl ClassifierConfig {
    /// Forward tolerance for a candidate clause `number`
    pub fn max_gap_for(&self, number: u32) -> u32 {
        if number >= self.late_threshold {
            self.late_max_gap
        } else {
            self.max_gap
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
