// Concurrent batch processing: documents share one read-only dictionary and
// classifier, each document gets its own classification state.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use crate::clause::{ClauseClassifier, ParagraphRecord};
use crate::dictionary::AbbreviationDictionary;
use crate::expander::{AbbreviationRewriter, MarkedText};
use crate::output::{generate_output_path, write_output, OutputKind};
use crate::reader::{AsyncFileReader, ReaderConfig};
use crate::render;

/// What a run produces for each document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Expanded plain text plus highlighted HTML
    #[default]
    Expand,
    /// Expansion followed by clause classification into paragraph records
    Format,
}

/// Batch run settings
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub mode: ProcessingMode,
    /// Directory for outputs; beside each source when unset
    pub out_dir: Option<PathBuf>,
    /// Documents processed concurrently
    pub jobs: usize,
    /// Abort the batch on the first failed document
    pub fail_fast: bool,
    pub show_progress: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::Expand,
            out_dir: None,
            jobs: num_cpus::get(),
            fail_fast: false,
            show_progress: false,
        }
    }
}

/// Everything produced for one document
#[derive(Debug, Clone)]
pub struct ProcessedDocument {
    pub plain: String,
    pub marked: MarkedText,
    /// Present in format mode
    pub paragraphs: Option<Vec<ParagraphRecord>>,
    pub expansions: usize,
    pub slash_normalizations: usize,
}

impl ProcessedDocument {
    pub fn heading_count(&self) -> usize {
        self.paragraphs
            .as_ref()
            .map_or(0, |records| records.iter().filter(|r| r.is_heading()).count())
    }

    /// Primary text output: expanded text, or paragraph JSON in format mode
    pub fn primary_output(&self) -> Result<String> {
        match &self.paragraphs {
            Some(records) => Ok(serde_json::to_string_pretty(records)?),
            None => Ok(self.plain.clone()),
        }
    }
}

/// Per-file processing statistics
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct FileStats {
    pub path: String,
    /// Characters in the source document
    pub chars_processed: u64,
    /// Characters in the expanded text
    pub chars_written: u64,
    /// Whitespace-separated words in the source document
    pub words_processed: u64,
    /// Whitespace-separated words in the expanded text
    pub words_written: u64,
    pub expansions: u64,
    pub slash_normalizations: u64,
    pub headings: u64,
    pub paragraphs: u64,
    pub processing_time_ms: u64,
    pub chars_per_sec: f64,
    /// success or failed
    pub status: String,
    pub error: Option<String>,
    pub outputs: Vec<String>,
}

impl FileStats {
    fn failed(path: &Path, error: &anyhow::Error, elapsed_ms: u64) -> Self {
        Self {
            path: path.display().to_string(),
            processing_time_ms: elapsed_ms,
            status: "failed".to_string(),
            error: Some(format!("{error:#}")),
            ..Default::default()
        }
    }
}

/// Aggregate statistics for a run
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct RunStats {
    /// Unix timestamp (seconds) at which the run started
    pub run_start: u64,
    pub mode: ProcessingMode,
    pub total_processing_time_ms: u64,
    pub total_chars_processed: u64,
    pub total_chars_written: u64,
    pub total_words_processed: u64,
    pub total_words_written: u64,
    pub total_expansions: u64,
    pub total_headings: u64,
    pub overall_chars_per_sec: f64,
    pub files_processed: u64,
    pub files_failed: u64,
    pub file_stats: Vec<FileStats>,
}

impl RunStats {
    fn new(mode: ProcessingMode) -> Self {
        Self {
            run_start: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
            mode,
            ..Default::default()
        }
    }

    fn record(&mut self, stats: FileStats) {
        if stats.error.is_some() {
            self.files_failed += 1;
        } else {
            self.files_processed += 1;
            self.total_chars_processed += stats.chars_processed;
            self.total_chars_written += stats.chars_written;
            self.total_words_processed += stats.words_processed;
            self.total_words_written += stats.words_written;
            self.total_expansions += stats.expansions;
            self.total_headings += stats.headings;
        }
        self.file_stats.push(stats);
    }

    fn finish(&mut self, elapsed_ms: u64) {
        self.total_processing_time_ms = elapsed_ms;
        self.overall_chars_per_sec = chars_per_sec(self.total_chars_processed, elapsed_ms);
        self.file_stats.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

fn chars_per_sec(chars: u64, elapsed_ms: u64) -> f64 {
    chars as f64 / (elapsed_ms.max(1) as f64 / 1000.0)
}

/// Expand one document and, in format mode, classify its lines
pub fn process_text(
    text: &str,
    dictionary: &AbbreviationDictionary,
    classifier: &ClauseClassifier,
    mode: ProcessingMode,
) -> ProcessedDocument {
    let expansion = AbbreviationRewriter::new(dictionary).expand(text);
    let plain = expansion.plain();
    let marked = expansion.marked();
    let expansions = expansion.expansion_count();
    let slash_normalizations = expansion.slash_count();

    let paragraphs = match mode {
        ProcessingMode::Expand => None,
        ProcessingMode::Format => Some(classifier.classify(expansion.into_lines())),
    };

    ProcessedDocument {
        plain,
        marked,
        paragraphs,
        expansions,
        slash_normalizations,
    }
}

/// Read, process and write the outputs of one document
pub async fn process_file(
    path: &Path,
    dictionary: Arc<AbbreviationDictionary>,
    classifier: Arc<ClauseClassifier>,
    config: &BatchConfig,
) -> Result<FileStats> {
    let start = Instant::now();
    let reader = AsyncFileReader::new(ReaderConfig {
        fail_fast: true,
        ..Default::default()
    });
    let document = reader.read_document(path).await?;
    let chars_processed = document.text.chars().count() as u64;
    let words_processed = word_count(&document.text);

    let mode = config.mode;
    let text = document.text;
    let processed = tokio::task::spawn_blocking(move || {
        process_text(&text, &dictionary, &classifier, mode)
    })
    .await
    .context("Document processing task failed")?;

    let title = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let out_dir = config.out_dir.as_deref();
    let mut outputs = Vec::new();

    match &processed.paragraphs {
        None => {
            let expanded = generate_output_path(path, out_dir, OutputKind::Expanded);
            write_output(&expanded, &processed.plain).await?;
            let marked = generate_output_path(path, out_dir, OutputKind::Marked);
            write_output(&marked, &render::marked_document_html(&processed.marked, title)).await?;
            outputs.extend([expanded, marked]);
        }
        Some(records) => {
            let json = generate_output_path(path, out_dir, OutputKind::Paragraphs);
            write_output(&json, &serde_json::to_string_pretty(records)?).await?;
            let preview = generate_output_path(path, out_dir, OutputKind::Preview);
            write_output(&preview, &render::paragraphs_to_html(records, title)).await?;
            outputs.extend([json, preview]);
        }
    }

    let elapsed_ms = start.elapsed().as_millis() as u64;
    let stats = FileStats {
        path: path.display().to_string(),
        chars_processed,
        chars_written: processed.plain.chars().count() as u64,
        words_processed,
        words_written: word_count(&processed.plain),
        expansions: processed.expansions as u64,
        slash_normalizations: processed.slash_normalizations as u64,
        headings: processed.heading_count() as u64,
        paragraphs: processed.paragraphs.as_ref().map_or(0, Vec::len) as u64,
        processing_time_ms: elapsed_ms,
        chars_per_sec: chars_per_sec(chars_processed, elapsed_ms),
        status: "success".to_string(),
        error: None,
        outputs: outputs.iter().map(|p| p.display().to_string()).collect(),
    };

    info!(
        "Processed {}: {} expansions, {} headings in {}ms",
        stats.path, stats.expansions, stats.headings, stats.processing_time_ms
    );
    Ok(stats)
}

/// Process `paths` with up to `config.jobs` documents in flight.
///
/// Without `fail_fast`, failed documents are recorded in the returned stats
/// and the batch continues.
pub async fn process_files_parallel(
    paths: Vec<PathBuf>,
    dictionary: Arc<AbbreviationDictionary>,
    classifier: Arc<ClauseClassifier>,
    config: &BatchConfig,
) -> Result<RunStats> {
    let start = Instant::now();
    let mut run_stats = RunStats::new(config.mode);

    let progress = if config.show_progress {
        let bar = ProgressBar::new(paths.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    info!("Processing {} documents with {} jobs", paths.len(), config.jobs.max(1));

    let mut results = stream::iter(paths)
        .map(|path| {
            let dictionary = Arc::clone(&dictionary);
            let classifier = Arc::clone(&classifier);
            async move {
                let file_start = Instant::now();
                let result = process_file(&path, dictionary, classifier, config).await;
                (path, result, file_start.elapsed().as_millis() as u64)
            }
        })
        .buffer_unordered(config.jobs.max(1));

    while let Some((path, result, elapsed_ms)) = results.next().await {
        progress.inc(1);
        match result {
            Ok(stats) => {
                progress.set_message(stats.path.clone());
                run_stats.record(stats);
            }
            Err(e) => {
                if config.fail_fast {
                    progress.abandon_with_message("aborted");
                    return Err(e.context(format!("Failed to process {}", path.display())));
                }
                warn!("Failed to process {}: {:#}", path.display(), e);
                run_stats.record(FileStats::failed(&path, &e, elapsed_ms));
            }
        }
    }

    progress.finish_and_clear();
    run_stats.finish(start.elapsed().as_millis() as u64);
    info!(
        "Batch complete: {} processed, {} failed in {}ms",
        run_stats.files_processed, run_stats.files_failed, run_stats.total_processing_time_ms
    );
    Ok(run_stats)
}

/// Write run statistics as pretty JSON
pub async fn write_run_stats(path: &Path, stats: &RunStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    write_output(path, &json)
        .await
        .with_context(|| format!("Failed to write stats file {}", path.display()))?;
    info!("Run stats written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dictionary() -> Arc<AbbreviationDictionary> {
        Arc::new([("mt", "metric ton"), ("cp", "charter party")].into_iter().collect())
    }

    fn classifier() -> Arc<ClauseClassifier> {
        Arc::new(ClauseClassifier::with_default_config().unwrap())
    }

    #[test]
    fn test_process_text_modes() {
        let text = "30. Laytime\nabt 500 mt per day as per cp";

        let expanded = process_text(text, &dictionary(), &classifier(), ProcessingMode::Expand);
        assert_eq!(expanded.plain, "30. Laytime\nabt 500 metric ton per day as per charter party");
        assert!(expanded.paragraphs.is_none());
        assert_eq!(expanded.expansions, 2);

        let formatted = process_text(text, &dictionary(), &classifier(), ProcessingMode::Format);
        let records = formatted.paragraphs.as_ref().unwrap();
        assert_eq!(records[0].text, "CLAUSE 30. LAYTIME");
        assert_eq!(records[1].highlight_spans.len(), 2);
        assert_eq!(formatted.heading_count(), 1);
    }

    #[tokio::test]
    async fn test_process_file_writes_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("rider.txt");
        std::fs::write(&source, "1. Vessel\n50000mt cp").unwrap();

        let config = BatchConfig {
            mode: ProcessingMode::Format,
            ..Default::default()
        };
        let stats = process_file(&source, dictionary(), classifier(), &config).await.unwrap();

        assert_eq!(stats.status, "success");
        assert_eq!(stats.headings, 1);
        assert_eq!(stats.paragraphs, 2);
        assert_eq!(stats.outputs.len(), 2);
        assert_eq!(stats.chars_processed, 20);
        assert_eq!(stats.chars_written, 40);
        assert_eq!(stats.words_processed, 4);
        assert_eq!(stats.words_written, 7);

        let json = std::fs::read_to_string(temp_dir.path().join("rider_paragraphs.json")).unwrap();
        let records: Vec<ParagraphRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(records[1].text, "50000 metric ton charter party");
        assert!(temp_dir.path().join("rider_preview.html").exists());
    }

    #[tokio::test]
    async fn test_failures_recorded_without_fail_fast() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.txt");
        std::fs::write(&good, "as per cp").unwrap();
        let missing = temp_dir.path().join("missing.txt");

        let config = BatchConfig {
            out_dir: Some(temp_dir.path().join("out")),
            jobs: 2,
            ..Default::default()
        };
        let stats = process_files_parallel(vec![good, missing.clone()], dictionary(), classifier(), &config)
            .await
            .unwrap();

        assert_eq!(stats.files_processed, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.total_expansions, 1);
        assert_eq!(stats.total_words_processed, 3);
        assert_eq!(stats.total_words_written, 4);
        let failed = stats.file_stats.iter().find(|s| s.error.is_some()).unwrap();
        assert_eq!(failed.path, missing.display().to_string());
        assert_eq!(failed.status, "failed");
        assert!(temp_dir.path().join("out/good_expanded.txt").exists());
        assert!(temp_dir.path().join("out/good_marked.html").exists());
    }

    #[tokio::test]
    async fn test_fail_fast_aborts() {
        let temp_dir = TempDir::new().unwrap();
        let config = BatchConfig {
            fail_fast: true,
            jobs: 1,
            ..Default::default()
        };
        let result = process_files_parallel(
            vec![temp_dir.path().join("missing.txt")],
            dictionary(),
            classifier(),
            &config,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_stats_json() {
        let temp_dir = TempDir::new().unwrap();
        let stats_path = temp_dir.path().join("run_stats.json");
        let mut stats = RunStats::new(ProcessingMode::Format);
        stats.finish(0);
        write_run_stats(&stats_path, &stats).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&stats_path).unwrap()).unwrap();
        assert_eq!(value["mode"], "format");
        assert!(value["file_stats"].as_array().unwrap().is_empty());
    }
}
