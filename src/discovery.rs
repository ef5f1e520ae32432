use anyhow::Result;
use futures::stream::{Stream, StreamExt};
use glob::glob;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::output::is_generated_output;

/// Configuration for input discovery behavior
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Whether an unreadable input aborts discovery
    pub fail_fast: bool,
    /// Extensions (lowercase, no dot) picked up when scanning directories
    pub extensions: Vec<String>,
    /// Recurse into subdirectories of directory inputs
    pub recursive: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            extensions: vec!["txt".to_string()],
            recursive: true,
        }
    }
}

impl DiscoveryConfig {
    fn accepts(&self, path: &Path) -> bool {
        let extension_ok = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)));
        extension_ok && !is_generated_output(path)
    }
}

/// Result of input validation
#[derive(Debug, Clone)]
pub struct FileValidation {
    pub path: PathBuf,
    pub error: Option<String>,
}

/// Resolve CLI inputs into a stream of validated document paths.
///
/// Each input is an existing file (taken as is), a directory (scanned for
/// files with a configured extension, generated outputs excluded), or a
/// glob pattern. Inputs are resolved in order and their matches sorted.
pub fn discover_inputs(
    inputs: Vec<PathBuf>,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<FileValidation>> {
    futures::stream::unfold(DiscoveryState::new(inputs, config), |mut state| async move {
        state.next_file().await.map(|result| (result, state))
    })
}

/// Internal state for input iteration
struct DiscoveryState {
    inputs: VecDeque<PathBuf>,
    pending: VecDeque<PathBuf>,
    config: DiscoveryConfig,
}

impl DiscoveryState {
    fn new(inputs: Vec<PathBuf>, config: DiscoveryConfig) -> Self {
        Self {
            inputs: inputs.into(),
            pending: VecDeque::new(),
            config,
        }
    }

    async fn next_file(&mut self) -> Option<Result<FileValidation>> {
        loop {
            if let Some(path) = self.pending.pop_front() {
                return Some(self.validate_file(path).await);
            }

            let input = self.inputs.pop_front()?;
            match self.expand_input(&input) {
                Ok(paths) => {
                    debug!("Input {} resolved to {} files", input.display(), paths.len());
                    self.pending.extend(paths);
                }
                Err(e) => {
                    if self.config.fail_fast {
                        return Some(Err(e));
                    }
                    warn!("Skipping input {}: {}", input.display(), e);
                }
            }
        }
    }

    fn expand_input(&self, input: &Path) -> Result<Vec<PathBuf>> {
        if input.is_file() {
            return Ok(vec![input.to_path_buf()]);
        }
        if input.is_dir() {
            return Ok(self.scan_directory(input));
        }

        let pattern = input.to_string_lossy();
        let mut paths = Vec::new();
        for entry in glob(&pattern)? {
            match entry {
                Ok(path) if path.is_file() && !is_generated_output(&path) => paths.push(path),
                Ok(_) => {}
                Err(e) => {
                    if self.config.fail_fast {
                        return Err(anyhow::anyhow!("Glob iteration error: {e}"));
                    }
                    warn!("Glob iteration error: {}", e);
                }
            }
        }
        if paths.is_empty() {
            anyhow::bail!("No documents match {}", input.display());
        }
        paths.sort();
        Ok(paths)
    }

    fn scan_directory(&self, root: &Path) -> Vec<PathBuf> {
        let walker = WalkDir::new(root).follow_links(false).sort_by_file_name();
        let walker = if self.config.recursive {
            walker
        } else {
            walker.max_depth(1)
        };

        walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Directory traversal error under {}: {}", root.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.config.accepts(entry.path()))
            .map(|entry| entry.into_path())
            .collect()
    }

    async fn validate_file(&self, path: PathBuf) -> Result<FileValidation> {
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => Ok(FileValidation { path, error: None }),
            Ok(_) => {
                let error = format!("Path is not a file: {}", path.display());
                warn!("{}", error);
                Ok(FileValidation {
                    path,
                    error: Some(error),
                })
            }
            Err(e) => {
                let error = format!("Cannot access file {}: {}", path.display(), e);
                warn!("{}", error);
                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error));
                }
                Ok(FileValidation {
                    path,
                    error: Some(error),
                })
            }
        }
    }
}

/// Collect all discovered inputs, keeping validation details
pub async fn collect_discovered_files(
    inputs: Vec<PathBuf>,
    config: DiscoveryConfig,
) -> Result<Vec<FileValidation>> {
    let mut files = Vec::new();
    let mut stream = Box::pin(discover_inputs(inputs, config));

    while let Some(result) = stream.next().await {
        files.push(result?);
    }

    let valid_count = files.iter().filter(|f| f.error.is_none()).count();
    let invalid_count = files.len() - valid_count;
    if invalid_count > 0 {
        warn!("Found {} inputs with validation issues", invalid_count);
    }
    info!("Input discovery summary: {} valid, {} invalid", valid_count, invalid_count);

    Ok(files)
}

/// Paths of all valid documents under `inputs`.
///
/// Invalid inputs are skipped with a warning, or abort with `fail_fast`.
pub async fn find_documents(inputs: Vec<PathBuf>, config: DiscoveryConfig) -> Result<Vec<PathBuf>> {
    let fail_fast = config.fail_fast;
    let validations = collect_discovered_files(inputs, config).await?;

    let mut paths = Vec::with_capacity(validations.len());
    for file in validations {
        match file.error {
            Some(error) if fail_fast => anyhow::bail!(error),
            Some(error) => warn!("Skipping {}: {}", file.path.display(), error),
            None => paths.push(file.path),
        }
    }
    Ok(paths)
}
