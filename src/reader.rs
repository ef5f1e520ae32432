use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

/// Configuration for document reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether to fail fast on first error or return partial content
    pub fail_fast: bool,
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 8192,
        }
    }
}

/// Statistics for one document read
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReadStats {
    pub file_path: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
    pub read_error: Option<String>,
}

/// A document's text with line endings normalized to `\n`
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub text: String,
    pub stats: ReadStats,
}

impl Document {
    pub fn is_complete(&self) -> bool {
        self.stats.read_error.is_none()
    }
}

/// Async document reader with buffered line I/O
pub struct AsyncFileReader {
    config: ReaderConfig,
}

impl AsyncFileReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a document's lines; CRLF endings are stripped like LF
    pub async fn read_file_lines<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> Result<(Vec<String>, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();
        let mut stats = ReadStats {
            file_path: path.display().to_string(),
            ..Default::default()
        };

        debug!("Starting async read of document: {}", path.display());

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) => {
                let error_msg = format!("Failed to open document {}: {}", path.display(), e);
                warn!("{}", error_msg);
                if self.config.fail_fast {
                    return Err(anyhow::anyhow!(error_msg));
                }
                stats.duration_ms = start_time.elapsed().as_millis() as u64;
                stats.read_error = Some(error_msg);
                return Ok((Vec::new(), stats));
            }
        };

        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut lines = reader.lines();
        let mut result_lines = Vec::new();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    stats.bytes_read += line.len() as u64 + 1;
                    stats.lines_read += 1;
                    result_lines.push(line);
                }
                Ok(None) => break,
                Err(e) => {
                    let error_msg = format!(
                        "UTF-8 decoding error in {} at line {}: {}",
                        path.display(),
                        stats.lines_read + 1,
                        e
                    );
                    warn!("{}", error_msg);
                    if self.config.fail_fast {
                        return Err(anyhow::anyhow!(error_msg));
                    }
                    // partial content is returned with the error recorded
                    stats.duration_ms = start_time.elapsed().as_millis() as u64;
                    stats.read_error = Some(error_msg);
                    return Ok((result_lines, stats));
                }
            }
        }

        stats.duration_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Read {}: {} lines, {} bytes in {}ms",
            path.display(),
            stats.lines_read,
            stats.bytes_read,
            stats.duration_ms
        );
        Ok((result_lines, stats))
    }

    /// Read a whole document as one `\n`-joined string
    pub async fn read_document<P: AsRef<Path>>(&self, file_path: P) -> Result<Document> {
        let (lines, stats) = self.read_file_lines(file_path).await?;
        Ok(Document {
            text: lines.join("\n"),
            stats,
        })
    }
}

/// Read a single document with default configuration
pub async fn read_file_async<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let reader = AsyncFileReader::new(ReaderConfig::default());
    Ok(reader.read_document(file_path).await?.text)
}
