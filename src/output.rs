// Output naming and writing for processed documents.
// Outputs sit next to their source (or in an output directory) as
// `{stem}{suffix}`, one file per output kind.

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Files written for a processed document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Expanded plain text
    Expanded,
    /// Expanded text as HTML with highlight marks
    Marked,
    /// Paragraph records as JSON
    Paragraphs,
    /// Paragraph records as an HTML preview
    Preview,
}

impl OutputKind {
    pub const ALL: [OutputKind; 4] = [
        OutputKind::Expanded,
        OutputKind::Marked,
        OutputKind::Paragraphs,
        OutputKind::Preview,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            OutputKind::Expanded => "_expanded.txt",
            OutputKind::Marked => "_marked.html",
            OutputKind::Paragraphs => "_paragraphs.json",
            OutputKind::Preview => "_preview.html",
        }
    }
}

/// Output path for `source`, in `out_dir` when given, else beside the source
pub fn generate_output_path(source_path: &Path, out_dir: Option<&Path>, kind: OutputKind) -> PathBuf {
    let file_stem = source_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let file_name = format!("{file_stem}{}", kind.suffix());
    match out_dir {
        Some(dir) => dir.join(file_name),
        None => source_path.with_file_name(file_name),
    }
}

/// True for files this tool writes, so directory scans skip them
pub fn is_generated_output(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| OutputKind::ALL.iter().any(|kind| name.ends_with(kind.suffix())))
}

/// Write `content` with a trailing newline, creating parent directories
pub async fn write_output(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let mut data = String::with_capacity(content.len() + 1);
    data.push_str(content);
    if !data.ends_with('\n') {
        data.push('\n');
    }
    tokio::fs::write(path, data).await?;
    debug!("Wrote output {}", path.display());
    Ok(())
}
