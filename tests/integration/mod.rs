// Integration test utilities shared by the test binaries

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use riders::output::{generate_output_path, OutputKind};

/// Temporary directory holding rider documents and dictionaries
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
}

impl TestFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();
        Self {
            temp_dir,
            root_path,
        }
    }

    /// Write a document (parent directories created as needed)
    pub fn create_document<P: AsRef<Path>>(&self, relative_path: P, content: &str) -> PathBuf {
        let file_path = self.root_path.join(relative_path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// Write a CSV dictionary with the standard header row
    pub fn create_csv_dictionary(&self, name: &str, entries: &[(&str, &str)]) -> PathBuf {
        let mut content = String::from("Abbreviation,Full Form\n");
        for (abbreviation, full_form) in entries {
            content.push_str(&format!("\"{abbreviation}\",\"{full_form}\"\n"));
        }
        self.create_document(name, &content)
    }

    pub fn output_path<P: AsRef<Path>>(&self, source_path: P, kind: OutputKind) -> PathBuf {
        generate_output_path(source_path.as_ref(), None, kind)
    }

    pub fn read_output<P: AsRef<Path>>(&self, source_path: P, kind: OutputKind) -> String {
        fs::read_to_string(self.output_path(source_path, kind)).expect("Failed to read output file")
    }
}

/// Compare two strings line by line, reporting the first differing line
pub fn assert_golden_file(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context,
                i + 1,
                expected_line,
                actual_line
            );
        }
    }

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines",
            context,
            expected_lines.len(),
            actual_lines.len()
        );
    }
}

/// Remove `<mark ...>` and `</mark>` tags, then undo HTML escaping
pub fn strip_marks(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let close = rest[open..].find('>').expect("unterminated tag") + open;
        let tag = &rest[open..=close];
        if !(tag.starts_with("<mark") || tag == "</mark>") {
            text.push_str(tag);
        }
        rest = &rest[close + 1..];
    }
    text.push_str(rest);

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
