pub mod clause;
pub mod config;
pub mod dictionary;
pub mod discovery;
pub mod expander;
pub mod loader;
pub mod output;
pub mod parallel_processing;
pub mod reader;
pub mod render;

// Re-export the core types for library callers
pub use clause::{ClauseClassifier, ClauseState, LineDecision, ParagraphRecord, ParagraphRole};
pub use config::{ClassifierConfig, RidersConfig};
pub use dictionary::AbbreviationDictionary;
pub use expander::{expand, AbbreviationRewriter, ExpansionResult, MarkedText, MatchSpan, SpanKind};
pub use loader::{load_dictionary, DictionaryError, LoadReport};

// Re-export batch processing for the binary and benchmarks
pub use parallel_processing::{
    process_file, process_files_parallel, process_text, BatchConfig, FileStats, ProcessingMode,
    RunStats,
};
