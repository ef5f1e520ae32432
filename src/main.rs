use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

use riders::discovery::{find_documents, DiscoveryConfig};
use riders::parallel_processing::write_run_stats;
use riders::reader::{AsyncFileReader, ReaderConfig};
use riders::{
    process_files_parallel, process_text, BatchConfig, ClauseClassifier, ProcessingMode,
    RidersConfig,
};

#[derive(Parser, Debug)]
#[command(name = "riders")]
#[command(about = "Expands chartering abbreviations and standardizes rider clause headings")]
#[command(version)]
struct Args {
    /// Documents, directories or glob patterns; reads stdin when empty
    inputs: Vec<PathBuf>,

    /// Abbreviation dictionary (xlsx, xls, ods, csv, tsv, json, toml)
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Expand abbreviations only, or also format clause headings
    #[arg(long, value_enum, default_value_t = ProcessingMode::Expand)]
    mode: ProcessingMode,

    /// Directory for output files (defaults to beside each input)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Write run statistics JSON to this path
    #[arg(long)]
    stats_out: Option<PathBuf>,

    /// Abort on first error
    #[arg(long)]
    fail_fast: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Documents processed concurrently
    #[arg(short, long, default_value_t = num_cpus::get())]
    jobs: usize,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Print results to stdout instead of writing output files
    #[arg(long)]
    stdout: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.quiet {
        LevelFilter::WARN
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .json()
        .init();

    info!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => RidersConfig::load(path).await?,
        None => RidersConfig::default(),
    };

    let dictionary_path = args.dictionary.clone();
    let loader_config = config.clone();
    let (dictionary, report) = tokio::task::spawn_blocking(move || {
        loader_config.build_dictionary(dictionary_path.as_deref())
    })
    .await??;
    info!(
        entries = dictionary.len(),
        skipped = report.skipped,
        duplicates = report.duplicates,
        "Dictionary ready"
    );

    let dictionary = Arc::new(dictionary);
    let classifier = Arc::new(ClauseClassifier::new(config.classifier.clone())?);

    if args.inputs.is_empty() {
        let mut text = String::new();
        tokio::io::stdin().read_to_string(&mut text).await?;
        let processed = process_text(&text, &dictionary, &classifier, args.mode);
        println!("{}", processed.primary_output()?);
        return Ok(());
    }

    let discovery_config = DiscoveryConfig {
        fail_fast: args.fail_fast,
        ..Default::default()
    };
    let paths = find_documents(args.inputs.clone(), discovery_config).await?;

    if paths.is_empty() {
        anyhow::bail!("No documents found in the given inputs");
    }
    info!("Discovered {} documents", paths.len());

    if args.stdout {
        let reader = AsyncFileReader::new(ReaderConfig {
            fail_fast: true,
            ..Default::default()
        });
        for path in &paths {
            let document = reader.read_document(path).await?;
            let processed = process_text(&document.text, &dictionary, &classifier, args.mode);
            println!("{}", processed.primary_output()?);
        }
        return Ok(());
    }

    let batch_config = BatchConfig {
        mode: args.mode,
        out_dir: args.out_dir.clone(),
        jobs: args.jobs.max(1),
        fail_fast: args.fail_fast,
        show_progress: !args.no_progress && !args.quiet,
    };
    let run_stats = process_files_parallel(paths, dictionary, classifier, &batch_config).await?;

    if let Some(stats_out) = &args.stats_out {
        write_run_stats(stats_out, &run_stats).await?;
    }

    println!(
        "riders v{}: {} documents processed, {} failed, {} expansions, {} clause headings, {} -> {} words",
        env!("CARGO_PKG_VERSION"),
        run_stats.files_processed,
        run_stats.files_failed,
        run_stats.total_expansions,
        run_stats.total_headings,
        run_stats.total_words_processed,
        run_stats.total_words_written
    );

    if run_stats.files_failed > 0 {
        warn!("{} documents failed", run_stats.files_failed);
    }
    Ok(())
}
