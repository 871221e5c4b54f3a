use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tupledistinct_core::{
    log_info, replace_settings, set_log_level, settings, Collection, Cursor, DistinctOutput,
    DistinctSettings, JsonLinesSource, LogLevel, MemoryCollection,
};

#[derive(Parser)]
#[command(name = "tupledistinct")]
#[command(about = "Distinct combinations of several document fields, with optional counts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run over one collection of a JSON export file
    Collection {
        /// JSON file in import format: { "collection_name": [documents...], ... }
        file: PathBuf,
        /// Collection to aggregate
        #[arg(long)]
        collection: String,
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        common: CommonArgs,
    },
    /// Stream a JSON Lines file (or stdin with "-") through the aggregation
    Stream {
        /// JSON Lines file, one document per line
        file: PathBuf,
        #[command(flatten)]
        query: QueryArgs,
        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct QueryArgs {
    /// Dotted field path; repeat for a tuple
    #[arg(short = 'p', long = "path", required = true)]
    paths: Vec<String>,
    /// Append the number of matching documents to every tuple
    #[arg(long)]
    count: bool,
}

#[derive(Args)]
struct CommonArgs {
    /// Progress status interval in milliseconds (0 or less disables it)
    #[arg(long)]
    interval_ms: Option<i64>,
    /// Settings file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// ERROR, WARN, INFO, DEBUG or TRACE
    #[arg(long)]
    log_level: Option<String>,
    /// Pretty-print the result
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Collection {
            file,
            collection,
            query,
            common,
        } => {
            apply_common(&common)?;
            let output = distinct_in_collection(&file, &collection, &query)?;
            print_output(&output, common.pretty)
        }
        Commands::Stream {
            file,
            query,
            common,
        } => {
            apply_common(&common)?;
            let output = distinct_in_stream(&file, &query)?;
            print_output(&output, common.pretty)
        }
    }
}

/// Install log level and settings before any entry point is built
fn apply_common(common: &CommonArgs) -> Result<()> {
    if let Some(level) = &common.log_level {
        let level: LogLevel = level
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("Invalid --log-level: {}", level))?;
        set_log_level(level);
    }

    let mut effective = match &common.config {
        Some(path) => load_settings(path)?,
        None => settings(),
    };
    if let Some(interval_ms) = common.interval_ms {
        effective = effective.with_status_interval(interval_ms);
    }
    replace_settings(effective);
    Ok(())
}

fn load_settings(path: &Path) -> Result<DistinctSettings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings: {}", path.display()))?;
    DistinctSettings::from_json_str(&content)
        .with_context(|| format!("Invalid settings in: {}", path.display()))
}

fn distinct_in_collection(file: &Path, name: &str, query: &QueryArgs) -> Result<DistinctOutput> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read file: {}", file.display()))?;

    let mut data: Map<String, Value> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in file: {}", file.display()))?;

    let Some(docs) = data.remove(name) else {
        let known: Vec<&String> = data.keys().collect();
        bail!("Collection '{}' not found in {} (found: {:?})", name, file.display(), known);
    };

    let backend = MemoryCollection::from_json_array(name, &docs)
        .with_context(|| format!("Failed to load collection '{}'", name))?;
    log_info!(
        "Loaded {} documents into '{}'",
        backend.count_documents(),
        name
    );

    Collection::new(backend)
        .distinct_tuple(query.paths.clone(), query.count)
        .with_context(|| format!("distinct_tuple failed on '{}'", name))
}

fn distinct_in_stream(file: &Path, query: &QueryArgs) -> Result<DistinctOutput> {
    let reader: Box<dyn BufRead> = if file == Path::new("-") {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let handle = File::open(file)
            .with_context(|| format!("Failed to open file: {}", file.display()))?;
        Box::new(BufReader::new(handle))
    };

    Cursor::new(JsonLinesSource::new(reader))
        .distinct_tuple(query.paths.clone(), query.count)
        .with_context(|| format!("distinct_tuple failed on {}", file.display()))
}

fn print_output(output: &DistinctOutput, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(output)
    } else {
        serde_json::to_string(output)
    }
    .with_context(|| "Failed to serialize result")?;

    println!("{}", json);
    Ok(())
}
