use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use wordtally_core::config::{AggregationMode, DecodePolicy, PipelineConfig, DEFAULT_WINDOW_SIZE};
use wordtally_core::pipeline::{Pipeline, VecSink};
use wordtally_core::types::{EventTime, TextRecord};

#[derive(Parser, Debug)]
#[command(name = "wordtally")]
#[command(about = "Count words over a stream of text lines", long_about = None)]
struct Cli {
    /// Input file of text lines; reads stdin when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Number of counter tasks.
    #[arg(long, default_value_t = 1)]
    parallelism: usize,
    /// Count per (word, tumbling window) instead of per word globally.
    #[arg(long)]
    windowed: bool,
    /// Tumbling window size in milliseconds (with --windowed).
    #[arg(long, default_value_t = DEFAULT_WINDOW_SIZE.as_millis() as u64)]
    window_size_ms: u64,
    /// What to do with a line that is not valid UTF-8 input.
    #[arg(long, value_enum, default_value = "skip")]
    on_decode_error: OnDecodeError,
    /// Logical name of the aggregation store.
    #[arg(long, default_value = "WordCounts-1")]
    store_name: String,
    /// Print every count update instead of only the final counts.
    #[arg(long)]
    updates: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OnDecodeError {
    Skip,
    Fail,
}

impl From<OnDecodeError> for DecodePolicy {
    fn from(arg: OnDecodeError) -> Self {
        match arg {
            OnDecodeError::Skip => DecodePolicy::Skip,
            OnDecodeError::Fail => DecodePolicy::Fail,
        }
    }
}

fn now_millis() -> EventTime {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as EventTime)
        .unwrap_or(0)
}

fn read_records(input: Option<&PathBuf>, windowed: bool) -> anyhow::Result<Vec<TextRecord>> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        // Ingest time stands in for event time; a real deployment would
        // read it off the source records.
        records.push(if windowed {
            TextRecord::with_timestamp(line, now_millis())
        } else {
            TextRecord::new(line)
        });
    }
    Ok(records)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mode = if cli.windowed {
        AggregationMode::TumblingWindow(Duration::from_millis(cli.window_size_ms))
    } else {
        AggregationMode::Global
    };
    let config = PipelineConfig {
        mode,
        parallelism: cli.parallelism,
        store_name: cli.store_name.clone(),
        decode_policy: cli.on_decode_error.into(),
        ..Default::default()
    };

    let records = read_records(cli.input.as_ref(), cli.windowed)?;
    info!(records = records.len(), "read input");

    let pipeline = Pipeline::new(config)?;
    let mut sink = VecSink::new();
    pipeline.run(records, &mut sink)?;

    if cli.updates {
        for update in &sink.records {
            println!("{update}");
        }
        return Ok(());
    }

    // Final count per counter key, sorted for deterministic output.
    let mut finals = BTreeMap::new();
    for update in sink.records {
        finals.insert((update.window_start, update.word.clone()), update);
    }
    for update in finals.values() {
        println!("{update}");
    }

    Ok(())
}
