use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, error::ErrorKind};

use crate::census::SourceCensus;
use crate::config::{SamplerConfig, TextPolicy};
use crate::constants::cli::DEFAULT_LOG_FILTER;
use crate::duplicates::find_duplicate_questions;
use crate::filter::RecordFilter;
use crate::metrics::bucket_skew;
use crate::pipeline::{SampleReport, StratifiedSampler};
use crate::source::JsonlSource;
use crate::utils::{format_share, format_with_commas};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TextPolicyArg {
    StrictAscii,
    AllowTypographic,
}

impl From<TextPolicyArg> for TextPolicy {
    fn from(value: TextPolicyArg) -> Self {
        match value {
            TextPolicyArg::StrictAscii => TextPolicy::StrictAscii,
            TextPolicyArg::AllowTypographic => TextPolicy::AllowTypographic,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "strata",
    disable_help_subcommand = true,
    about = "Stratified reservoir sampling for JSONL corpora",
    long_about = "Build a representative mini-corpus from large line-delimited JSON shards, with per-source quotas proportional to a census."
)]
struct StrataCli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sample a proportional mini-corpus and write it as JSONL.
    Sample(SampleArgs),
    /// Count records per raw source tag.
    Census(CensusArgs),
    /// Report first-message questions that occur more than once.
    Duplicates(DuplicatesArgs),
}

#[derive(Debug, Args)]
#[command(
    after_help = "Inputs are streamed in the order given; a directory contributes its *.jsonl files in sorted order. Without --config the AM-DeepSeek-R1-Distilled census is used."
)]
struct SampleArgs {
    #[arg(
        long = "input",
        value_name = "PATH",
        required = true,
        help = "Input JSONL file or directory, repeat as needed in stream order"
    )]
    inputs: Vec<PathBuf>,
    #[arg(long, value_name = "PATH", help = "Destination JSONL file")]
    output: PathBuf,
    #[arg(
        long,
        value_name = "FILE",
        help = "JSON config with populations, parent_map, target, seed, text_policy"
    )]
    config: Option<PathBuf>,
    #[arg(long, value_parser = parse_target, help = "Override the target sample size")]
    target: Option<usize>,
    #[arg(long, help = "Deterministic seed override")]
    seed: Option<u64>,
    #[arg(long = "text-policy", value_enum, help = "Non-ASCII screening override")]
    text_policy: Option<TextPolicyArg>,
    #[arg(
        long,
        value_name = "FILE",
        help = "Optional path for the run report as pretty JSON"
    )]
    report: Option<PathBuf>,
    #[arg(long = "follow-symlinks", help = "Follow symlinks when expanding directories")]
    follow_symlinks: bool,
}

#[derive(Debug, Args)]
struct CensusArgs {
    #[arg(
        long = "input",
        value_name = "PATH",
        required = true,
        help = "Input JSONL file or directory, repeat as needed"
    )]
    inputs: Vec<PathBuf>,
    #[arg(long, help = "Count only records that pass the sampling filter")]
    filtered: bool,
    #[arg(
        long = "roll-up",
        help = "Aggregate tags through the parent map and print a populations table as JSON"
    )]
    roll_up: bool,
    #[arg(long, value_name = "FILE", help = "JSON config supplying the parent map")]
    config: Option<PathBuf>,
    #[arg(long = "text-policy", value_enum, help = "Non-ASCII screening for --filtered")]
    text_policy: Option<TextPolicyArg>,
}

#[derive(Debug, Args)]
struct DuplicatesArgs {
    #[arg(
        long = "input",
        value_name = "PATH",
        required = true,
        help = "Input JSONL file or directory, repeat as needed"
    )]
    inputs: Vec<PathBuf>,
}

/// Run the `strata` command line with the given arguments (program name excluded).
pub fn run<I>(args_iter: I) -> Result<(), Box<dyn Error>>
where
    I: Iterator<Item = String>,
{
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let Some(cli) =
        parse_cli::<StrataCli, _>(std::iter::once("strata".to_string()).chain(args_iter))?
    else {
        return Ok(());
    };

    match cli.command {
        Command::Sample(args) => run_sample(args),
        Command::Census(args) => run_census(args),
        Command::Duplicates(args) => run_duplicates(args),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SamplerConfig, Box<dyn Error>> {
    Ok(match path {
        Some(path) => SamplerConfig::from_json_file(path)?,
        None => SamplerConfig::default(),
    })
}

fn run_sample(args: SampleArgs) -> Result<(), Box<dyn Error>> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(target) = args.target {
        config.target = target;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if let Some(policy) = args.text_policy {
        config.text_policy = policy.into();
    }

    let sampler = StratifiedSampler::new(config)?;
    let source = JsonlSource::new(args.inputs).with_follow_symlinks(args.follow_symlinks);
    let report = sampler.run(&source, &args.output)?;

    print_sample_report(&report);
    if let Some(path) = args.report {
        fs::write(&path, serde_json::to_vec_pretty(&report)?)?;
        println!("report written to {}", path.display());
    }
    println!(
        "\nDone - wrote {} records to {}",
        report.selected,
        args.output.display()
    );
    Ok(())
}

fn print_sample_report(report: &SampleReport) {
    println!("=== stratified sample ===");
    println!("target: {}", format_with_commas(report.target as u128));
    match report.seed {
        Some(seed) => println!("seed: {seed}"),
        None => println!("seed: (os entropy)"),
    }
    println!(
        "lines read: {} across {} file(s)",
        format_with_commas(u128::from(report.lines_read)),
        report.files
    );
    println!(
        "malformed: {}  blank: {}  unclassified: {}",
        format_with_commas(u128::from(report.malformed_lines)),
        format_with_commas(u128::from(report.blank_lines)),
        format_with_commas(u128::from(report.unclassified))
    );
    for (reason, count) in &report.rejected {
        println!(
            "rejected [{reason}]: {}",
            format_with_commas(u128::from(*count))
        );
    }
    println!("admitted: {}", format_with_commas(report.admitted as u128));
    println!();

    println!("[BUCKETS]");
    for (name, bucket) in &report.buckets {
        println!(
            "  {:<24} population={:>10} quota={:>5} seen={:>9} kept={:>5} topped_up={:>4}",
            name,
            format_with_commas(u128::from(bucket.population)),
            bucket.quota,
            format_with_commas(u128::from(bucket.seen)),
            bucket.reserved,
            bucket.topped_up
        );
    }
    println!();

    if let Some(skew) = bucket_skew(report) {
        println!("[SKEW]");
        println!(
            "  max share drift vs census: {}",
            format_share(skew.max_drift)
        );
        for share in skew.per_bucket.iter().take(3) {
            println!(
                "  {:<24} census={:>7} sample={:>7} drift={:+.4}",
                share.bucket,
                format_share(share.census_share),
                format_share(share.sample_share),
                share.drift()
            );
        }
        println!();
    }

    println!(
        "selected: {} (fallback {}, shortfall {})",
        format_with_commas(report.selected as u128),
        report.fallback,
        report.shortfall
    );
}

fn run_census(args: CensusArgs) -> Result<(), Box<dyn Error>> {
    let mut config = load_config(args.config.as_ref())?;
    if let Some(policy) = args.text_policy {
        config.text_policy = policy.into();
    }
    let filter = args.filtered.then(|| RecordFilter::new(config.text_policy));
    let census = SourceCensus::scan(&JsonlSource::new(args.inputs), filter.as_ref())?;

    if args.roll_up {
        let populations = census.roll_up(&config);
        println!("{}", serde_json::to_string_pretty(&populations)?);
        return Ok(());
    }

    println!("Found the following unique source tags:");
    for (tag, count) in &census.tags {
        println!(
            "  {:<28} {:>12}",
            format!("{tag:?}"),
            format_with_commas(u128::from(*count))
        );
    }
    println!();
    println!(
        "tagged records: {}",
        format_with_commas(u128::from(census.tagged()))
    );
    println!(
        "untagged records: {}",
        format_with_commas(u128::from(census.untagged))
    );
    if args.filtered {
        println!(
            "rejected by filter: {}",
            format_with_commas(u128::from(census.rejected))
        );
    }
    println!(
        "malformed lines: {}",
        format_with_commas(u128::from(census.malformed))
    );
    Ok(())
}

fn run_duplicates(args: DuplicatesArgs) -> Result<(), Box<dyn Error>> {
    let duplicates = find_duplicate_questions(&JsonlSource::new(args.inputs))?;
    if duplicates.is_empty() {
        println!("No duplicate questions found.");
        return Ok(());
    }
    println!("Duplicate user questions (count > 1):\n");
    for duplicate in &duplicates {
        println!("[{}x] {}\n", duplicate.count, duplicate.question);
    }
    Ok(())
}

fn parse_target(raw: &str) -> Result<usize, String> {
    raw.parse::<usize>().map_err(|_| {
        format!(
            "Could not parse --target value '{}' as a non-negative integer",
            raw
        )
    })
}

fn parse_cli<T, I>(args: I) -> Result<Option<T>, Box<dyn Error>>
where
    T: Parser,
    I: IntoIterator,
    I::Item: Into<std::ffi::OsString> + Clone,
{
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                err.print()?;
                Ok(None)
            }
            _ => Err(err.into()),
        },
    }
}
