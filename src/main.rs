use anyhow::{Context, Result};
use clap::Parser;
use common::cli::{CommonArgs, SyncArgs, SyncCommands, utils};
use common::config::ConfigResolver;
use common::sync::{MalformedPathPolicy, extract_partitions};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "partition-sync")]
#[command(about = "Extract partition values from table partition paths for catalog sync")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    sync: SyncArgs,

    /// File listing one partition path per line (stdin when omitted)
    #[arg(long)]
    partitions: Option<PathBuf>,

    /// Skip partition paths that cannot be parsed instead of failing
    #[arg(long)]
    skip_malformed: bool,

    #[command(subcommand)]
    command: Option<SyncCommands>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::init_logging(&cli.common);

    if let Some(SyncCommands::Version) = cli.command {
        println!("{}", utils::version_info());
        return Ok(());
    }

    let properties = utils::load_properties(&cli.common, &cli.sync)?;
    let resolver =
        ConfigResolver::for_sync(properties).context("Failed to build configuration resolver")?;

    match cli.command.clone().unwrap_or_default() {
        SyncCommands::Config { json } => return utils::display_config(&resolver, json),
        SyncCommands::Validate => {
            utils::validate_config(&resolver)?;
            return Ok(());
        }
        SyncCommands::Version | SyncCommands::Extract => {}
    }

    let config = utils::validate_config(&resolver)?;
    if !config.enabled {
        log::debug!("Catalog sync is disabled, extracting partition values only");
    }

    let paths = read_partition_paths(cli.partitions.as_ref())?;
    let policy = if cli.skip_malformed {
        MalformedPathPolicy::Skip
    } else {
        MalformedPathPolicy::Abort
    };

    let report =
        extract_partitions(&config, &paths, policy).context("Failed to extract partitions")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for partition in &report.partitions {
        serde_json::to_writer(&mut out, partition).context("Failed to write partition values")?;
        writeln!(out).context("Failed to write partition values")?;
    }

    if !report.skipped.is_empty() {
        log::warn!("{} malformed partition path(s) skipped", report.skipped.len());
    }
    Ok(())
}

/// One partition path per line; blank lines are ignored.
fn read_partition_paths(source: Option<&PathBuf>) -> Result<Vec<String>> {
    let reader: Box<dyn BufRead> = match source {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open partition list {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut paths = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read partition list")?;
        let line = line.trim();
        if !line.is_empty() {
            paths.push(line.to_string());
        }
    }
    Ok(paths)
}
