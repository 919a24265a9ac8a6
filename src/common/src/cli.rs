use crate::config::{PropertyBag, keys};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Common CLI arguments
#[derive(Parser, Debug, Clone, Default)]
pub struct CommonArgs {
    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(short, long, help = "Enable quiet mode (minimal output)")]
    pub quiet: bool,
}

/// Flags mapping directly onto sync configuration keys.
///
/// Only flags that are actually given end up in the property bag, so that
/// absent flags leave room for inference and defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    #[arg(long, help = "Name of the target database")]
    pub database: Option<String>,

    #[arg(long, help = "Name of the target table")]
    pub table: Option<String>,

    #[arg(long, help = "Base path of the table to sync")]
    pub base_path: Option<String>,

    #[arg(long, help = "Format of the base files (e.g. PARQUET, HFILE)")]
    pub base_file_format: Option<String>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Fields the table is partitioned by, in partition order"
    )]
    pub partitioned_by: Vec<String>,

    #[arg(
        long,
        help = "Partition value extractor, e.g. extractor::MultiPartKeys"
    )]
    pub partition_value_extractor: Option<String>,

    #[arg(long, help = "Assume standard yyyy/mm/dd partitioning")]
    pub assume_date_partitioning: bool,

    #[arg(long, help = "Decode partition values that were URL-encoded when written")]
    pub decode_partition: bool,
}

impl SyncArgs {
    /// Properties explicitly set on the command line.
    pub fn to_properties(&self) -> PropertyBag {
        let mut properties = PropertyBag::new();

        let optional = [
            (keys::SYNC_DATABASE, &self.database),
            (keys::SYNC_TABLE, &self.table),
            (keys::SYNC_BASE_PATH, &self.base_path),
            (keys::SYNC_BASE_FILE_FORMAT, &self.base_file_format),
            (
                keys::SYNC_PARTITION_EXTRACTOR_CLASS,
                &self.partition_value_extractor,
            ),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                properties.insert(key, value.clone());
            }
        }

        if !self.partitioned_by.is_empty() {
            properties.insert(keys::SYNC_PARTITION_FIELDS, self.partitioned_by.join(","));
        }
        if self.assume_date_partitioning {
            properties.insert(keys::SYNC_ASSUME_DATE_PARTITIONING, "true");
        }
        if self.decode_partition {
            properties.insert(keys::SYNC_DECODE_PARTITION_VALUES, "true");
        }

        properties
    }
}

/// Subcommands of the sync binary
#[derive(Subcommand, Debug, Clone, Default)]
pub enum SyncCommands {
    /// Extract partition values from partition paths (default behavior)
    #[default]
    Extract,
    /// Show resolved configuration and exit
    Config {
        #[arg(long, help = "Show configuration in JSON format")]
        json: bool,
    },
    /// Validate configuration and exit
    Validate,
    /// Show version information and exit
    Version,
}

/// Utility functions for CLI operations
pub mod utils {
    use super::*;
    use crate::config::{ConfigResolver, SyncConfig};
    use anyhow::{Context, Result};
    use tracing_subscriber::EnvFilter;

    /// Initialize logging based on CLI arguments
    pub fn init_logging(args: &CommonArgs) {
        let level = if args.quiet {
            "warn"
        } else if args.verbose {
            "debug"
        } else {
            "info"
        };

        // stdout carries extracted partitions, logs go to stderr
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(level))
            .with_writer(std::io::stderr)
            .init();
    }

    /// Gather properties from file, environment and flags, flags winning.
    pub fn load_properties(common: &CommonArgs, sync: &SyncArgs) -> Result<PropertyBag> {
        let mut properties = match &common.config {
            Some(path) => {
                log::info!("Loading configuration from: {}", path.display());
                PropertyBag::load_from_path(path).context("Failed to load configuration")?
            }
            None => PropertyBag::load().context("Failed to load configuration")?,
        };
        properties.merge(sync.to_properties());
        Ok(properties)
    }

    /// Display resolved configuration in human-readable or JSON format
    pub fn display_config(resolver: &ConfigResolver, json: bool) -> Result<()> {
        println!("{}", render_config(resolver, json)?);
        Ok(())
    }

    /// Resolved configuration with each key's source and documentation.
    pub fn render_config(resolver: &ConfigResolver, json: bool) -> Result<String> {
        let resolved = resolver
            .resolve_all()
            .context("Failed to resolve configuration")?;
        let documentation = |key: &str| {
            resolver
                .catalog()
                .get(key)
                .map(|property| property.documentation())
                .unwrap_or_default()
        };

        if json {
            let mut map = serde_json::Map::new();
            for (key, value) in resolved {
                map.insert(
                    key.to_string(),
                    serde_json::json!({
                        "value": value.value,
                        "source": value.source,
                        "documentation": documentation(key),
                    }),
                );
            }
            return serde_json::to_string_pretty(&map)
                .context("Failed to serialize configuration to JSON");
        }

        let mut out = String::from("Partition Sync Configuration:\n");
        out.push_str("=============================\n");
        for (key, value) in resolved {
            out.push_str(&format!(
                "{key}: {} ({:?})\n    {}\n",
                value.value.as_deref().unwrap_or("<unset>"),
                value.source,
                documentation(key)
            ));
        }
        Ok(out)
    }

    /// Validate configuration and report any issues
    pub fn validate_config(resolver: &ConfigResolver) -> Result<SyncConfig> {
        log::info!("Validating configuration...");
        let config = SyncConfig::from_resolver(resolver).context("Invalid sync configuration")?;
        log::info!("✅ Configuration validation passed");
        Ok(config)
    }

    /// Standard version information
    pub fn version_info() -> String {
        format!(
            "{} {} ({})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_RUST_VERSION")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        common: CommonArgs,
        #[command(flatten)]
        sync: SyncArgs,
    }

    fn parse(args: &[&str]) -> TestCli {
        TestCli::try_parse_from(std::iter::once("partition-sync").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_sync_commands_default() {
        let default_cmd = SyncCommands::default();
        assert!(matches!(default_cmd, SyncCommands::Extract));
    }

    #[test]
    fn test_version_info() {
        let version = utils::version_info();
        assert!(version.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn test_flags_map_to_keys() {
        let cli = parse(&[
            "--database",
            "analytics",
            "--table",
            "trips",
            "--base-path",
            "s3://bucket/trips",
            "--base-file-format",
            "ORC",
            "--partitioned-by",
            "region,day",
            "--partition-value-extractor",
            "extractor::MultiPartKeys",
            "--assume-date-partitioning",
            "--decode-partition",
        ]);
        let properties = cli.sync.to_properties();

        assert_eq!(properties.get(keys::SYNC_DATABASE), Some("analytics"));
        assert_eq!(properties.get(keys::SYNC_TABLE), Some("trips"));
        assert_eq!(properties.get(keys::SYNC_BASE_PATH), Some("s3://bucket/trips"));
        assert_eq!(properties.get(keys::SYNC_BASE_FILE_FORMAT), Some("ORC"));
        assert_eq!(properties.get(keys::SYNC_PARTITION_FIELDS), Some("region,day"));
        assert_eq!(
            properties.get(keys::SYNC_PARTITION_EXTRACTOR_CLASS),
            Some("extractor::MultiPartKeys")
        );
        assert_eq!(properties.get(keys::SYNC_ASSUME_DATE_PARTITIONING), Some("true"));
        assert_eq!(properties.get(keys::SYNC_DECODE_PARTITION_VALUES), Some("true"));
    }

    #[test]
    fn test_partitioned_by_repeated() {
        let cli = parse(&["--partitioned-by", "region", "--partitioned-by", "day"]);
        assert_eq!(
            cli.sync.to_properties().get(keys::SYNC_PARTITION_FIELDS),
            Some("region,day")
        );
    }

    #[test]
    fn test_render_config_includes_documentation() {
        use crate::config::ConfigResolver;

        let resolver =
            ConfigResolver::for_sync(PropertyBag::new().with(keys::SYNC_BASE_PATH, "/t")).unwrap();

        let text = utils::render_config(&resolver, false).unwrap();
        assert!(text.contains("sync.base_path: /t (Raw)"));
        assert!(text.contains("Base path of the table to sync."));

        let json: serde_json::Value =
            serde_json::from_str(&utils::render_config(&resolver, true).unwrap()).unwrap();
        assert_eq!(json[keys::SYNC_DATABASE]["value"], "default");
        assert_eq!(json[keys::SYNC_DATABASE]["source"], "default");
        assert_eq!(
            json[keys::SYNC_DATABASE]["documentation"],
            "Name of the destination database."
        );
    }

    #[test]
    fn test_absent_flags_leave_room_for_inference() {
        let cli = parse(&["--verbose"]);
        assert!(cli.common.verbose);
        assert!(cli.sync.to_properties().is_empty());
    }
}
