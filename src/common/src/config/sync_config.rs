use crate::config::PropertyBag;
use crate::config::keys;
use crate::config::resolver::ConfigResolver;
use crate::error::ConfigError;
use extractor::{ExtractorKind, ParseError, PartitionValueExtractor};
use serde::{Deserialize, Serialize};

/// Fully resolved settings for one sync job.
///
/// This is what the catalog-sync side consumes: where the table lives, where
/// it goes, and how to turn its partition paths into partition values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub enabled: bool,
    pub database: String,
    pub table: String,
    pub base_path: String,
    pub base_file_format: String,
    /// Partition fields in partition order.
    pub partition_fields: Vec<String>,
    pub partition_extractor: PartitionValueExtractor,
    pub assume_date_partitioning: bool,
    pub decode_partition_values: bool,
}

impl SyncConfig {
    /// Resolve `properties` against the sync catalog.
    pub fn from_properties(properties: PropertyBag) -> Result<Self, ConfigError> {
        let resolver = ConfigResolver::for_sync(properties)?;
        Self::from_resolver(&resolver)
    }

    pub fn from_resolver(resolver: &ConfigResolver) -> Result<Self, ConfigError> {
        let base_path = resolver.get_required(keys::SYNC_BASE_PATH)?.to_string();
        let partition_fields = resolver.get_list(keys::SYNC_PARTITION_FIELDS)?;
        let decode_partition_values = resolver.get_bool(keys::SYNC_DECODE_PARTITION_VALUES)?;

        let extractor_class = resolver.get_required(keys::SYNC_PARTITION_EXTRACTOR_CLASS)?;
        let kind: ExtractorKind =
            extractor_class
                .parse()
                .map_err(|_| ConfigError::UnknownExtractor {
                    key: keys::SYNC_PARTITION_EXTRACTOR_CLASS.to_string(),
                    value: extractor_class.to_string(),
                })?;
        let partition_extractor =
            PartitionValueExtractor::new(kind, partition_fields.len(), decode_partition_values);

        let config = Self {
            enabled: resolver.get_bool(keys::SYNC_ENABLED)?,
            database: resolver.get_required(keys::SYNC_DATABASE)?.to_string(),
            table: resolver.get_required(keys::SYNC_TABLE)?.to_string(),
            base_path,
            base_file_format: resolver.get_required(keys::SYNC_BASE_FILE_FORMAT)?.to_string(),
            partition_fields,
            partition_extractor,
            assume_date_partitioning: resolver.get_bool(keys::SYNC_ASSUME_DATE_PARTITIONING)?,
            decode_partition_values,
        };

        config.warn_on_field_mismatch();
        log::info!(
            "Resolved sync of {} into {}.{} using {}",
            config.base_path,
            config.database,
            config.table,
            kind
        );
        Ok(config)
    }

    /// Extract the partition values of one partition path.
    pub fn extract(&self, partition_path: &str) -> Result<Vec<String>, ParseError> {
        self.partition_extractor.extract(partition_path)
    }

    /// Number of values each extracted tuple is expected to hold, when the
    /// strategy fixes it.
    pub fn expected_value_count(&self) -> Option<usize> {
        match self.partition_extractor.kind() {
            ExtractorKind::NonPartitioned => Some(0),
            ExtractorKind::SlashEncodedDayPartition => Some(1),
            ExtractorKind::MultiPartKeys => Some(self.partition_fields.len()),
            ExtractorKind::HiveStylePartition => None,
        }
    }

    fn warn_on_field_mismatch(&self) {
        if let Some(expected) = self.expected_value_count()
            && !self.partition_fields.is_empty()
            && expected != self.partition_fields.len()
        {
            log::warn!(
                "{} yields {} value(s) per partition but {} partition field(s) are declared: {:?}",
                self.partition_extractor.kind(),
                expected,
                self.partition_fields.len(),
                self.partition_fields
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys::table;

    fn config(entries: &[(&str, &str)]) -> Result<SyncConfig, ConfigError> {
        SyncConfig::from_properties(entries.iter().copied().collect())
    }

    #[test]
    fn test_minimal_configuration() {
        let config = config(&[(keys::SYNC_BASE_PATH, "s3://bucket/table")]).unwrap();

        assert_eq!(
            config,
            SyncConfig {
                enabled: false,
                database: "default".to_string(),
                table: "unknown".to_string(),
                base_path: "s3://bucket/table".to_string(),
                base_file_format: "PARQUET".to_string(),
                partition_fields: vec![],
                partition_extractor: PartitionValueExtractor::SlashEncodedDayPartition,
                assume_date_partitioning: false,
                decode_partition_values: false,
            }
        );
        assert_eq!(config.extract("2020/01/02").unwrap(), vec!["2020-01-02"]);
    }

    #[test]
    fn test_base_path_is_required() {
        let err = config(&[(keys::SYNC_DATABASE, "analytics")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired { key } if key == keys::SYNC_BASE_PATH));
    }

    #[test]
    fn test_inferred_from_table_write_configuration() {
        let config = config(&[
            (keys::SYNC_BASE_PATH, "/warehouse/trips"),
            (table::WRITE_TABLE_NAME, "trips"),
            (table::PARTITION_PATH_FIELD, "city"),
            (table::HIVE_STYLE_PARTITIONING, "true"),
            (table::URL_ENCODE_PARTITIONING, "true"),
        ])
        .unwrap();

        assert_eq!(config.table, "trips");
        assert_eq!(config.partition_fields, vec!["city"]);
        assert!(config.decode_partition_values);
        assert_eq!(
            config.partition_extractor,
            PartitionValueExtractor::HiveStylePartition { decode: true }
        );
        assert_eq!(config.extract("city=New%20York").unwrap(), vec!["New York"]);
    }

    #[test]
    fn test_multi_part_extractor_gets_field_count() {
        let config = config(&[
            (keys::SYNC_BASE_PATH, "/warehouse/events"),
            (keys::SYNC_PARTITION_FIELDS, "region,country"),
        ])
        .unwrap();

        assert_eq!(
            config.partition_extractor,
            PartitionValueExtractor::MultiPartKeys {
                field_count: 2,
                decode: false
            }
        );
        assert_eq!(config.expected_value_count(), Some(2));
        assert_eq!(config.extract("eu/de").unwrap(), vec!["eu", "de"]);
        assert!(config.extract("eu").is_err());
    }

    #[test]
    fn test_non_partitioned_table() {
        let config = config(&[
            (keys::SYNC_BASE_PATH, "/warehouse/dim"),
            (keys::SYNC_PARTITION_FIELDS, ""),
        ])
        .unwrap();

        assert_eq!(
            config.partition_extractor,
            PartitionValueExtractor::NonPartitioned
        );
        assert!(config.partition_fields.is_empty());
        assert!(config.extract("").unwrap().is_empty());
    }

    #[test]
    fn test_explicit_extractor_accepts_short_name() {
        let config = config(&[
            (keys::SYNC_BASE_PATH, "/warehouse/logs"),
            (keys::SYNC_PARTITION_FIELDS, "datestr"),
            (keys::SYNC_PARTITION_EXTRACTOR_CLASS, "SlashEncodedDayPartition"),
        ])
        .unwrap();
        assert_eq!(
            config.partition_extractor,
            PartitionValueExtractor::SlashEncodedDayPartition
        );
        assert_eq!(config.expected_value_count(), Some(1));
    }

    #[test]
    fn test_unknown_extractor_is_configuration_error() {
        let err = config(&[
            (keys::SYNC_BASE_PATH, "/warehouse/logs"),
            (keys::SYNC_PARTITION_EXTRACTOR_CLASS, "com.example.CustomExtractor"),
        ])
        .unwrap_err();

        match err {
            ConfigError::UnknownExtractor { key, value } => {
                assert_eq!(key, keys::SYNC_PARTITION_EXTRACTOR_CLASS);
                assert_eq!(value, "com.example.CustomExtractor");
            }
            other => panic!("Expected UnknownExtractor, got {other:?}"),
        }
    }

    #[test]
    fn test_boolean_settings() {
        let enabled = config(&[
            (keys::SYNC_BASE_PATH, "/t"),
            (keys::SYNC_ENABLED, "TRUE"),
            (keys::SYNC_ASSUME_DATE_PARTITIONING, "true"),
        ])
        .unwrap();
        assert!(enabled.enabled);
        assert!(enabled.assume_date_partitioning);

        assert!(matches!(
            config(&[(keys::SYNC_BASE_PATH, "/t"), (keys::SYNC_ENABLED, "1")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_serializes_for_display() {
        let config = config(&[
            (keys::SYNC_BASE_PATH, "/t"),
            (keys::SYNC_PARTITION_FIELDS, "a,b"),
        ])
        .unwrap();
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["partition_fields"], serde_json::json!(["a", "b"]));
        assert_eq!(
            json["partition_extractor"]["strategy"],
            serde_json::json!("multi_part_keys")
        );
    }
}
