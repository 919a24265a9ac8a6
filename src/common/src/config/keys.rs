//! Configuration key names.

/// Enable syncing the table to an external catalog.
pub const SYNC_ENABLED: &str = "sync.enabled";
/// Destination database.
pub const SYNC_DATABASE: &str = "sync.database";
/// Destination table.
pub const SYNC_TABLE: &str = "sync.table";
/// Base path of the table being synced.
pub const SYNC_BASE_PATH: &str = "sync.base_path";
/// Format of the table's base files.
pub const SYNC_BASE_FILE_FORMAT: &str = "sync.base_file_format";
/// Comma separated partition fields, in partition order.
pub const SYNC_PARTITION_FIELDS: &str = "sync.partition_fields";
/// Identifier of the partition value extractor.
pub const SYNC_PARTITION_EXTRACTOR_CLASS: &str = "sync.partition_extractor_class";
/// Assume `yyyy/mm/dd` partitioning.
pub const SYNC_ASSUME_DATE_PARTITIONING: &str = "sync.assume_date_partitioning";
/// URL-decode partition values.
pub const SYNC_DECODE_PARTITION_VALUES: &str = "sync.decode_partition_values";

/// Keys from the table's persisted write configuration.
///
/// These are never resolved themselves; inference rules read them raw.
pub mod table {
    /// Table name used by the writer.
    pub const WRITE_TABLE_NAME: &str = "table.write.name";
    /// Table name stored in the table properties.
    pub const TABLE_NAME: &str = "table.name";
    /// Comma separated fields the key generator builds partition paths from.
    pub const PARTITION_PATH_FIELD: &str = "keygen.partition_path_field";
    /// Whether partition directories are written as `field=value`.
    pub const HIVE_STYLE_PARTITIONING: &str = "keygen.hive_style_partitioning";
    /// Whether partition values were URL-encoded when written.
    pub const URL_ENCODE_PARTITIONING: &str = "keygen.url_encode_partitioning";
}
