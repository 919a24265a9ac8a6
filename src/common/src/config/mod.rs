//! Sync configuration: raw properties, the key catalog, and resolution.
//!
//! Raw properties are gathered into a [`PropertyBag`] from, lowest to highest
//! precedence:
//!
//! 1. a TOML file (`partition-sync.toml` unless another path is given),
//! 2. environment variables prefixed with `PARTITION_SYNC__`, where `__`
//!    separates key segments (`PARTITION_SYNC__SYNC__TABLE` is `sync.table`)
//!    and values are kept verbatim,
//! 3. explicit command line flags, merged by the caller.
//!
//! The bag is then resolved against the [`ConfigCatalog`] into a
//! [`SyncConfig`].

pub mod catalog;
pub mod keys;
pub mod resolver;
pub mod selector;
mod sync_config;
pub mod value;

pub use catalog::{ConfigCatalog, ConfigProperty};
pub use resolver::{ConfigResolver, InferenceContext, ResolvedValue, ValueSource};
pub use sync_config::SyncConfig;

use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

/// Configuration file read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "partition-sync.toml";

/// Prefix of environment variables holding properties.
pub const ENV_PREFIX: &str = "PARTITION_SYNC__";

/// Flat string-to-string property map, as supplied from outside.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyBag(BTreeMap<String, String>);

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overlay `other` on top of `self`; keys present in both take `other`'s value.
    pub fn merge(&mut self, other: PropertyBag) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Load properties from the default file and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut properties =
            Self::from_figment(Figment::new().merge(Toml::file(DEFAULT_CONFIG_FILE)))?;
        properties.merge(Self::from_env());
        Ok(properties)
    }

    /// Load properties from `path` and the environment. The file must exist.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut properties = Self::from_figment(Figment::new().merge(Toml::file(path)))?;
        properties.merge(Self::from_env());
        Ok(properties)
    }

    /// Properties from `PARTITION_SYNC__` environment variables.
    ///
    /// Values are taken verbatim; `007` stays `007`.
    pub fn from_env() -> Self {
        Env::prefixed(ENV_PREFIX)
            .split("__")
            .iter()
            .map(|(key, value)| (key.as_str().to_ascii_lowercase(), value))
            .filter(|(key, _)| !key.is_empty())
            .collect()
    }

    /// Flatten whatever `figment` holds into dotted keys.
    ///
    /// Nested tables become `outer.inner`, arrays are comma-joined and
    /// scalars are rendered as strings.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let value: Value = figment.extract().map_err(Arc::new)?;
        let mut properties = BTreeMap::new();
        flatten("", &value, &mut properties);
        log::debug!("Loaded {} configuration properties", properties.len());
        Ok(Self(properties))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PropertyBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, nested, out);
            }
        }
        Value::Array(items) => {
            let joined = items.iter().map(scalar).collect::<Vec<_>>().join(",");
            out.insert(prefix.to_string(), joined);
        }
        Value::Null => {}
        other => {
            out.insert(prefix.to_string(), scalar(other));
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_property_bag_basics() {
        let mut bag = PropertyBag::new().with("a", "1");
        bag.insert("b", "2");
        assert_eq!(bag.get("a"), Some("1"));
        assert!(bag.contains("b"));
        assert!(!bag.contains("c"));
        assert_eq!(bag.len(), 2);

        let keys: Vec<_> = bag.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_merge_prefers_overlay() {
        let mut base: PropertyBag = [("sync.table", "from_file"), ("sync.database", "db")]
            .into_iter()
            .collect();
        base.merge(PropertyBag::new().with("sync.table", "from_flag"));
        assert_eq!(base.get("sync.table"), Some("from_flag"));
        assert_eq!(base.get("sync.database"), Some("db"));
    }

    #[test]
    fn test_configless_load_is_empty() {
        Jail::expect_with(|_jail| {
            let bag = PropertyBag::load().unwrap();
            assert!(bag.is_empty());
            Ok(())
        });
    }

    #[test]
    fn test_load_toml_flattens_tables() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [sync]
                enabled = true
                database = "analytics"
                base_path = "s3://bucket/trips"
                partition_fields = ["region", "day"]

                [table.write]
                name = "trips"

                [keygen]
                hive_style_partitioning = false
                "#,
            )?;

            let bag = PropertyBag::load().unwrap();
            assert_eq!(bag.get(keys::SYNC_ENABLED), Some("true"));
            assert_eq!(bag.get(keys::SYNC_DATABASE), Some("analytics"));
            assert_eq!(bag.get(keys::SYNC_BASE_PATH), Some("s3://bucket/trips"));
            assert_eq!(bag.get(keys::SYNC_PARTITION_FIELDS), Some("region,day"));
            assert_eq!(bag.get(keys::table::WRITE_TABLE_NAME), Some("trips"));
            assert_eq!(
                bag.get(keys::table::HIVE_STYLE_PARTITIONING),
                Some("false")
            );
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [sync]
                table = "from_file"
                database = "analytics"
                "#,
            )?;
            jail.set_env("PARTITION_SYNC__SYNC__TABLE", "from_env");
            jail.set_env("PARTITION_SYNC__SYNC__BASE_FILE_FORMAT", "ORC");

            let bag = PropertyBag::load().unwrap();
            assert_eq!(bag.get(keys::SYNC_TABLE), Some("from_env"));
            assert_eq!(bag.get(keys::SYNC_DATABASE), Some("analytics"));
            assert_eq!(bag.get(keys::SYNC_BASE_FILE_FORMAT), Some("ORC"));
            Ok(())
        });
    }

    #[test]
    fn test_env_values_kept_verbatim() {
        Jail::expect_with(|jail| {
            jail.set_env("PARTITION_SYNC__SYNC__TABLE", "007");
            jail.set_env("PARTITION_SYNC__SYNC__DATABASE", "1.10");
            jail.set_env("PARTITION_SYNC__KEYGEN__HIVE_STYLE_PARTITIONING", "TRUE");

            let bag = PropertyBag::load().unwrap();
            assert_eq!(bag.get(keys::SYNC_TABLE), Some("007"));
            assert_eq!(bag.get(keys::SYNC_DATABASE), Some("1.10"));
            assert_eq!(
                bag.get(keys::table::HIVE_STYLE_PARTITIONING),
                Some("TRUE")
            );
            Ok(())
        });
    }

    #[test]
    fn test_load_from_path() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                r#"
                [sync]
                base_path = "/warehouse/custom"
                "#,
            )?;

            let bag = PropertyBag::load_from_path("custom.toml").unwrap();
            assert_eq!(bag.get(keys::SYNC_BASE_PATH), Some("/warehouse/custom"));
            Ok(())
        });
    }

    #[test]
    fn test_load_from_missing_path() {
        Jail::expect_with(|_jail| {
            let err = PropertyBag::load_from_path("missing.toml").unwrap_err();
            assert!(matches!(err, ConfigError::FileNotFound { .. }));
            Ok(())
        });
    }

    #[test]
    fn test_load_invalid_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(DEFAULT_CONFIG_FILE, "[sync\nbroken")?;
            let err = PropertyBag::load().unwrap_err();
            assert!(matches!(err, ConfigError::Load(_)));
            Ok(())
        });
    }

    #[test]
    fn test_loaded_bag_resolves() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                [sync]
                base_path = "/warehouse/events"

                [keygen]
                partition_path_field = "event_date"
                hive_style_partitioning = true
                "#,
            )?;

            let config = SyncConfig::from_properties(PropertyBag::load().unwrap()).unwrap();
            assert_eq!(config.partition_fields, vec!["event_date"]);
            assert_eq!(
                config.extract("event_date=2024-03-01").unwrap(),
                vec!["2024-03-01"]
            );
            Ok(())
        });
    }
}
