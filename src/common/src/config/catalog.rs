//! Registry of recognized configuration keys.
//!
//! Each [`ConfigProperty`] names a key, an optional default and an optional
//! inference rule. Inference rules are plain function values that receive an
//! explicit [`InferenceContext`]; they never reach for global state.

use crate::config::keys::{self, table};
use crate::config::resolver::InferenceContext;
use crate::config::selector;
use crate::error::ConfigError;
use extractor::ExtractorKind;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Inference function: derives a value from the rest of the configuration,
/// or returns `None` to fall through to the default.
pub type InferFn =
    Arc<dyn Fn(&InferenceContext<'_>) -> Result<Option<String>, ConfigError> + Send + Sync>;

/// An inference rule together with the keys it reads.
#[derive(Clone)]
pub struct Inference {
    reads: Vec<&'static str>,
    func: InferFn,
}

impl Inference {
    /// Keys the rule reads, raw or resolved.
    pub fn reads(&self) -> &[&'static str] {
        &self.reads
    }

    pub(crate) fn infer(&self, ctx: &InferenceContext<'_>) -> Result<Option<String>, ConfigError> {
        (self.func)(ctx)
    }
}

impl fmt::Debug for Inference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inference")
            .field("reads", &self.reads)
            .finish_non_exhaustive()
    }
}

/// A recognized configuration key.
#[derive(Clone, Debug)]
pub struct ConfigProperty {
    key: &'static str,
    default_value: Option<&'static str>,
    documentation: &'static str,
    inference: Option<Inference>,
}

impl ConfigProperty {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            default_value: None,
            documentation: "",
            inference: None,
        }
    }

    pub fn default_value(mut self, value: &'static str) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_documentation(mut self, documentation: &'static str) -> Self {
        self.documentation = documentation;
        self
    }

    /// Attach an inference rule. `reads` must list every key the rule looks
    /// at so that cycles can be rejected before anything is resolved.
    pub fn with_infer_function<F>(mut self, reads: &[&'static str], func: F) -> Self
    where
        F: Fn(&InferenceContext<'_>) -> Result<Option<String>, ConfigError>
            + Send
            + Sync
            + 'static,
    {
        self.inference = Some(Inference {
            reads: reads.to_vec(),
            func: Arc::new(func),
        });
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn default(&self) -> Option<&'static str> {
        self.default_value
    }

    pub fn documentation(&self) -> &'static str {
        self.documentation
    }

    pub fn inference(&self) -> Option<&Inference> {
        self.inference.as_ref()
    }
}

static SYNC_CATALOG: Lazy<ConfigCatalog> = Lazy::new(|| ConfigCatalog {
    properties: sync_properties(),
});

/// Immutable set of [`ConfigProperty`] entries, in registration order.
#[derive(Clone, Debug)]
pub struct ConfigCatalog {
    properties: Vec<ConfigProperty>,
}

impl ConfigCatalog {
    /// Build a catalog, rejecting duplicate keys.
    pub fn new(properties: Vec<ConfigProperty>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for property in &properties {
            if !seen.insert(property.key) {
                return Err(ConfigError::DuplicateKey {
                    key: property.key.to_string(),
                });
            }
        }
        Ok(Self { properties })
    }

    /// The catalog of partition sync settings.
    pub fn sync() -> &'static ConfigCatalog {
        &SYNC_CATALOG
    }

    pub fn get(&self, key: &str) -> Option<&ConfigProperty> {
        self.properties.iter().find(|p| p.key == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigProperty> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Reject catalogs whose declared inference dependencies form a cycle.
    ///
    /// Keys outside the catalog are raw inputs and end a dependency chain.
    pub fn check_acyclic(&self) -> Result<(), ConfigError> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            catalog: &ConfigCatalog,
            key: &'static str,
            marks: &mut HashMap<&'static str, Mark>,
            path: &mut Vec<&'static str>,
        ) -> Result<(), ConfigError> {
            match marks.get(key) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|k| *k == key).unwrap_or(0);
                    let mut chain: Vec<String> =
                        path[start..].iter().map(|k| k.to_string()).collect();
                    chain.push(key.to_string());
                    return Err(ConfigError::InferenceCycle {
                        key: key.to_string(),
                        chain,
                    });
                }
                None => {}
            }

            marks.insert(key, Mark::Visiting);
            path.push(key);
            if let Some(inference) = catalog.get(key).and_then(ConfigProperty::inference) {
                for dependency in inference.reads() {
                    if let Some(property) = catalog.get(dependency) {
                        visit(catalog, property.key, marks, path)?;
                    }
                }
            }
            path.pop();
            marks.insert(key, Mark::Done);
            Ok(())
        }

        let mut marks = HashMap::new();
        let mut path = Vec::new();
        for property in &self.properties {
            visit(self, property.key, &mut marks, &mut path)?;
        }
        Ok(())
    }
}

fn sync_properties() -> Vec<ConfigProperty> {
    vec![
        ConfigProperty::new(keys::SYNC_ENABLED)
            .default_value("false")
            .with_documentation("Enable syncing the table with an external catalog."),
        ConfigProperty::new(keys::SYNC_DATABASE)
            .default_value("default")
            .with_documentation("Name of the destination database."),
        // Fall back to the names the table was written with
        ConfigProperty::new(keys::SYNC_TABLE)
            .default_value("unknown")
            .with_infer_function(
                &[table::WRITE_TABLE_NAME, table::TABLE_NAME],
                |cfg| {
                    Ok(cfg
                        .raw(table::WRITE_TABLE_NAME)
                        .or_else(|| cfg.raw(table::TABLE_NAME))
                        .map(str::to_string))
                },
            )
            .with_documentation("Name of the destination table."),
        ConfigProperty::new(keys::SYNC_BASE_PATH)
            .with_documentation("Base path of the table to sync."),
        ConfigProperty::new(keys::SYNC_BASE_FILE_FORMAT)
            .default_value("PARQUET")
            .with_documentation("Format of the table's base files."),
        ConfigProperty::new(keys::SYNC_PARTITION_FIELDS)
            .default_value("")
            .with_infer_function(&[table::PARTITION_PATH_FIELD], |cfg| {
                Ok(cfg.raw(table::PARTITION_PATH_FIELD).map(str::to_string))
            })
            .with_documentation("Comma separated partition fields, in partition order."),
        ConfigProperty::new(keys::SYNC_PARTITION_EXTRACTOR_CLASS)
            .default_value(ExtractorKind::SlashEncodedDayPartition.identifier())
            .with_infer_function(
                &[keys::SYNC_PARTITION_FIELDS, table::HIVE_STYLE_PARTITIONING],
                selector::infer_extractor,
            )
            .with_documentation(
                "Strategy extracting partition values from partition paths, \
                 default 'extractor::SlashEncodedDayPartition'.",
            ),
        ConfigProperty::new(keys::SYNC_ASSUME_DATE_PARTITIONING)
            .default_value("false")
            .with_documentation("Assume partitioning is yyyy/mm/dd."),
        ConfigProperty::new(keys::SYNC_DECODE_PARTITION_VALUES)
            .default_value("false")
            .with_infer_function(&[table::URL_ENCODE_PARTITIONING], |cfg| {
                Ok(cfg.raw(table::URL_ENCODE_PARTITIONING).map(str::to_string))
            })
            .with_documentation("URL-decode partition values that were encoded when written."),
    ]
}
