//! Batch extraction of partition values for a sync job.
//!
//! The file-system side supplies the candidate partition paths; this module
//! turns them into ordered value tuples for the catalog side. What happens to
//! a path the configured strategy cannot parse is decided by a
//! [`MalformedPathPolicy`].

use crate::config::SyncConfig;
use extractor::ParseError;
use serde::{Deserialize, Serialize};

/// What to do with a partition path the extractor rejects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPathPolicy {
    /// Stop at the first malformed path.
    #[default]
    Abort,
    /// Log the malformed path and continue with the rest.
    Skip,
}

/// Values extracted from one partition path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionValues {
    pub path: String,
    /// One value per partition field, in partition-field order.
    pub values: Vec<String>,
}

/// Result of extracting a batch of partition paths.
#[derive(Debug, Default)]
pub struct ExtractionReport {
    /// Extracted partitions, in input order.
    pub partitions: Vec<PartitionValues>,
    /// Paths skipped under [`MalformedPathPolicy::Skip`].
    pub skipped: Vec<ParseError>,
}

/// Extract the partition values of every path in `paths`.
///
/// Under [`MalformedPathPolicy::Abort`] the first [`ParseError`] is returned
/// and nothing else; no partial batch is handed out.
pub fn extract_partitions<I, S>(
    config: &SyncConfig,
    paths: I,
    policy: MalformedPathPolicy,
) -> Result<ExtractionReport, ParseError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = ExtractionReport::default();

    for path in paths {
        let path = path.as_ref();
        match config.extract(path) {
            Ok(values) => report.partitions.push(PartitionValues {
                path: path.to_string(),
                values,
            }),
            Err(e) => match policy {
                MalformedPathPolicy::Abort => {
                    log::error!("Aborting partition extraction: {e}");
                    return Err(e);
                }
                MalformedPathPolicy::Skip => {
                    log::warn!("Skipping partition: {e}");
                    report.skipped.push(e);
                }
            },
        }
    }

    log::info!(
        "Extracted {} partition(s) for {}.{}, skipped {}",
        report.partitions.len(),
        config.database,
        config.table,
        report.skipped.len()
    );
    Ok(report)
}
