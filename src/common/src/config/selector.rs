//! Choice of the partition value extractor when none is configured.

use crate::config::keys::{self, table};
use crate::config::resolver::{InferenceContext, ValueSource};
use crate::config::value::{parse_bool, parse_list};
use crate::error::ConfigError;
use extractor::ExtractorKind;

/// Pick the extraction strategy for a table with `field_count` partition
/// fields.
pub fn select_extractor(field_count: usize, hive_style_partitioning: bool) -> ExtractorKind {
    match field_count {
        0 => ExtractorKind::NonPartitioned,
        1 if hive_style_partitioning => ExtractorKind::HiveStylePartition,
        _ => ExtractorKind::MultiPartKeys,
    }
}

/// Inference rule for [`keys::SYNC_PARTITION_EXTRACTOR_CLASS`].
///
/// Yields nothing when the partition fields were neither supplied nor
/// inferable, leaving the day-partition default in place for tables that
/// predate explicit partition fields.
pub(crate) fn infer_extractor(cfg: &InferenceContext<'_>) -> Result<Option<String>, ConfigError> {
    let fields = cfg.resolve(keys::SYNC_PARTITION_FIELDS)?;
    if fields.source == ValueSource::Default {
        return Ok(None);
    }

    let field_count = fields.value.as_deref().map(parse_list).unwrap_or_default().len();
    let hive_style_partitioning = match cfg.raw(table::HIVE_STYLE_PARTITIONING) {
        Some(value) => parse_bool(table::HIVE_STYLE_PARTITIONING, value)?,
        None => false,
    };

    let kind = select_extractor(field_count, hive_style_partitioning);
    log::debug!(
        "Selected {kind} for {field_count} partition field(s), hive style partitioning: {hive_style_partitioning}"
    );
    Ok(Some(kind.identifier().to_string()))
}
