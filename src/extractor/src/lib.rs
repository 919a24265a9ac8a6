//! Partition value extraction.
//!
//! A table's partitions live in directories under its base path. How those
//! directories encode the partition-column values depends on how the table
//! was written:
//!
//! ```text
//! 2020/01/02              SlashEncodedDayPartition  -> ["2020-01-02"]
//! year=2020/month=01      HiveStylePartition        -> ["2020", "01"]
//! us/ca                   MultiPartKeys             -> ["us", "ca"]
//! (anything)              NonPartitioned            -> []
//! ```
//!
//! [`PartitionValueExtractor`] is a plain value, so it can be cloned, shared
//! between threads, or serialized and shipped to remote workers.

mod error;
mod kind;
pub mod path;

pub use error::ParseError;
pub use kind::{ExtractorKind, UnknownExtractor};

use chrono::NaiveDate;
use path::{KEY_VALUE_DELIMITER, decode_segment, segments};
use serde::{Deserialize, Serialize};

/// Strategy converting one partition path into the ordered values of the
/// table's partition fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PartitionValueExtractor {
    NonPartitioned,
    #[default]
    SlashEncodedDayPartition,
    HiveStylePartition {
        /// URL-decode each value.
        decode: bool,
    },
    MultiPartKeys {
        /// Number of declared partition fields, i.e. expected segment count.
        field_count: usize,
        /// URL-decode each value.
        decode: bool,
    },
}

impl PartitionValueExtractor {
    /// Build the extractor for `kind`.
    ///
    /// `field_count` is only used by [`ExtractorKind::MultiPartKeys`] and
    /// `decode` only by the strategies that read raw values.
    pub fn new(kind: ExtractorKind, field_count: usize, decode: bool) -> Self {
        match kind {
            ExtractorKind::NonPartitioned => PartitionValueExtractor::NonPartitioned,
            ExtractorKind::SlashEncodedDayPartition => {
                PartitionValueExtractor::SlashEncodedDayPartition
            }
            ExtractorKind::HiveStylePartition => {
                PartitionValueExtractor::HiveStylePartition { decode }
            }
            ExtractorKind::MultiPartKeys => PartitionValueExtractor::MultiPartKeys {
                field_count,
                decode,
            },
        }
    }

    pub fn kind(&self) -> ExtractorKind {
        match self {
            PartitionValueExtractor::NonPartitioned => ExtractorKind::NonPartitioned,
            PartitionValueExtractor::SlashEncodedDayPartition => {
                ExtractorKind::SlashEncodedDayPartition
            }
            PartitionValueExtractor::HiveStylePartition { .. } => {
                ExtractorKind::HiveStylePartition
            }
            PartitionValueExtractor::MultiPartKeys { .. } => ExtractorKind::MultiPartKeys,
        }
    }

    /// Extract the partition values encoded in `path`.
    ///
    /// Values are returned in partition-field order. The call is pure: it
    /// never touches storage and never returns a partial result.
    pub fn extract(&self, path: &str) -> Result<Vec<String>, ParseError> {
        log::trace!("Extracting partition values from '{path}' with {}", self.kind());

        match self {
            PartitionValueExtractor::NonPartitioned => Ok(Vec::new()),
            PartitionValueExtractor::SlashEncodedDayPartition => extract_day(path),
            PartitionValueExtractor::HiveStylePartition { decode } => {
                extract_hive_style(path, *decode)
            }
            PartitionValueExtractor::MultiPartKeys {
                field_count,
                decode,
            } => extract_multi_part(path, *field_count, *decode),
        }
    }
}

fn extract_day(path: &str) -> Result<Vec<String>, ParseError> {
    const STRATEGY: ExtractorKind = ExtractorKind::SlashEncodedDayPartition;

    let parts = segments(path);
    if parts.len() != 3 {
        return Err(ParseError::SegmentCount {
            strategy: STRATEGY,
            path: path.to_string(),
            expected: 3,
            actual: parts.len(),
        });
    }

    let invalid = |reason: String| ParseError::InvalidDate {
        strategy: STRATEGY,
        path: path.to_string(),
        reason,
    };
    let number = |segment: &str, component: &str| -> Result<u32, ParseError> {
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid(format!("{component} '{segment}' is not numeric")));
        }
        segment
            .parse::<u32>()
            .map_err(|e| invalid(format!("{component} '{segment}': {e}")))
    };

    let year = number(parts[0], "year")?;
    let month = number(parts[1], "month")?;
    let day = number(parts[2], "day")?;

    let year = i32::try_from(year).map_err(|e| invalid(format!("year {year}: {e}")))?;
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| invalid(format!("{year}-{month}-{day} is not a calendar date")))?;

    Ok(vec![date.format("%Y-%m-%d").to_string()])
}

fn extract_hive_style(path: &str, decode: bool) -> Result<Vec<String>, ParseError> {
    const STRATEGY: ExtractorKind = ExtractorKind::HiveStylePartition;

    segments(path)
        .into_iter()
        .map(|segment| {
            let (_key, value) = segment.split_once(KEY_VALUE_DELIMITER).ok_or_else(|| {
                ParseError::MissingSeparator {
                    strategy: STRATEGY,
                    path: path.to_string(),
                    segment: segment.to_string(),
                }
            })?;
            if decode {
                decode_segment(STRATEGY, path, value)
            } else {
                Ok(value.to_string())
            }
        })
        .collect()
}

fn extract_multi_part(
    path: &str,
    field_count: usize,
    decode: bool,
) -> Result<Vec<String>, ParseError> {
    const STRATEGY: ExtractorKind = ExtractorKind::MultiPartKeys;

    let parts = segments(path);
    if parts.len() != field_count {
        return Err(ParseError::SegmentCount {
            strategy: STRATEGY,
            path: path.to_string(),
            expected: field_count,
            actual: parts.len(),
        });
    }

    parts
        .into_iter()
        .map(|segment| {
            if decode {
                decode_segment(STRATEGY, path, segment)
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}
