use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Prefix shared by all fully-qualified extractor identifiers.
const IDENTIFIER_PREFIX: &str = "extractor::";

/// The closed set of partition value extraction strategies.
///
/// Adding a strategy means extending this enum, [`crate::PartitionValueExtractor`]
/// and the extractor selection rule together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExtractorKind {
    /// Table without partition fields.
    NonPartitioned,
    /// `yyyy/mm/dd` directories collapsed into a single `yyyy-mm-dd` value.
    SlashEncodedDayPartition,
    /// Hive-style `key=value` directories.
    HiveStylePartition,
    /// Plain value directories, one per partition field.
    MultiPartKeys,
}

impl ExtractorKind {
    pub const ALL: [ExtractorKind; 4] = [
        ExtractorKind::NonPartitioned,
        ExtractorKind::SlashEncodedDayPartition,
        ExtractorKind::HiveStylePartition,
        ExtractorKind::MultiPartKeys,
    ];

    /// Short strategy name, e.g. `HiveStylePartition`.
    pub fn name(&self) -> &'static str {
        match self {
            ExtractorKind::NonPartitioned => "NonPartitioned",
            ExtractorKind::SlashEncodedDayPartition => "SlashEncodedDayPartition",
            ExtractorKind::HiveStylePartition => "HiveStylePartition",
            ExtractorKind::MultiPartKeys => "MultiPartKeys",
        }
    }

    /// Fully-qualified identifier stored in configuration, e.g.
    /// `extractor::HiveStylePartition`.
    pub fn identifier(&self) -> &'static str {
        match self {
            ExtractorKind::NonPartitioned => "extractor::NonPartitioned",
            ExtractorKind::SlashEncodedDayPartition => "extractor::SlashEncodedDayPartition",
            ExtractorKind::HiveStylePartition => "extractor::HiveStylePartition",
            ExtractorKind::MultiPartKeys => "extractor::MultiPartKeys",
        }
    }
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when an identifier names no known strategy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown partition value extractor '{0}'")]
pub struct UnknownExtractor(pub String);

impl FromStr for ExtractorKind {
    type Err = UnknownExtractor;

    /// Accepts the fully-qualified identifier or the bare strategy name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let name = trimmed.strip_prefix(IDENTIFIER_PREFIX).unwrap_or(trimmed);
        ExtractorKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| UnknownExtractor(s.to_string()))
    }
}
