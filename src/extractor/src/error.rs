use crate::ExtractorKind;
use thiserror::Error;

/// A partition path that does not match the layout the selected strategy
/// expects.
///
/// Every variant carries the offending path and the strategy that rejected it.
/// Whether the path is skipped or the whole sync aborted is up to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{strategy}: expected {expected} path segments in '{path}', found {actual}")]
    SegmentCount {
        strategy: ExtractorKind,
        path: String,
        expected: usize,
        actual: usize,
    },

    #[error("{strategy}: segment '{segment}' of '{path}' is not in key=value form")]
    MissingSeparator {
        strategy: ExtractorKind,
        path: String,
        segment: String,
    },

    #[error("{strategy}: '{path}' is not a valid yyyy/mm/dd date: {reason}")]
    InvalidDate {
        strategy: ExtractorKind,
        path: String,
        reason: String,
    },

    #[error("{strategy}: segment '{segment}' of '{path}' does not decode to valid UTF-8")]
    InvalidEncoding {
        strategy: ExtractorKind,
        path: String,
        segment: String,
    },
}

impl ParseError {
    /// The partition path that failed to parse.
    pub fn path(&self) -> &str {
        match self {
            ParseError::SegmentCount { path, .. }
            | ParseError::MissingSeparator { path, .. }
            | ParseError::InvalidDate { path, .. }
            | ParseError::InvalidEncoding { path, .. } => path,
        }
    }

    /// The strategy that rejected the path.
    pub fn strategy(&self) -> ExtractorKind {
        match self {
            ParseError::SegmentCount { strategy, .. }
            | ParseError::MissingSeparator { strategy, .. }
            | ParseError::InvalidDate { strategy, .. }
            | ParseError::InvalidEncoding { strategy, .. } => *strategy,
        }
    }
}
