//! Helpers for splitting and decoding partition paths.

use crate::{ExtractorKind, ParseError};
use percent_encoding::percent_decode_str;

/// Separator between directory levels of a partition path.
pub const SEGMENT_DELIMITER: char = '/';

/// Separator between key and value in a hive-style segment.
pub const KEY_VALUE_DELIMITER: char = '=';

/// Split a partition path into its directory segments.
///
/// Only the empty path has no segments. Every delimiter separates two
/// segments, so `"/a"` is `["", "a"]` and empty values survive a join.
pub fn segments(path: &str) -> Vec<&str> {
    if path.is_empty() {
        return Vec::new();
    }
    path.split(SEGMENT_DELIMITER).collect()
}

/// Reverse the URL encoding applied to a partition value at write time.
pub(crate) fn decode_segment(
    strategy: ExtractorKind,
    path: &str,
    segment: &str,
) -> Result<String, ParseError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| ParseError::InvalidEncoding {
            strategy,
            path: path.to_string(),
            segment: segment.to_string(),
        })
}
