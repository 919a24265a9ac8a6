//! Parsing of raw string values into typed settings.

use crate::error::ConfigError;

/// Separator of list-valued settings such as partition fields.
pub const LIST_DELIMITER: char = ',';

/// Parse a boolean setting. Accepts `true` and `false` in any case.
pub fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim() {
        v if v.eq_ignore_ascii_case("true") => Ok(true),
        v if v.eq_ignore_ascii_case("false") => Ok(false),
        _ => Err(ConfigError::invalid_value(
            key,
            value,
            "expected 'true' or 'false'",
        )),
    }
}

/// Parse a comma separated list, trimming entries and dropping empty ones.
///
/// An empty string is an empty list.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
