//! Shared utilities for cell parsing and naming.
//!
//! This module contains helper functions used by the loader, the cleaner
//! and the visualizer.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Characters commonly used in numeric formatting that should be stripped.
pub const NUMERIC_FORMAT_CHARS: [char; 6] = [',', '$', '%', '€', '£', ' '];

/// Cell contents that mean "no value", compared case-insensitively.
pub const MISSING_MARKERS: [&str; 9] = [
    "", "na", "n/a", "nan", "null", "none", "#n/a", "<na>", "-nan",
];

/// Clean a string for numeric parsing by removing formatting characters.
///
/// `,` is always read as a thousands separator, so `"3,5"` becomes `"35"`.
/// Decimal commas from `;`-delimited files are rewritten by the loader
/// before they get here.
///
/// # Example
///
/// ```rust
/// use lex_report::utils::clean_numeric_string;
///
/// assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
/// assert_eq!(clean_numeric_string("  42%  "), "42");
/// ```
pub fn clean_numeric_string(s: &str) -> String {
    let mut result = s.trim().to_string();
    for c in NUMERIC_FORMAT_CHARS {
        result = result.replace(c, "");
    }
    result
}

/// Check if a cell is a missing value marker.
pub fn is_missing_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    MISSING_MARKERS.iter().any(|&marker| lower == marker)
}

/// Try to parse a string as a numeric value (f64).
///
/// Handles common formatting like currency symbols, percentages, and thousands separators.
/// Non-finite results ("inf", "nan") are rejected.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let cleaned = clean_numeric_string(s);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Boolean Detection Utilities
// =============================================================================

/// Common boolean true representations.
pub const BOOLEAN_TRUE_VALUES: [&str; 6] = ["true", "yes", "1", "t", "y", "on"];

/// Common boolean false representations.
pub const BOOLEAN_FALSE_VALUES: [&str; 6] = ["false", "no", "0", "f", "n", "off"];

/// Parse a boolean-like string.
pub fn parse_boolean_string(s: &str) -> Option<bool> {
    let lower = s.trim().to_ascii_lowercase();
    if BOOLEAN_TRUE_VALUES.iter().any(|&v| v == lower) {
        Some(true)
    } else if BOOLEAN_FALSE_VALUES.iter().any(|&v| v == lower) {
        Some(false)
    } else {
        None
    }
}

// =============================================================================
// Naming Utilities
// =============================================================================

/// Turn a column name into a file-name-safe slug.
///
/// Alphanumerics are kept (lowercased), everything else collapses into `_`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_sep = false;
    for c in name.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep && !slug.is_empty() {
            slug.push('_');
            last_was_sep = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("column");
    }
    slug
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_clean_numeric_string() {
        assert_eq!(clean_numeric_string("$1,234.56"), "1234.56");
        assert_eq!(clean_numeric_string("  42%  "), "42");
        assert_eq!(clean_numeric_string("€100"), "100");
        assert_eq!(clean_numeric_string("1 000"), "1000");
    }

    #[test]
    fn test_is_missing_marker() {
        assert!(is_missing_marker(""));
        assert!(is_missing_marker("  "));
        assert!(is_missing_marker("N/A"));
        assert!(is_missing_marker("NaN"));
        assert!(is_missing_marker("null"));
        assert!(!is_missing_marker("0"));
        assert!(!is_missing_marker("unknown"));
    }

    #[test]
    fn test_parse_numeric_string() {
        assert_eq!(parse_numeric_string("42"), Some(42.0));
        assert_eq!(parse_numeric_string("$1,234.56"), Some(1234.56));
        assert_eq!(parse_numeric_string("-100"), Some(-100.0));
        assert_eq!(parse_numeric_string("85%"), Some(85.0));
        assert_eq!(parse_numeric_string(""), None);
        assert_eq!(parse_numeric_string("hello"), None);
        assert_eq!(parse_numeric_string("inf"), None);
    }

    #[test]
    fn test_parse_boolean_string() {
        assert_eq!(parse_boolean_string("true"), Some(true));
        assert_eq!(parse_boolean_string("FALSE"), Some(false));
        assert_eq!(parse_boolean_string(" Yes "), Some(true));
        assert_eq!(parse_boolean_string("0"), Some(false));
        assert_eq!(parse_boolean_string("maybe"), None);
        assert_eq!(parse_boolean_string("42"), None);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Completion %"), "completion");
        assert_eq!(slugify("Course Name"), "course_name");
        assert_eq!(slugify("  score--final "), "score_final");
        assert_eq!(slugify("%%"), "column");
    }
}
