//! Entry number formatting.
//!
//! Entry numbers are the stable external reference printed on documents:
//! a source-type prefix plus a zero-padded, per-prefix sequential counter.
//! Allocation (locking, increment) lives in the database layer; this module
//! owns only the pure mapping and formatting.

use super::types::SourceType;

/// Returns the entry number prefix for a source type.
#[must_use]
pub fn entry_prefix(source_type: SourceType) -> &'static str {
    match source_type {
        SourceType::Manual => "JE",
        SourceType::Sale => "SAL",
        SourceType::Purchase => "PUR",
        SourceType::Payment => "PAY",
        SourceType::Closing => "CLS",
        SourceType::Reversal => "REV",
    }
}

/// Formats an entry number: `JE-00001`.
#[must_use]
pub fn format_entry_number(prefix: &str, number: i64) -> String {
    format!("{prefix}-{number:05}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pads_to_five_digits() {
        assert_eq!(format_entry_number("JE", 1), "JE-00001");
        assert_eq!(format_entry_number("SAL", 42), "SAL-00042");
        assert_eq!(format_entry_number("PAY", 99999), "PAY-99999");
    }

    #[test]
    fn test_format_grows_past_padding() {
        assert_eq!(format_entry_number("JE", 123456), "JE-123456");
    }

    #[test]
    fn test_prefix_per_source_type() {
        assert_eq!(entry_prefix(SourceType::Manual), "JE");
        assert_eq!(entry_prefix(SourceType::Sale), "SAL");
        assert_eq!(entry_prefix(SourceType::Purchase), "PUR");
        assert_eq!(entry_prefix(SourceType::Payment), "PAY");
        assert_eq!(entry_prefix(SourceType::Closing), "CLS");
        assert_eq!(entry_prefix(SourceType::Reversal), "REV");
    }
}
