//! Normalization of raw query-string values into typed, bounded values

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEADING_INTEGER: Regex = Regex::new(r"^\s*([+-]?\d+)").unwrap();
}

/// Turns untrusted request values into the typed values the search core works with.
///
/// The loader only ever sees values that have passed through an implementation of
/// this trait, so a project can tighten or loosen input handling in one place.
pub trait Sanitizer: Send + Sync {
    /// Trimmed text, empty when absent.
    fn string(&self, value: Option<&str>) -> String;

    /// Truthy/falsy flag; `default` when the value is absent or blank.
    fn boolean(&self, value: Option<&str>, default: bool) -> bool;

    /// Leading integer of the value clamped to `min..=max`; `default` when absent or non-numeric.
    fn integer(&self, value: Option<&str>, default: i64, min: i64, max: Option<i64>) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardSanitizer;

impl Sanitizer for StandardSanitizer {
    fn string(&self, value: Option<&str>) -> String {
        value.map(|v| v.trim().to_string()).unwrap_or_default()
    }

    fn boolean(&self, value: Option<&str>, default: bool) -> bool {
        let Some(raw) = value else {
            return default;
        };

        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return default;
        }

        if normalized == "on" {
            return true;
        }

        matches!(normalized.chars().next(), Some('t') | Some('y') | Some('1'))
    }

    fn integer(&self, value: Option<&str>, default: i64, min: i64, max: Option<i64>) -> i64 {
        let parsed = value
            .and_then(|raw| LEADING_INTEGER.captures(raw))
            .and_then(|caps| caps.get(1))
            .map(|digits| {
                let digits = digits.as_str();
                // Overlong digit runs saturate instead of falling back to the default.
                digits.parse::<i64>().unwrap_or(if digits.starts_with('-') {
                    i64::MIN
                } else {
                    i64::MAX
                })
            });

        let mut result = parsed.unwrap_or(default);
        if result < min {
            result = min;
        }
        if let Some(max) = max {
            if result > max {
                result = max;
            }
        }
        result
    }
}
