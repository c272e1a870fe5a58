//! Field-level input checks shared by the write paths.

use crate::errors::{Error, Result};

/// Checks that `value` has between `min` and `max` characters.
pub fn length_between(field: &'static str, value: &str, min: usize, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len < min {
        return Err(if min == 1 {
            Error::validation(field, "is required")
        } else {
            Error::validation(field, format!("must be at least {min} characters"))
        });
    }
    if len > max {
        return Err(Error::validation(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Checks an optional field against a maximum length.
pub fn optional_max_length(field: &'static str, value: Option<&str>, max: usize) -> Result<()> {
    value.map_or(Ok(()), |v| length_between(field, v, 0, max))
}

/// Checks for a `#RRGGBB` color.
pub fn hex_color(field: &'static str, value: &str) -> Result<()> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(Error::validation(field, "must look like #RRGGBB"))
    }
}

/// Trims surrounding whitespace and maps blank strings to `None`.
#[must_use]
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_between() {
        assert!(length_between("name", "abc", 3, 5).is_ok());
        assert!(length_between("name", "ab", 3, 5).is_err());
        assert!(length_between("name", "abcdef", 3, 5).is_err());
        assert!(matches!(
            length_between("title", "", 1, 200),
            Err(Error::Validation { field: "title", .. })
        ));
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        assert!(length_between("name", "Öma", 3, 3).is_ok());
    }

    #[test]
    fn test_hex_color() {
        assert!(hex_color("color", "#4A6FA5").is_ok());
        assert!(hex_color("color", "#abcdef").is_ok());
        assert!(hex_color("color", "4A6FA5").is_err());
        assert!(hex_color("color", "#4A6FA").is_err());
        assert!(hex_color("color", "#4A6FAZ").is_err());
        assert!(hex_color("color", "#4A6FA5F").is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  x ".to_string())), Some("x".to_string()));
        assert_eq!(normalize_optional(Some("   ".to_string())), None);
        assert_eq!(normalize_optional(None), None);
    }
}
