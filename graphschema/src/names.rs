// Copyright (c) 2024-2025 GraphSchema Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Name grammar shared by schema types and indexes

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{SchemaError, SchemaResult};

/// Prefix reserved for system-defined types
pub const SYSTEM_PREFIX: char = '~';

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s\p{Cc}~][^\s\p{Cc}]*$").expect("name pattern compiles"));

static OPTION_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_-]*(\.[A-Za-z][A-Za-z0-9_-]*)*$")
        .expect("option path pattern compiles")
});

/// Dot-separated option path such as `index.search.backend`
pub(crate) fn validate_option_path(path: &str) -> SchemaResult<()> {
    if OPTION_PATH.is_match(path) {
        Ok(())
    } else {
        Err(SchemaError::violation(format!(
            "'{}' is not a valid option path",
            path
        )))
    }
}

/// Rejects empty names always; with `strict`, also reserved or whitespace-bearing names
pub(crate) fn validate_name(name: &str, strict: bool) -> SchemaResult<()> {
    if name.is_empty() {
        return Err(SchemaError::violation("Name cannot be empty"));
    }
    if strict && !NAME_PATTERN.is_match(name) {
        if name.starts_with(SYSTEM_PREFIX) {
            return Err(SchemaError::violation(format!(
                "Name '{}' uses the reserved prefix '{}'",
                name, SYSTEM_PREFIX
            )));
        }
        return Err(SchemaError::violation(format!(
            "Name '{}' contains whitespace or control characters",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("person", true).is_ok());
        assert!(validate_name("created_at", true).is_ok());
        assert!(validate_name("名前", true).is_ok());
        assert!(validate_name("a~b", true).is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert!(validate_name("", false).is_err());
        assert!(validate_name("", true).is_err());
        assert!(validate_name("~system", true).is_err());
        assert!(validate_name("two words", true).is_err());
        assert!(validate_name("tab\tname", true).is_err());
    }

    #[test]
    fn test_option_paths() {
        assert!(validate_option_path("cache").is_ok());
        assert!(validate_option_path("index.search.backend").is_ok());
        assert!(validate_option_path("tx.log-tx").is_ok());
        assert!(validate_option_path("").is_err());
        assert!(validate_option_path("index..backend").is_err());
        assert!(validate_option_path(".index").is_err());
        assert!(validate_option_path("index.1st").is_err());
    }

    #[test]
    fn test_lenient_mode_accepts_reserved_names() {
        assert!(validate_name("~system", false).is_ok());
        assert!(validate_name("two words", false).is_ok());
    }
}
