//! Resource config validation: names double as path segments and collection names.

use crate::error::ConfigError;
use regex::Regex;
use std::sync::OnceLock;

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]{0,62}$").expect("static pattern"))
}

/// Paths taken by the common routes.
pub const RESERVED_NAMES: &[&str] = &["health", "ready", "version"];

pub fn is_valid_resource_name(name: &str) -> bool {
    name_pattern().is_match(name)
}

pub fn validate_resource(name: &str, id_field: &str) -> Result<(), ConfigError> {
    if !is_valid_resource_name(name) || RESERVED_NAMES.contains(&name) {
        return Err(ConfigError::InvalidResourceName(name.to_string()));
    }
    if id_field.trim().is_empty() {
        return Err(ConfigError::InvalidIdField {
            resource: name.to_string(),
            id_field: id_field.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_resource("role", "RoleId").is_ok());
        assert!(validate_resource("user_group", "id").is_ok());
    }

    #[test]
    fn rejects_names_unfit_for_paths() {
        for bad in ["", "role/admin", "1role", "ro le", ":id", "health"] {
            assert!(
                matches!(validate_resource(bad, "id"), Err(ConfigError::InvalidResourceName(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn rejects_blank_id_field() {
        assert!(matches!(
            validate_resource("role", " "),
            Err(ConfigError::InvalidIdField { .. })
        ));
    }
}
