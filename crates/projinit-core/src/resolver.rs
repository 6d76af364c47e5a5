//! Project type lookup

use crate::config::{Config, ProjectType};
use crate::error::{Error, Result};

/// Find the first type whose name matches `name`, ignoring case
pub fn find_type<'a>(config: &'a Config, name: &str) -> Result<&'a ProjectType> {
    config
        .types
        .iter()
        .find(|t| t.is_named(name))
        .ok_or_else(|| Error::project_type_not_found(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Config {
        Config {
            types: vec![
                ProjectType::new("Node").with_command("npm init -y"),
                ProjectType::new("rust"),
                ProjectType::new("NODE").with_command("yarn init"),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let config = catalog();
        assert_eq!(find_type(&config, "RUST").unwrap().name, "rust");
        assert_eq!(find_type(&config, "node").unwrap().name, "Node");
    }

    #[test]
    fn test_first_declared_duplicate_wins() {
        let config = catalog();
        let found = find_type(&config, "nOdE").unwrap();
        assert_eq!(found.commands, vec!["npm init -y"]);
    }

    #[test]
    fn test_missing_type() {
        let config = catalog();
        assert_eq!(
            find_type(&config, "python").unwrap_err(),
            Error::project_type_not_found("python")
        );
    }

    #[test]
    fn test_config_find_type_delegates() {
        let config = catalog();
        assert_eq!(config.find_type("Rust").unwrap().name, "rust");
    }
}
