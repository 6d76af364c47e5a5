//! Configuration file discovery

use super::Config;
use crate::error::{Error, Result};
use camino::Utf8PathBuf;
use std::fs;

/// Application directory name under the user's config directories
const APP_DIR: &str = "init-go";

/// Configuration file name inside the application directory
const CONFIG_FILE_NAME: &str = "config.json";

/// System-wide configuration path
const SYSTEM_CONFIG: &str = "/etc/init-go.json";

/// Ordered list of candidate catalog locations; the first readable one wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocator {
    candidates: Vec<Utf8PathBuf>,
}

impl ConfigLocator {
    /// Create a locator over an explicit candidate list
    pub fn new(candidates: Vec<Utf8PathBuf>) -> Self {
        Self { candidates }
    }

    /// The standard search order, shared with the `init-go` tool so existing
    /// catalogs keep working:
    ///
    /// 1. `./config.json`
    /// 2. `$XDG_CONFIG_HOME/init-go/config.json`
    /// 3. `$HOME/.config/init-go/config.json`
    /// 4. `$HOME/.init-go/config.json`
    /// 5. `/etc/init-go.json`
    pub fn standard() -> Self {
        Self::from_dirs(xdg_config_home(), home_dir())
    }

    /// Build the standard search order from the given base directories
    pub fn from_dirs(xdg_config_home: Option<Utf8PathBuf>, home: Option<Utf8PathBuf>) -> Self {
        let mut candidates = vec![Utf8PathBuf::from(".").join(CONFIG_FILE_NAME)];

        if let Some(xdg) = xdg_config_home {
            candidates.push(xdg.join(APP_DIR).join(CONFIG_FILE_NAME));
        }

        if let Some(home) = home {
            candidates.push(home.join(".config").join(APP_DIR).join(CONFIG_FILE_NAME));
            candidates.push(home.join(format!(".{}", APP_DIR)).join(CONFIG_FILE_NAME));
        }

        candidates.push(Utf8PathBuf::from(SYSTEM_CONFIG));

        Self { candidates }
    }

    /// Candidate paths in search order
    pub fn candidates(&self) -> &[Utf8PathBuf] {
        &self.candidates
    }

    /// Read the first readable candidate
    pub fn locate(&self) -> Result<(Utf8PathBuf, String)> {
        for path in &self.candidates {
            match fs::read_to_string(path) {
                Ok(content) => {
                    tracing::debug!("Using configuration from {}", path);
                    return Ok((path.clone(), content));
                }
                Err(e) => tracing::trace!("Skipping {}: {}", path, e),
            }
        }

        Err(Error::config_not_found(
            self.candidates
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        ))
    }

    /// Locate and parse the first readable candidate
    pub fn load(&self) -> Result<(Utf8PathBuf, Config)> {
        let (path, content) = self.locate()?;
        let config = Config::parse_for_path(&path, &content)?;
        Ok((path, config))
    }
}

impl Default for ConfigLocator {
    fn default() -> Self {
        Self::standard()
    }
}

fn xdg_config_home() -> Option<Utf8PathBuf> {
    std::env::var("XDG_CONFIG_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(Utf8PathBuf::from)
}

/// `$HOME` first, then the platform home directory
fn home_dir() -> Option<Utf8PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Some(Utf8PathBuf::from(home));
        }
    }

    dirs::home_dir().and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn test_standard_order() {
        let locator = ConfigLocator::from_dirs(
            Some(Utf8PathBuf::from("/xdg")),
            Some(Utf8PathBuf::from("/home/dev")),
        );

        assert_eq!(
            locator.candidates(),
            &[
                Utf8PathBuf::from("./config.json"),
                Utf8PathBuf::from("/xdg/init-go/config.json"),
                Utf8PathBuf::from("/home/dev/.config/init-go/config.json"),
                Utf8PathBuf::from("/home/dev/.init-go/config.json"),
                Utf8PathBuf::from("/etc/init-go.json"),
            ]
        );
    }

    #[test]
    fn test_xdg_skipped_when_unset() {
        let locator = ConfigLocator::from_dirs(None, Some(Utf8PathBuf::from("/home/dev")));
        assert_eq!(locator.candidates().len(), 4);
        assert!(locator
            .candidates()
            .iter()
            .all(|p| !p.as_str().starts_with("/xdg")));
    }

    #[test]
    fn test_first_readable_wins() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        let first = root.join("first.json");
        let second = root.join("second.json");
        std::fs::write(&second, r#"{"types": [{"type": "second"}]}"#).unwrap();

        let locator = ConfigLocator::new(vec![first.clone(), second.clone()]);
        let (path, config) = locator.load().unwrap();
        assert_eq!(path, second);
        assert_eq!(config.type_names(), vec!["second"]);

        std::fs::write(&first, r#"{"types": [{"type": "first"}]}"#).unwrap();
        let (path, config) = locator.load().unwrap();
        assert_eq!(path, first);
        assert_eq!(config.type_names(), vec!["first"]);
    }

    #[test]
    fn test_nothing_readable_is_config_not_found() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        let locator = ConfigLocator::new(vec![root.join("a.json"), root.join("b.json")]);

        let err = locator.load().unwrap_err();
        match err {
            Error::ConfigNotFound { searched } => {
                assert!(searched.contains("a.json"));
                assert!(searched.contains("b.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_candidate_does_not_fall_through() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        let broken = root.join("broken.json");
        let good = root.join("good.json");
        std::fs::write(&broken, "{ not json").unwrap();
        std::fs::write(&good, r#"{"types": []}"#).unwrap();

        let locator = ConfigLocator::new(vec![broken, good]);
        assert!(matches!(
            locator.load(),
            Err(Error::MalformedConfig { .. })
        ));
    }

    #[test]
    #[serial]
    fn test_standard_uses_home_env() {
        let dir = TempDir::new().unwrap();
        let home = utf8(&dir);
        let original_home = std::env::var("HOME").ok();
        let original_xdg = std::env::var("XDG_CONFIG_HOME").ok();

        std::env::set_var("HOME", home.as_str());
        std::env::remove_var("XDG_CONFIG_HOME");

        let locator = ConfigLocator::standard();
        assert!(locator
            .candidates()
            .contains(&home.join(".init-go").join("config.json")));

        match original_home {
            Some(v) => std::env::set_var("HOME", v),
            None => std::env::remove_var("HOME"),
        }
        if let Some(v) = original_xdg {
            std::env::set_var("XDG_CONFIG_HOME", v);
        }
    }
}
