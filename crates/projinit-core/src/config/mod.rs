//! Project type catalog.
//!
//! The catalog is a single JSON (or YAML) document:
//!
//! ```json
//! {
//!   "runner": { "command": "sh", "args": ["-c"] },
//!   "after-commands": ["git init"],
//!   "types": [
//!     { "type": "base", "files": [["tpl/.gitignore", ".gitignore"]] },
//!     { "type": "node", "parent": "base", "commands": ["npm init -y"] },
//!     { "type": "lib", "parent": { "type": "node", "run-commands": false } }
//!   ]
//! }
//! ```
//!
//! A `parent` is either a bare type name or an object with an optional
//! `run-commands` flag. Malformed `files` or `commands` lists degrade to
//! empty lists; a malformed `parent` rejects the whole document.

pub mod discovery;

use crate::error::{Error, Result};
use camino::Utf8Path;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fs;

pub use discovery::ConfigLocator;

/// Shell invocation prefix used for every command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runner {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            command: "sh".to_string(),
            args: vec!["-c".to_string()],
        }
    }
}

/// Normalized inheritance link to a parent type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawParent")]
pub struct ParentRef {
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether the parent's commands run before the child's.
    /// Files are inherited regardless.
    #[serde(rename = "run-commands")]
    pub run_commands: bool,
}

impl ParentRef {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            run_commands: true,
        }
    }

    pub fn without_commands(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            run_commands: false,
        }
    }
}

/// The two accepted shapes of a `parent` entry
#[derive(Deserialize)]
#[serde(untagged)]
enum RawParent {
    Name(String),
    Link {
        #[serde(rename = "type")]
        type_name: String,
        #[serde(rename = "run-commands", default = "default_true")]
        run_commands: bool,
    },
}

fn default_true() -> bool {
    true
}

impl From<RawParent> for ParentRef {
    fn from(raw: RawParent) -> Self {
        match raw {
            RawParent::Name(type_name) => Self::new(type_name),
            RawParent::Link {
                type_name,
                run_commands,
            } => Self {
                type_name,
                run_commands,
            },
        }
    }
}

/// A `(source, destination)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct FileEntry {
    /// Local path or http(s) URL
    pub source: String,
    pub destination: String,
}

impl FileEntry {
    pub fn new(source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }
}

impl From<(String, String)> for FileEntry {
    fn from((source, destination): (String, String)) -> Self {
        Self {
            source,
            destination,
        }
    }
}

impl From<FileEntry> for (String, String) {
    fn from(entry: FileEntry) -> Self {
        (entry.source, entry.destination)
    }
}

/// A named template of commands and files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectType {
    #[serde(rename = "type")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRef>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub files: Vec<FileEntry>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub commands: Vec<String>,
}

impl ProjectType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            files: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: ParentRef) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_file(mut self, source: impl Into<String>, destination: impl Into<String>) -> Self {
        self.files.push(FileEntry::new(source, destination));
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// Case-insensitive name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// A list that falls back to empty when its entries don't have the expected shape
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(Vec<T>),
    Invalid(IgnoredAny),
}

fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    match Lenient::<T>::deserialize(deserializer)? {
        Lenient::Valid(items) => Ok(items),
        Lenient::Invalid(_) => {
            tracing::debug!("Ignoring malformed list in project type");
            Ok(Vec::new())
        }
    }
}

/// Catalog root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub runner: Runner,
    #[serde(rename = "after-commands", default)]
    pub after_commands: Vec<String>,
    #[serde(default)]
    pub types: Vec<ProjectType>,
}

impl Config {
    /// Parse a JSON catalog
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload).map_err(Error::malformed_config)?;
        config.validated()
    }

    /// Parse a YAML catalog
    pub fn from_yaml(payload: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(payload).map_err(Error::malformed_config)?;
        config.validated()
    }

    /// Read and parse a catalog file; `.yaml`/`.yml` files are parsed as YAML
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let payload = fs::read_to_string(path)
            .map_err(|e| Error::config_not_found(format!("{} ({})", path, e)))?;

        Self::parse_for_path(path, &payload)
    }

    /// Parse `payload` in the format implied by `path`'s extension
    pub fn parse_for_path(path: &Utf8Path, payload: &str) -> Result<Self> {
        match path.extension() {
            Some("yaml") | Some("yml") => Self::from_yaml(payload),
            _ => Self::from_json(payload),
        }
    }

    /// Find a project type by name, ignoring case. First declared match wins.
    pub fn find_type(&self, name: &str) -> Result<&ProjectType> {
        crate::resolver::find_type(self, name)
    }

    /// Names of all declared types, in declaration order
    pub fn type_names(&self) -> Vec<&str> {
        self.types.iter().map(|t| t.name.as_str()).collect()
    }

    fn validated(self) -> Result<Self> {
        let mut seen = HashSet::new();

        for (index, project_type) in self.types.iter().enumerate() {
            if project_type.name.trim().is_empty() {
                return Err(Error::malformed_config(format!(
                    "project type #{} has an empty name",
                    index + 1
                )));
            }

            if !seen.insert(project_type.name.to_lowercase()) {
                tracing::warn!(
                    "Project type '{}' is declared more than once; the first declaration is used",
                    project_type.name
                );
            }
        }

        Ok(self)
    }
}
