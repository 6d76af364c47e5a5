//! # projinit-core
//!
//! Core library for projinit providing:
//! - The project type catalog (runner, after-commands, inheritable types)
//! - Ancestry resolution with per-link command inheritance
//! - Sequential shell command execution
//! - Idempotent file materialization from local paths or http(s) URLs
//!
//! # Example
//!
//! ```no_run
//! use projinit_core::{Config, ProjectCreator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_json(r#"{
//!     "types": [
//!         { "type": "base", "files": [["tpl/.gitignore", ".gitignore"]] },
//!         { "type": "node", "parent": "base", "commands": ["npm init -y"] }
//!     ]
//! }"#)?;
//!
//! let report = ProjectCreator::new(&config)
//!     .skip_after_commands(true)
//!     .create_named("node")
//!     .await;
//! assert!(report.is_clean());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod creator;
pub mod env;
pub mod error;
pub mod inheritance;
pub mod materialize;
pub mod resolver;
pub mod runner;

pub use config::{Config, ConfigLocator, FileEntry, ParentRef, ProjectType, Runner};
pub use creator::{CreationReport, ProjectCreator, Stage};
pub use env::{expand, EnvTable};
pub use error::{Error, Result};
pub use inheritance::{InheritanceWalker, Lineage, PlanStep};
pub use materialize::{CopyOutcome, FileMaterializer, Source};
pub use runner::CommandRunner;
