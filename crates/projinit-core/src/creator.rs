//! Project creation: resolve the ancestry, run commands, copy files, then
//! run the global after-commands.

use crate::config::{Config, ProjectType};
use crate::env::EnvTable;
use crate::error::Error;
use crate::inheritance::InheritanceWalker;
use crate::materialize::{CopyOutcome, FileMaterializer};
use crate::runner::CommandRunner;
use camino::Utf8PathBuf;
use std::sync::Arc;

/// Creation stages, entered strictly in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    ResolvingParentChain,
    RunningCommands,
    CopyingFiles,
    RunningAfterCommands,
    Done,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::ResolvingParentChain => "resolving parent chain",
            Self::RunningCommands => "running commands",
            Self::CopyingFiles => "copying files",
            Self::RunningAfterCommands => "running after commands",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything that happened during one creation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationReport {
    /// Selected type
    pub project_type: String,
    /// Unknown requested type, missing parents and cycles met while resolving the ancestry
    pub resolution_issues: Vec<Error>,
    /// Number of commands attempted, after-commands included
    pub commands_run: usize,
    pub command_failures: Vec<Error>,
    pub files_written: Vec<Utf8PathBuf>,
    pub files_skipped: Vec<Utf8PathBuf>,
    pub file_failures: Vec<Error>,
    pub after_commands_skipped: bool,
}

impl CreationReport {
    /// No command or file failed and the ancestry resolved cleanly
    pub fn is_clean(&self) -> bool {
        self.resolution_issues.is_empty()
            && self.command_failures.is_empty()
            && self.file_failures.is_empty()
    }

    /// All non-fatal errors, in the order they occurred by stage
    pub fn failures(&self) -> impl Iterator<Item = &Error> {
        self.resolution_issues
            .iter()
            .chain(&self.command_failures)
            .chain(&self.file_failures)
    }
}

/// Drives a single project creation against a loaded catalog
#[derive(Debug)]
pub struct ProjectCreator<'a> {
    config: &'a Config,
    runner: CommandRunner,
    materializer: FileMaterializer,
    skip_after_commands: bool,
    stage: Stage,
}

impl<'a> ProjectCreator<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            runner: CommandRunner::new(config.runner.clone()),
            materializer: FileMaterializer::new(),
            skip_after_commands: false,
            stage: Stage::Start,
        }
    }

    /// Skip the global after-commands
    pub fn skip_after_commands(mut self, skip: bool) -> Self {
        self.skip_after_commands = skip;
        self
    }

    /// Expand `$NAME` in commands and file paths from `env`
    pub fn with_env(mut self, env: EnvTable) -> Self {
        let env = Arc::new(env);
        self.runner = self.runner.with_env(Arc::clone(&env));
        self.materializer = self.materializer.with_env(env);
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Look up `name` and create a project of that type.
    ///
    /// An unknown name is recorded as a resolution issue; no type commands or
    /// files are processed, but the after-commands still run unless skipped.
    pub async fn create_named(&mut self, name: &str) -> CreationReport {
        match self.config.find_type(name) {
            Ok(project_type) => self.create(project_type).await,
            Err(e) => {
                tracing::warn!("{}", e);
                let mut report = CreationReport {
                    project_type: name.to_string(),
                    resolution_issues: vec![e],
                    ..Default::default()
                };
                self.stage = Stage::Start;
                self.enter(Stage::ResolvingParentChain);
                self.run_after_commands(&mut report).await;
                self.enter(Stage::Done);
                report
            }
        }
    }

    /// Create a project of the given type.
    ///
    /// Never fails: individual command and file problems are logged and
    /// collected into the returned report.
    pub async fn create(&mut self, project_type: &'a ProjectType) -> CreationReport {
        let mut report = CreationReport {
            project_type: project_type.name.clone(),
            ..Default::default()
        };
        self.stage = Stage::Start;

        self.enter(Stage::ResolvingParentChain);
        let lineage = InheritanceWalker::new(self.config).lineage(project_type);
        report.resolution_issues.extend(lineage.issues().iter().cloned());
        let command_plan = lineage.command_plan();
        let file_plan = lineage.file_plan();

        self.enter(Stage::RunningCommands);
        for step in &command_plan {
            tracing::info!("* Running commands for {}:", step.project_type.name);
            report.commands_run += step.items.len();
            report
                .command_failures
                .extend(self.runner.run_all(step.items).await);
        }

        self.enter(Stage::CopyingFiles);
        for step in &file_plan {
            tracing::info!("* Copying files for {}:", step.project_type.name);
            for result in self.materializer.copy_all(step.items).await {
                match result {
                    Ok(CopyOutcome::Written { path, .. }) => report.files_written.push(path),
                    Ok(CopyOutcome::AlreadyExists { path }) => report.files_skipped.push(path),
                    Err(e) => report.file_failures.push(e),
                }
            }
        }

        self.run_after_commands(&mut report).await;

        self.enter(Stage::Done);
        report
    }

    async fn run_after_commands(&mut self, report: &mut CreationReport) {
        self.enter(Stage::RunningAfterCommands);
        if self.skip_after_commands {
            tracing::info!("* Skipping after commands");
            report.after_commands_skipped = true;
        } else if !self.config.after_commands.is_empty() {
            tracing::info!("* Running after commands:");
            report.commands_run += self.config.after_commands.len();
            report
                .command_failures
                .extend(self.runner.run_all(&self.config.after_commands).await);
        }
    }

    fn enter(&mut self, next: Stage) {
        debug_assert!(next > self.stage, "stage {} after {}", next, self.stage);
        tracing::debug!("Stage: {} -> {}", self.stage, next);
        self.stage = next;
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::config::{ParentRef, Runner};
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        root: Utf8PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
            Self { _dir: dir, root }
        }

        fn log_cmd(&self, line: &str) -> String {
            format!("echo {} >> '{}'", line, self.root.join("log"))
        }

        fn log(&self) -> Vec<String> {
            std::fs::read_to_string(self.root.join("log"))
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    fn catalog(fx: &Fixture) -> Config {
        std::fs::write(fx.root.join("base.tpl"), "base").unwrap();
        std::fs::write(fx.root.join("node.tpl"), "node").unwrap();

        Config {
            runner: Runner::default(),
            after_commands: vec![fx.log_cmd("after")],
            types: vec![
                ProjectType::new("base")
                    .with_command(fx.log_cmd("base"))
                    .with_file(
                        fx.root.join("base.tpl").as_str(),
                        fx.root.join("out/.gitignore").as_str(),
                    ),
                ProjectType::new("node")
                    .with_parent(ParentRef::new("base"))
                    .with_command(fx.log_cmd("node"))
                    .with_file(
                        fx.root.join("node.tpl").as_str(),
                        fx.root.join("out/package.json").as_str(),
                    ),
            ],
        }
    }

    #[tokio::test]
    async fn test_full_creation_order() {
        let fx = Fixture::new();
        let config = catalog(&fx);
        let mut creator = ProjectCreator::new(&config);

        let report = creator.create_named("NODE").await;

        assert_eq!(creator.stage(), Stage::Done);
        assert_eq!(fx.log(), vec!["base", "node", "after"]);
        assert_eq!(report.commands_run, 3);
        assert_eq!(
            report.files_written,
            vec![
                fx.root.join("out/.gitignore"),
                fx.root.join("out/package.json")
            ]
        );
        assert!(report.is_clean());
        assert!(!report.after_commands_skipped);
    }

    #[tokio::test]
    async fn test_skip_after_commands() {
        let fx = Fixture::new();
        let config = catalog(&fx);

        let report = ProjectCreator::new(&config)
            .skip_after_commands(true)
            .create_named("node")
            .await;

        assert_eq!(fx.log(), vec!["base", "node"]);
        assert!(report.after_commands_skipped);
        assert_eq!(report.commands_run, 2);
    }

    #[tokio::test]
    async fn test_failures_are_collected_not_fatal() {
        let fx = Fixture::new();
        let mut config = catalog(&fx);
        config.types[1].commands.insert(0, "false".to_string());
        config.types[1]
            .files
            .insert(0, crate::config::FileEntry::new("/no/such/file", "x"));
        std::fs::create_dir_all(fx.root.join("out")).unwrap();
        std::fs::write(fx.root.join("out/.gitignore"), "keep").unwrap();

        let report = ProjectCreator::new(&config)
            .create_named("node")
            .await;

        assert_eq!(fx.log(), vec!["base", "node", "after"]);
        assert_eq!(report.command_failures.len(), 1);
        assert_eq!(report.file_failures.len(), 1);
        assert_eq!(report.files_skipped, vec![fx.root.join("out/.gitignore")]);
        assert_eq!(
            std::fs::read_to_string(fx.root.join("out/.gitignore")).unwrap(),
            "keep"
        );
        assert!(!report.is_clean());
        assert_eq!(report.failures().count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_type_still_runs_after_commands() {
        let fx = Fixture::new();
        let config = catalog(&fx);
        let mut creator = ProjectCreator::new(&config);

        let report = creator.create_named("python").await;

        assert_eq!(creator.stage(), Stage::Done);
        assert_eq!(fx.log(), vec!["after"]);
        assert_eq!(report.project_type, "python");
        assert_eq!(
            report.resolution_issues,
            vec![Error::project_type_not_found("python")]
        );
        assert_eq!(report.commands_run, 1);
        assert!(report.files_written.is_empty());
        assert!(!report.is_clean());
        assert!(report.failures().all(|e| !e.is_fatal()));
    }

    #[tokio::test]
    async fn test_unknown_type_with_after_commands_skipped() {
        let fx = Fixture::new();
        let config = catalog(&fx);

        let report = ProjectCreator::new(&config)
            .skip_after_commands(true)
            .create_named("python")
            .await;

        assert!(fx.log().is_empty());
        assert!(report.after_commands_skipped);
        assert_eq!(report.commands_run, 0);
    }

    #[tokio::test]
    async fn test_paths_and_commands_expand_from_env() {
        let fx = Fixture::new();
        std::fs::write(fx.root.join("lib.tpl"), "lib").unwrap();
        let config = Config {
            types: vec![ProjectType::new("lib")
                .with_command(format!("echo $NAME >> '{}'", fx.root.join("log")))
                .with_file("$ROOT/lib.tpl", "$ROOT/$NAME/lib.rs")],
            ..Default::default()
        };

        let report = ProjectCreator::new(&config)
            .with_env(EnvTable::from_vars([
                ("ROOT", fx.root.as_str()),
                ("NAME", "demo"),
            ]))
            .create_named("lib")
            .await;

        assert!(report.is_clean(), "{report:?}");
        assert_eq!(fx.log(), vec!["demo"]);
        assert_eq!(report.files_written, vec![fx.root.join("demo/lib.rs")]);
    }

    #[tokio::test]
    async fn test_missing_parent_is_reported() {
        let fx = Fixture::new();
        let mut config = catalog(&fx);
        config.types[1].parent = Some(ParentRef::new("ghost"));

        let report = ProjectCreator::new(&config)
            .skip_after_commands(true)
            .create_named("node")
            .await;

        assert_eq!(fx.log(), vec!["node"]);
        assert_eq!(
            report.resolution_issues,
            vec![Error::project_type_not_found("ghost")]
        );
    }
}
