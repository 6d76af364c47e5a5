//! projinit - scaffold new projects from a catalog of project types
//!
//! This is the main entry point for the projinit command-line interface.

mod cli;
mod output;
mod picker;

use anyhow::{Context, Result};
use clap::Parser;
use projinit_core::{Config, ConfigLocator, Error, ProjectCreator};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    println!("projinit, set up your dev environment in no time!");

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            output::error(&e.to_string());
            return Ok(exit_code([&e]));
        }
    };

    let type_name = match cli.project_type() {
        Some(name) => name.to_string(),
        None => match picker::pick_type(&config)? {
            Some(name) => name,
            None => return Ok(ExitCode::FAILURE),
        },
    };

    match config.find_type(&type_name) {
        Ok(project_type) => {
            let cwd = std::env::current_dir().context("Failed to determine current directory")?;
            output::header(&format!(
                "Creating project of type {} in {}",
                project_type.name,
                cwd.display()
            ));
        }
        Err(e) => {
            output::error(&e.to_string());
            output::info(&format!(
                "Available types: {}",
                config.type_names().join(", ")
            ));
        }
    }

    let report = ProjectCreator::new(&config)
        .skip_after_commands(cli.skip_after_commands)
        .create_named(&type_name)
        .await;

    output::summary(&report);

    Ok(exit_code(report.failures()))
}

/// Load the catalog from `--config` or the first readable standard location
fn load_config(cli: &Cli) -> projinit_core::Result<Config> {
    let (path, config) = match &cli.config {
        Some(path) => (path.clone(), Config::load(path)?),
        None => ConfigLocator::standard().load()?,
    };

    tracing::debug!(
        "Loaded {} project type(s) from {}",
        config.types.len(),
        path
    );
    Ok(config)
}

/// Only catalog errors fail the run; everything else has already been reported
fn exit_code<'a>(errors: impl IntoIterator<Item = &'a Error>) -> ExitCode {
    if errors.into_iter().any(Error::is_fatal) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type_exits_successfully() {
        let errors = [Error::project_type_not_found("python")];
        assert_eq!(exit_code(&errors), ExitCode::SUCCESS);
    }

    #[test]
    fn test_command_and_file_failures_exit_successfully() {
        let errors = [
            Error::command_execution("npm init -y", "exit status: 1"),
            Error::file_fetch("https://example.com/a", "server returned 404 Not Found"),
            Error::cyclic_inheritance(&["a", "b", "a"]),
        ];
        assert_eq!(exit_code(&errors), ExitCode::SUCCESS);
        assert_eq!(exit_code(&[] as &[Error]), ExitCode::SUCCESS);
    }

    #[test]
    fn test_catalog_errors_fail_the_run() {
        assert_eq!(
            exit_code([&Error::config_not_found("./config.json")]),
            ExitCode::FAILURE
        );
        assert_eq!(
            exit_code([&Error::malformed_config("expected value at line 1")]),
            ExitCode::FAILURE
        );
    }

    #[test]
    fn test_missing_explicit_config_is_fatal() {
        let cli = Cli::try_parse_from(["projinit", "-c", "/no/such/catalog.json"]).unwrap();
        let err = load_config(&cli).unwrap_err();
        assert_eq!(exit_code([&err]), ExitCode::FAILURE);
    }
}
