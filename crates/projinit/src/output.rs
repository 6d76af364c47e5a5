//! Terminal output utilities

use console::style;
use projinit_core::{CreationReport, Error};

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red().bold(), msg);
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Print a header
pub fn header(msg: &str) {
    println!("\n{}", style(msg).bold().underlined());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", style(key).dim(), value);
}

/// Print the end-of-run summary
pub fn summary(report: &CreationReport) {
    header("Summary");
    kv("Project type", &report.project_type);
    kv("Commands run", &report.commands_run.to_string());
    kv("Files written", &report.files_written.len().to_string());
    kv("Files skipped", &report.files_skipped.len().to_string());
    if report.after_commands_skipped {
        kv("After commands", "skipped");
    }
    println!();

    if report.is_clean() {
        success(&format!("Project of type {} created", report.project_type));
        return;
    }

    for failure in report.failures() {
        warning(&failure.to_string());
    }
    let unknown = Error::project_type_not_found(report.project_type.as_str());
    if report.resolution_issues.contains(&unknown) {
        warning(&format!("No project of type {} was created", report.project_type));
        return;
    }
    warning(&format!(
        "Project of type {} created with {} problem(s)",
        report.project_type,
        report.failures().count()
    ));
}
