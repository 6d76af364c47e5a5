//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::Parser;

const AFTER_HELP: &str = "\
If no type is given, a selector is shown.

Types are defined in the config, which is read from the first of these locations that exists:

 * ./config.json
 * $XDG_CONFIG_HOME/init-go/config.json
 * $HOME/.config/init-go/config.json
 * $HOME/.init-go/config.json
 * /etc/init-go.json";

/// projinit - set up your dev environment in no time
#[derive(Parser, Debug)]
#[command(name = "projinit")]
#[command(author, version, about, long_about = None)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// Do not run the commands in the { "after-commands": [] } entry
    #[arg(short, long)]
    pub skip_after_commands: bool,

    /// Use this config file instead of searching the standard locations
    #[arg(short, long, env = "PROJINIT_CONFIG")]
    pub config: Option<Utf8PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors
    #[arg(short, long)]
    pub quiet: bool,

    /// Project type to create; when several are given the last one is used
    #[arg(value_name = "TYPE")]
    pub project_types: Vec<String>,
}

impl Cli {
    /// The requested project type, if any
    pub fn project_type(&self) -> Option<&str> {
        self.project_types.last().map(String::as_str)
    }
}
