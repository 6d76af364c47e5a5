//! Interactive project type selection

use anyhow::Result;
use dialoguer::Select;
use projinit_core::Config;

const QUIT: &str = "quit / cancel";

/// Ask the user for a project type. Returns `None` when they quit.
pub fn pick_type(config: &Config) -> Result<Option<String>> {
    let items = menu_items(config);

    let selection = Select::new()
        .with_prompt("Choose your project type")
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(selection
        .filter(|&index| index < config.types.len())
        .map(|index| config.types[index].name.clone()))
}

fn menu_items(config: &Config) -> Vec<String> {
    config
        .type_names()
        .into_iter()
        .map(str::to_string)
        .chain(std::iter::once(QUIT.to_string()))
        .collect()
}
