//! Configuration view and validation commands: `coderev config`.

use anyhow::Result;
use std::path::Path;

use coderev::config::{CliOverrides, CoderevConfig, CoderevToml, CONFIG_FILE};

use super::super::ConfigCommands;

fn print_toml(toml: &CoderevToml) {
    println!("[api]");
    println!("  environment = \"{}\"", toml.api.environment);
    if let Some(url) = &toml.api.base_url {
        println!("  base_url = \"{}\"", url);
    }
    println!("  timeout_secs = {}", toml.api.timeout_secs);
    println!();
    println!("[display]");
    println!("  page_size = {}", toml.display.page_size);
    println!("  expand_categories = {}", toml.display.expand_categories);
    println!("  show_refactored = {}", toml.display.show_refactored);
    println!("  wrap_width = {}", toml.display.wrap_width);
    println!();
}

pub fn cmd_config(
    config_dir: &Path,
    command: Option<ConfigCommands>,
    cli: CliOverrides,
) -> Result<()> {
    let config_path = config_dir.join(CONFIG_FILE);

    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("Code Rev Configuration");
            println!("======================");
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
                println!();
                print_toml(&CoderevToml::load(&config_path)?);
            } else {
                println!("No coderev.toml found at {}", config_path.display());
                println!();
                println!("Using default configuration:");
                print_toml(&CoderevToml::default());
                println!("Run 'coderev config init' to create a coderev.toml file.");
                println!();
            }

            let config = CoderevConfig::load(config_dir.to_path_buf(), cli)?;
            println!("Effective values (with env/CLI overrides):");
            println!("  environment = \"{}\"", config.environment()?);
            println!("  base_url = \"{}\"", config.base_url()?);
            println!("  timeout_secs = {}", config.timeout().as_secs());
            println!("  session = {}", config.session_file().display());
            println!();
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No coderev.toml found. Using defaults (valid).");
                return Ok(());
            }

            let config = CoderevConfig::load(config_dir.to_path_buf(), cli)?;
            let warnings = config.validate();

            if warnings.is_empty() {
                println!("Configuration is valid.");
            } else {
                println!("Configuration warnings:");
                for warning in warnings {
                    println!("  - {}", warning);
                }
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("coderev.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            CoderevToml::default().save(&config_path)?;

            println!("Created coderev.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] environment, base_url, timeout_secs");
            println!("  - [display] page_size, expand_categories, show_refactored, wrap_width");
            println!();
        }
    }

    Ok(())
}
