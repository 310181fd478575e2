//! Config command handlers.

use anyhow::{Context, Result};

use paperweave::config::Config;

use super::ConfigAction;

/// Show or initialize configuration.
pub(crate) fn cmd_config(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load().with_context(|| "Failed to load configuration")?;
            let rendered =
                toml::to_string_pretty(&config).with_context(|| "Failed to render configuration")?;
            println!("# {}", Config::path().display());
            print!("{rendered}");
        }
        ConfigAction::Init => {
            let path = Config::path();
            if path.exists() {
                println!("Config already exists at {}", path.display());
                return Ok(());
            }
            Config::default()
                .save_to_path(&path)
                .with_context(|| "Failed to write default configuration")?;
            println!("Wrote default config to {}", path.display());
        }
    }

    Ok(())
}
