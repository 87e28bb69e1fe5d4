//! Configuration display command.

use console::style;

use crate::config::Config;

/// Print the effective configuration as TOML.
pub fn cmd_config_show(config: &Config) -> anyhow::Result<()> {
    let source = config
        .source_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    eprintln!("{} Source: {}", style("→").dim(), source);

    if let Err(e) = config.validate() {
        eprintln!("{} {}", style("!").yellow(), e);
    }

    print!("{}", config.to_toml()?);
    Ok(())
}
