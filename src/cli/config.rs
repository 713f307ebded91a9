use crate::config::BridgeConfig;
use crate::error::Result;

/// Execute the `config` command: print the effective configuration.
pub fn execute(config: &BridgeConfig) -> Result<()> {
    print!("{}", render(config)?);
    Ok(())
}

fn render(config: &BridgeConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
