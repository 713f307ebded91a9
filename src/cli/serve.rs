use crate::config::BridgeConfig;
use crate::error::Result;
use crate::server;

/// Apply command-line overrides on top of the loaded configuration.
pub fn apply_overrides(config: &mut BridgeConfig, host: Option<&str>, port: Option<u16>) {
    if let Some(host) = host {
        config.host = host.to_string();
    }
    if let Some(port) = port {
        config.port = port;
    }
}

/// Execute the `serve` command: start the HTTP server.
pub async fn execute(mut config: BridgeConfig, host: Option<&str>, port: Option<u16>) -> Result<()> {
    apply_overrides(&mut config, host, port);

    println!("A3S Bridge starting...");
    println!("Listening on http://{}", config.bind_address());
    println!("Press Ctrl+C to stop");

    server::start(config).await
}
