//! `atomia serve` — Start the HTTP API server.

use atomia_config::AppConfig;

pub async fn run(
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(host) = host_override {
        config.gateway.host = host;
    }
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🧪 Atomia Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "   Provider:  {}",
        if config.llm_enabled() {
            format!("gemini ({})", config.provider.model)
        } else {
            "offline mode (no API key)".to_string()
        }
    );

    atomia_gateway::start(config).await?;

    Ok(())
}
