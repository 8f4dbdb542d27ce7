//! `atomia status` — Show effective configuration.

use atomia_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🧪 Atomia Status");
    println!("================");
    println!("  Version:      {}", env!("CARGO_PKG_VERSION"));
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.provider.kind);
    println!("  Model:        {}", config.provider.model);
    println!("  Temperature:  {}", config.provider.temperature);
    println!("  Top-p:        {}", config.provider.top_p);
    println!("  Max tokens:   {}", config.provider.max_output_tokens);
    println!("  Timeout:      {}s", config.provider.timeout_secs);
    println!("  Context:      {} turns", config.session.max_context_messages);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  CORS:         {}", config.gateway.cors_origins.join(", "));
    println!(
        "  API key:      {}",
        if config.has_api_key() { "set (redacted)" } else { "not set" }
    );
    println!(
        "  Preamble:     {}",
        if config.prompt.system_preamble_override.is_some() { "custom" } else { "built-in" }
    );

    if config.llm_enabled() {
        println!("\n  ✅ Gemini is live");
    } else {
        println!("\n  ⚠️  Offline mode — answers use the fallback outline");
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found");
    } else {
        println!("  ⚠️  No config file — run `atomia onboard` first");
    }

    Ok(())
}
