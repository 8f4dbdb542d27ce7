//! `atomia onboard` — First-time setup.

use atomia_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🧪 Atomia — First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Export GEMINI_API_KEY (or put it in a .env file)");
        println!("   2. Run: atomia ask \"What is Le Chatelier's principle?\" --subject chemistry");
        println!("   3. Or serve the API: atomia serve\n");
    }

    println!("🎉 Setup complete!\n");

    Ok(())
}
