//! `forgecore onboard`: First-time setup.

use forgecore_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("ForgeCore — First-Time Setup");
    println!("============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("  Config file exists: {}", config_path.display());
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("Wrote default config: {}", config_path.display());
    }

    let config = AppConfig::load_from(&config_path)?;
    let memory_path = config.memory.resolved_path();
    if let Some(parent) = memory_path.parent()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
        println!("Created memory directory: {}", parent.display());
    }

    println!();
    println!("  Memory:          {} ({})", config.memory.backend, memory_path.display());
    println!("  Sandbox timeout: {} ms", config.tools.sandbox_timeout_ms);
    println!("  Web search:      {}", if config.tools.allow_web_search { "enabled" } else { "disabled" });
    println!();
    println!("Try: forgecore run -m \"create a red cube and add studio lighting\"");

    Ok(())
}
