//! `forgecore history` / `forgecore clear`: Persisted history management.

use forgecore_agent::Agent;
use forgecore_core::MemoryStore;

use super::load_config;

pub async fn history(limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let agent = Agent::from_config(&config);
    let entries = agent.store().history(limit).await;

    if entries.is_empty() {
        println!("No history yet.");
        return Ok(());
    }

    for (i, entry) in entries.iter().enumerate() {
        let first_line = entry.result.lines().next().unwrap_or_default();
        println!("{:>3}. [{}] {}", i + 1, entry.timestamp, entry.prompt);
        println!("     -> {first_line}");
    }

    Ok(())
}

pub async fn clear(confirm: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !confirm {
        return Err("Refusing to clear history without --confirm".into());
    }

    let config = load_config()?;
    let agent = Agent::from_config(&config);
    agent.clear_history().await?;
    println!("History cleared ({}).", config.memory.resolved_path().display());

    Ok(())
}
