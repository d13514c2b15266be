//! `forgecore tool`: Run a tool command without routing it.

use forgecore_tools::ToolExecutor;

use super::load_config;

pub async fn run(command: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let executor = ToolExecutor::from_config(&config.tools);
    println!("{}", executor.run(command).await);
    Ok(())
}
