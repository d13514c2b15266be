//! `forgecore run`: Single-instruction or interactive mode.

use forgecore_agent::Agent;
use forgecore_core::MemoryStore;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::load_config;

pub async fn run(message: Option<String>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let mut agent = Agent::from_config(&config);

    if let Some(msg) = message {
        let reply = agent.handle_detailed(&msg).await;
        if json {
            let rendered =
                serde_json::to_string_pretty(&reply).map_err(forgecore_core::Error::from)?;
            println!("{rendered}");
        } else {
            println!("{}", reply.text);
        }
        return Ok(());
    }

    println!();
    println!("  ForgeCore — Interactive Mode");
    println!();
    println!("  Memory:  {}", agent.store().name());
    println!("  Type an instruction and press Enter.");
    println!("  Type 'exit' or Ctrl+D to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("  > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        let reply = agent.handle_detailed(line).await;
        println!();
        println!("{}", reply.text);
        for sub in agent.last_sub_results() {
            println!("  [{}] {}", &sub.id[..8.min(sub.id.len())], sub.instruction);
        }
        println!();
    }

    println!();
    Ok(())
}
