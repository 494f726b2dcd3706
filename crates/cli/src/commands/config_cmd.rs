//! `ferroact config` — configuration management commands.

use std::path::Path;

use ferroact_config::RuntimeConfig;

pub fn show(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(path).map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", config.to_toml());
    Ok(())
}

pub fn validate(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");
    match super::load_config(path) {
        Ok(config) => {
            println!("   Config parsed successfully");
            println!();
            println!("   Max iterations:  {}", config.agent.max_iterations);
            match config.agent.timeout_ms {
                Some(ms) => println!("   Timeout:         {ms} ms"),
                None => println!("   Timeout:         provider default"),
            }
            println!("   Arena block:     {} bytes", config.arena.block_size);
            match config.memory.max_messages {
                0 => println!("   Memory:          unbounded"),
                n => println!("   Memory:          last {n} messages"),
            }
            Ok(())
        }
        Err(e) => {
            println!("   Config error: {e}");
            Err(e.into())
        }
    }
}

pub fn path() {
    println!("{}", RuntimeConfig::config_dir().join("config.toml").display());
}
