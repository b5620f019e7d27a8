//! `scopehound tools` — show the tool fleet and budgets.

use std::time::Duration;

use scopehound_tools::default_registry;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let registry = default_registry(Duration::from_secs(30));

    println!("Available tools (per-request budgets):\n");
    for tool in registry.available_tools() {
        println!("  {:<16} {} calls  — {}", tool.name.to_string(), tool.max_calls, tool.description);
    }

    Ok(())
}
