//! `ferroact tools` — list built-in tools and the schema sent to the model.

use std::sync::Arc;

use ferroact_agent::{Session, ToolRegistry};

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open()?;
    let schema = describe(&session)?;
    session.close()?;

    println!("{schema}");
    Ok(())
}

/// Register the default tools and render their function array.
fn describe(session: &Arc<Session>) -> ferroact_core::Result<String> {
    let registry = ToolRegistry::create(session)?;
    registry.add_all(ferroact_tools::default_tools())?;

    for name in registry.names() {
        if let Some(tool) = registry.find(&name) {
            tracing::info!(tool = %tool.name, "{}", tool.description);
        }
    }

    let functions = registry.schema().unwrap_or_else(|| "[]".into());
    let pretty = serde_json::from_str::<serde_json::Value>(&functions)
        .and_then(|v| serde_json::to_string_pretty(&v))
        .unwrap_or(functions);
    Ok(pretty)
}
