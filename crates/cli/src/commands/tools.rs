//! `genui tools`: List the built-in tools.

use genui_config::AppConfig;

pub async fn run(schemas: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let registry = genui_tools::default_registry(&config)?;

    println!("{} tools registered", registry.len());
    println!();
    for def in registry.definitions() {
        println!("  {:<18} {}", def.name, def.description);
        if schemas {
            let schema = serde_json::to_string_pretty(&def.parameters)?;
            for line in schema.lines() {
                println!("      {line}");
            }
            println!();
        }
    }

    Ok(())
}
