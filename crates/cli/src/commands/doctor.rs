//! `parley doctor`: Check configuration.

use parley_config::AppConfig;

pub fn run() -> anyhow::Result<()> {
    println!("Parley Doctor: Configuration Check");
    println!("===================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ok    Config file found at {}", config_path.display());
    } else {
        println!("  info  No config file at {}, using defaults", config_path.display());
    }

    match AppConfig::load() {
        Ok(config) => {
            println!("  ok    Config valid (model: {})", config.model);
            if config.has_api_key() {
                println!("  ok    API key configured");
            } else {
                println!("  warn  No API key: set ANTHROPIC_API_KEY or add api_key to config.toml");
                issues += 1;
            }
            if config.tool_timeout_secs == 0 {
                println!("  info  Tool timeout disabled");
            }
        }
        Err(e) => {
            println!("  fail  Config invalid: {e}");
            issues += 1;
        }
    }

    match parley_tools::default_registry() {
        Ok(registry) => println!("  ok    {} tools registered", registry.len()),
        Err(e) => {
            println!("  fail  Tool registry: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
