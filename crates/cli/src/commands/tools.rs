//! `parley tools`: List the tools the model can call.

pub fn run() -> anyhow::Result<()> {
    let registry = parley_tools::default_registry()?;

    println!("Available tools ({}):", registry.len());
    println!();
    for spec in registry.specs() {
        let first_line = spec.description.lines().next().unwrap_or_default();
        println!("  {:<12} {}", spec.name, first_line);
        for field in &spec.fields {
            let required = if field.required { "required" } else { "optional" };
            println!("      {} ({required}): {}", field.name, field.description);
        }
    }

    Ok(())
}
