//! Actions command - list the built-in actions.

use anyhow::Result;

/// Run the actions command.
pub fn run() -> Result<()> {
    let registry = prep_actions::standard_registry();

    println!("Built-in Actions");
    println!("================");
    println!();
    println!("{:<24} {:<16} {:<28} DESCRIPTION", "NAME", "CATEGORY", "SCOPES");
    println!("{:<24} {:<16} {:<28} -----------", "----", "--------", "------");

    for info in registry.infos() {
        let scopes: Vec<_> = info.scopes.iter().map(|s| s.as_str()).collect();
        println!(
            "{:<24} {:<16} {:<28} {}",
            info.name,
            info.category.as_str(),
            scopes.join(", "),
            info.description
        );
    }

    println!();
    println!("{} actions", registry.len());
    Ok(())
}
