//! Intent command - show how a query is understood

use anyhow::Result;
use colored::Colorize;

use bd_tour_guide::extract;

pub fn run(query: &str, json: bool) -> Result<()> {
    let intent = extract(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&intent)?);
        return Ok(());
    }

    println!("{}", "Query Intent".bold());
    println!();
    println!("  {} Location: {}", "→".dimmed(), intent.location.cyan());
    println!("  {} Type: {}", "→".dimmed(), intent.location_type);
    println!("  {} Count: {}", "→".dimmed(), intent.requested_count);
    println!(
        "  {} Keywords: {}",
        "→".dimmed(),
        intent.search_keywords.join(", ")
    );
    Ok(())
}
