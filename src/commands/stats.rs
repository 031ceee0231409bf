//! Stats command - dataset overview

use anyhow::Result;
use colored::*;

use bd_tour_guide::config::Settings;
use bd_tour_guide::DatasetStats;

use super::load_store;

pub fn run(settings: &Settings, json: bool) -> Result<()> {
    let store = load_store(settings)?;
    let stats = DatasetStats::collect(store.places());

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("{}", "Dataset Status".bold());
    println!();
    println!(
        "  {} {} places",
        "→".dimmed(),
        stats.total_places.to_string().cyan()
    );
    println!(
        "  {} {} with description, {} with image",
        "→".dimmed(),
        stats.places_with_descriptions,
        stats.places_with_images
    );

    print_distribution("By division", &stats.by_division);
    print_distribution("By category", &stats.by_category);
    Ok(())
}

fn print_distribution(title: &str, counts: &std::collections::BTreeMap<String, usize>) {
    println!();
    println!("{}", title.bold());

    let mut rows: Vec<_> = counts.iter().collect();
    rows.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let width = rows.iter().map(|(k, _)| k.len()).max().unwrap_or(0);
    for (label, count) in rows {
        println!("  {:<width$}  {}", label, count.to_string().cyan(), width = width);
    }
}
