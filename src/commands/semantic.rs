//! Semantic command - nearest places from the vector index

use anyhow::Result;
use colored::Colorize;

use bd_tour_guide::config::Settings;
use bd_tour_guide::QueryRequest;

use super::query::print_response;
use super::{block_on, build_guide, open_engine};

/// Answer through the vector index. With `raw`, print neighbours and
/// distances only and skip generation.
pub fn run(settings: &Settings, query: &str, top_k: Option<usize>, json: bool, raw: bool) -> Result<()> {
    if raw {
        return run_raw(settings, query, top_k, json);
    }

    let guide = build_guide(settings)?;
    let request = QueryRequest {
        query: query.to_string(),
        top_k,
    };
    let response = block_on(guide.answer_semantic(&request))?;
    print_response(&response, json)
}

fn run_raw(settings: &Settings, query: &str, top_k: Option<usize>, json: bool) -> Result<()> {
    let engine = open_engine(settings)?;
    let k = top_k.filter(|k| *k > 0).unwrap_or(settings.search.semantic_top_k);
    let hits = block_on(engine.search(query, k))??;

    if json {
        let json_results: Vec<_> = hits
            .iter()
            .map(|h| {
                serde_json::json!({
                    "name": h.place.name,
                    "division": h.place.division,
                    "distance": h.distance,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_results)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("{} No results found for: {}", "→".dimmed(), query.cyan());
        return Ok(());
    }

    println!("{} {} results for: {}", "→".dimmed(), hits.len(), query.cyan());
    println!();
    for (i, hit) in hits.iter().enumerate() {
        println!(
            "{}. [{}] {} ({})",
            (i + 1).to_string().bold(),
            format!("{:.4}", hit.distance).dimmed(),
            hit.place.name.cyan(),
            hit.place.division
        );
    }
    Ok(())
}
