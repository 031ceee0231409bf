//! Query command - ranked suggestions with a generated reply

use anyhow::Result;
use colored::Colorize;

use bd_tour_guide::config::Settings;
use bd_tour_guide::search::rank::rank_scored;
use bd_tour_guide::{extract, QueryRequest, QueryResponse};

use super::{block_on, build_guide, load_store};

pub fn run(settings: &Settings, query: &str, top_k: Option<usize>, json: bool, explain: bool) -> Result<()> {
    if explain {
        return run_explain(settings, query, json);
    }

    let guide = build_guide(settings)?;
    let request = QueryRequest {
        query: query.to_string(),
        top_k,
    };
    let response = block_on(guide.answer(&request))?;
    print_response(&response, json)
}

pub fn print_response(response: &QueryResponse, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    let answer = match response {
        QueryResponse::Success(answer) => answer,
        QueryResponse::Failure(failure) => {
            println!("{} {}", "✗".red().bold(), failure.error);
            return Ok(());
        }
    };

    println!(
        "{} {} suggestions for {} ({})",
        "→".dimmed(),
        answer.count,
        answer.location.cyan(),
        answer.location_type.to_string().dimmed()
    );
    println!();

    for (i, place) in answer.suggestions.iter().enumerate() {
        println!(
            "{}. {} {}",
            (i + 1).to_string().bold(),
            place.name.cyan(),
            format!("({})", place.division).dimmed()
        );
        let description = place.description_text();
        if !description.is_empty() {
            // Truncate for display (char-aware for Unicode)
            let display = if description.chars().count() > 100 {
                format!("{}...", description.chars().take(100).collect::<String>())
            } else {
                description.to_string()
            };
            println!("   {}", display.dimmed());
        }
    }

    println!();
    println!("{}", answer.ai_message);
    Ok(())
}

/// Show intent and scores without calling the generation service.
fn run_explain(settings: &Settings, query: &str, json: bool) -> Result<()> {
    let store = load_store(settings)?;
    let intent = extract(query);
    let scored = rank_scored(store.places(), &intent);

    if json {
        let ranked: Vec<_> = scored
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.place.name,
                    "division": s.place.division,
                    "score": s.score,
                })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "intent": intent,
                "ranked": ranked,
            }))?
        );
        return Ok(());
    }

    println!(
        "{} {} [{}] count={} keywords={}",
        "→".dimmed(),
        intent.location.cyan(),
        intent.location_type,
        intent.requested_count,
        intent.search_keywords.join(", ")
    );
    println!();

    if scored.is_empty() {
        println!("{} No place scored above the relevance threshold", "!".yellow());
        return Ok(());
    }

    for (i, s) in scored.iter().enumerate() {
        let score_str = format!("{:>5.1}", s.score);
        let score_colored = if s.score >= 40.0 {
            score_str.green()
        } else if s.score >= 15.0 {
            score_str.yellow()
        } else {
            score_str.dimmed()
        };
        let marker = if i < intent.requested_count { " " } else { "·" };
        println!(
            "{}{:>3}. [{}] {} ({})",
            marker,
            i + 1,
            score_colored,
            s.place.name,
            s.place.division
        );
    }
    Ok(())
}
