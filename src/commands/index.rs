//! Index command - build the vector index over described places

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use bd_tour_guide::config::Settings;
use bd_tour_guide::search::engine::build_index;
use bd_tour_guide::search::vectordb::FlatIndex;

use super::{block_on, embedding_provider, load_store};

/// Run index command
pub fn run(settings: &Settings, status_only: bool, local: bool, json: bool) -> Result<()> {
    let index_path = &settings.data.index_path;

    if status_only {
        return show_status(index_path, json);
    }

    // Create data directory if needed
    if let Some(parent) = index_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let store = load_store(settings)?;
    let provider = embedding_provider(settings, local)?;

    if !json {
        println!(
            "{} Embedding {} places with {}...",
            "→".dimmed(),
            store.len(),
            provider.model_name().cyan()
        );
    }

    let stats = block_on(build_index(
        store.places(),
        provider.as_ref(),
        settings.search.embed_batch_size,
        index_path,
    ))??;

    if json {
        println!(
            "{}",
            serde_json::json!({
                "indexed": stats.indexed,
                "skipped": stats.skipped,
                "batches": stats.batches,
                "dimension": stats.dimension,
                "duration_ms": stats.duration_ms,
                "path": index_path.display().to_string(),
            })
        );
    } else {
        println!();
        println!(
            "{} Indexed {} places in {:.2}s",
            "✓".green().bold(),
            stats.indexed.to_string().cyan(),
            stats.duration_ms as f64 / 1000.0
        );
        if stats.skipped > 0 {
            println!(
                "  {} {} places skipped (no description)",
                "→".dimmed(),
                stats.skipped
            );
        }
        println!("  {} Dimension: {}", "→".dimmed(), stats.dimension);
        println!(
            "  {} Index saved to: {}",
            "→".dimmed(),
            index_path.display()
        );
    }

    Ok(())
}

/// Show index status
fn show_status(index_path: &Path, json: bool) -> Result<()> {
    if !index_path.exists() {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "exists": false,
                    "error": "Index not found"
                })
            );
        } else {
            println!(
                "{} Index not found. Run {} first.",
                "!".yellow().bold(),
                "tourguide index".cyan()
            );
        }
        return Ok(());
    }

    let meta = FlatIndex::open(index_path)?.meta();
    let file_size = std::fs::metadata(index_path)
        .map(|m| m.len())
        .unwrap_or(0);

    if json {
        println!(
            "{}",
            serde_json::json!({
                "exists": true,
                "entry_count": meta.entry_count,
                "dimension": meta.dimension,
                "embedding_model": meta.embedding_model,
                "built_at": meta.built_at,
                "file_size_bytes": file_size,
            })
        );
    } else {
        println!("{}", "Index Status".bold());
        println!();
        println!(
            "  {} {} places indexed",
            "→".dimmed(),
            meta.entry_count.to_string().cyan()
        );
        println!(
            "  {} {} dimensions ({})",
            "→".dimmed(),
            meta.dimension,
            meta.embedding_model
        );
        println!(
            "  {} Size: {:.2} KB",
            "→".dimmed(),
            file_size as f64 / 1024.0
        );
        if let Some(built_at) = meta.built_at {
            println!("  {} Built: {}", "→".dimmed(), built_at);
        }
    }

    Ok(())
}
