mod commands;
#[cfg(feature = "mcp")]
mod mcp;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tourguide")]
#[command(about = "Bangladesh tour guide: place suggestions with AI replies", long_about = None)]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "Directory containing tourguide.toml (default: current directory)")]
    config_dir: Option<PathBuf>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "More log output (-v info, -vv debug)")]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest places for a travel question
    Query {
        query: String,
        #[arg(long, short = 'k', help = "Number of places (overrides the count in the query)")]
        top_k: Option<usize>,
        #[arg(long, help = "Show intent and relevance scores, no AI reply")]
        explain: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Answer from the vector index
    #[command(alias = "ss")]
    Semantic {
        query: String,
        #[arg(long, short = 'k', help = "Number of nearest places")]
        top_k: Option<usize>,
        #[arg(long, help = "Print neighbours and distances only, no AI reply")]
        raw: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Show how a query is understood
    Intent {
        query: String,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Build the vector index
    Index {
        #[arg(long, help = "Show index status only")]
        status: bool,
        #[arg(long, help = "Use the offline local embedder instead of Gemini")]
        local: bool,
        #[arg(long, help = "JSON output")]
        json: bool,
    },
    /// Dataset statistics
    Stats {
        #[arg(long, help = "JSON output")]
        json: bool,
    },

    // ===== MCP Server =====
    /// Start MCP server on stdio
    #[cfg(feature = "mcp")]
    Mcp {
        #[arg(long, help = "Show client configuration instructions")]
        install: bool,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_dir = cli.config_dir.as_deref();

    match cli.command {
        Commands::Intent { query, json } => commands::intent::run(&query, json),
        Commands::Query {
            query,
            top_k,
            explain,
            json,
        } => {
            let settings = commands::load_settings(config_dir)?;
            commands::query::run(&settings, &query, top_k, json, explain)
        }
        Commands::Semantic {
            query,
            top_k,
            raw,
            json,
        } => {
            let settings = commands::load_settings(config_dir)?;
            commands::semantic::run(&settings, &query, top_k, json, raw)
        }
        Commands::Index {
            status,
            local,
            json,
        } => {
            let settings = commands::load_settings(config_dir)?;
            commands::index::run(&settings, status, local, json)
        }
        Commands::Stats { json } => {
            let settings = commands::load_settings(config_dir)?;
            commands::stats::run(&settings, json)
        }

        // MCP Server
        #[cfg(feature = "mcp")]
        Commands::Mcp { install } => {
            if install {
                print_mcp_install_instructions();
                Ok(())
            } else {
                let settings = commands::load_settings(config_dir)?;
                run_mcp_server(&settings)
            }
        }
    }
}

#[cfg(feature = "mcp")]
fn run_mcp_server(settings: &bd_tour_guide::Settings) -> anyhow::Result<()> {
    let guide = commands::build_guide(settings)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(mcp::run_mcp_server(guide))
}

#[cfg(feature = "mcp")]
fn print_mcp_install_instructions() {
    use colored::Colorize;

    let work_dir = std::env::current_dir()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "/path/to/tour-guide".to_string());

    let binary_path = std::env::current_exe()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "tourguide".to_string());

    println!("{}", "MCP Server Installation Guide".bold().cyan());
    println!();
    println!("Add the following to your MCP client configuration:");
    println!();
    println!(r#"{{
  "mcpServers": {{
    "bd-tour-guide": {{
      "command": "{}",
      "args": ["mcp"],
      "cwd": "{}",
      "env": {{ "GEMINI_API_KEY": "<your key>" }}
    }}
  }}
}}"#, binary_path, work_dir);
    println!();
    println!("{}", "Available tools:".bold());
    println!("  • {} - Ranked place suggestions with a tour guide reply", "tour_query".green());
    println!("  • {} - Nearest places from the vector index", "tour_semantic_search".green());
    println!("  • {} - How a query is understood", "tour_intent".green());
    println!("  • {} - Dataset statistics", "tour_stats".green());
}
