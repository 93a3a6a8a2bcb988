// src/main.rs
mod convert;
mod pdf;
mod pipeline;
mod selector;
mod server;
mod storage;
mod utils;

use clap::{Parser, Subcommand};
use convert::{Converter, ConverterOptions};
use selector::{SectionKeywords, SectionSelector};
use std::net::SocketAddr;
use std::path::PathBuf;
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the DART filing section extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Slice a filing PDF to its core sections and convert it to Markdown
    Extract {
        /// Path to the filing PDF
        path: PathBuf,

        /// Output directory for markdown and metadata
        #[arg(short, long, default_value = "./output")]
        output_dir: String,

        /// Endpoint of the markdown converter service
        #[arg(long, default_value = "http://127.0.0.1:5001/convert")]
        converter_url: String,

        /// Override the target section keywords (comma-separated)
        #[arg(long, value_delimiter = ',')]
        keywords: Option<Vec<String>>,

        /// Override the footnote exclusion marker
        #[arg(long)]
        exclusion: Option<String>,
    },

    /// Run the HTTP analysis service
    Serve {
        /// Address to bind the HTTP server to
        #[arg(short, long, default_value = "0.0.0.0:8000")]
        bind: SocketAddr,

        /// Output directory for markdown and metadata
        #[arg(short, long, default_value = "./output")]
        output_dir: String,

        /// Endpoint of the markdown converter service
        #[arg(long, default_value = "http://127.0.0.1:5001/convert")]
        converter_url: String,
    },
}

fn build_keywords(targets: Option<Vec<String>>, exclusion: Option<String>) -> SectionKeywords {
    let mut keywords = SectionKeywords::default();
    if let Some(targets) = targets {
        keywords.targets = targets;
    }
    if let Some(exclusion) = exclusion {
        keywords.exclusion = exclusion;
    }
    keywords
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting with args: {:?}", args);

    match args.command {
        Command::Extract {
            path,
            output_dir,
            converter_url,
            keywords,
            exclusion,
        } => {
            let selector = SectionSelector::new(build_keywords(keywords, exclusion));
            let converter = Converter::new(converter_url, ConverterOptions::default())?;
            let storage = StorageManager::new(&output_dir)?;

            let analysis =
                pipeline::process_filing(&path, &selector, &converter, &storage).await?;

            if analysis.selected_sections == 0 {
                tracing::info!(
                    "No sections matched; converted the whole document ({} pages)",
                    analysis.extracted_pages
                );
            } else {
                tracing::info!(
                    "Extracted {} sections ({} pages)",
                    analysis.selected_sections,
                    analysis.extracted_pages
                );
            }
            tracing::info!("Markdown written to {}", analysis.md_path.display());
        }

        Command::Serve {
            bind,
            output_dir,
            converter_url,
        } => {
            let state = server::AppState::new(
                SectionSelector::default(),
                Converter::new(converter_url, ConverterOptions::default())?,
                StorageManager::new(&output_dir)?,
            );
            server::serve(bind, state).await?;
        }
    }

    Ok(())
}
