// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (tracing)
// 3. Read the URL list
// 4. Validate every URL through the worker pool
// 5. Print the report (and optionally write it as CSV)
// 6. Exit with proper code (0 = all OK, 1 = some KO, 2 = error)
// =============================================================================

mod cli;

use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use sheet_guardian::checker::{DocumentationExtractor, ValidationOutcome};
use sheet_guardian::config::{DocumentationSignature, RunConfig};
use sheet_guardian::fetch::{BackoffPolicy, FetchClient};
use sheet_guardian::render::{HttpRenderer, RenderBackend};
use sheet_guardian::{input, report, validate_batch};

#[tokio::main]
async fn main() {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let cli = Cli::parse();
    init_logging(&cli);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Priority: RUST_LOG env var > --quiet > -v count > default (info)
fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// Returns:
//   Ok(0) = every page OK
//   Ok(1) = at least one page KO
//   Err = something stopped the whole run
async fn run(cli: Cli) -> Result<i32> {
    debug!(?cli, "CLI arguments parsed");

    match cli.command {
        Commands::Check {
            input: input_path,
            output,
            json,
            no_pdf_check,
            delay_ms,
            concurrency,
            section_classes,
            link_class,
            safety_class,
            technical_class,
        } => {
            let config = RunConfig::new(!no_pdf_check, delay_ms, concurrency)?;

            let mut signature = DocumentationSignature::default();
            if !section_classes.is_empty() {
                signature.section_classes = section_classes;
            }
            if let Some(class) = link_class {
                signature.link_class = class;
            }
            if let Some(class) = safety_class {
                signature.safety_class = class;
            }
            if let Some(class) = technical_class {
                signature.technical_class = class;
            }

            let text = read_input(&input_path)?;
            let urls = input::parse_url_list(&text)
                .with_context(|| format!("failed to parse URL list from {}", input_path))?;

            // Banners go to stderr so --json output on stdout stays parseable
            if urls.is_empty() {
                eprintln!("⚠️  No URLs found in {}", input_path);
                if json {
                    println!("[]");
                }
                return Ok(0);
            }

            eprintln!("🔍 Checking {} product page(s)...\n", urls.len());

            let outcomes = check_urls(&urls, &config, signature).await?;
            let ordered = report::ordered(&urls, &outcomes);

            print!("{}", report::render_stdout(&ordered, json)?);

            if let Some(path) = output {
                std::fs::write(&path, report::to_csv(&ordered)?)
                    .with_context(|| format!("failed to write report to {}", path.display()))?;
                info!(path = %path.display(), "report written");
            }

            let ko_count = ordered.iter().filter(|o| !o.is_ok()).count();
            Ok(if ko_count > 0 { 1 } else { 0 })
        }
    }
}

// Builds the shared collaborators, runs the batch and always shuts the
// render backend down, whether the batch succeeded or not.
async fn check_urls(
    urls: &[String],
    config: &RunConfig,
    signature: DocumentationSignature,
) -> Result<std::collections::HashMap<String, ValidationOutcome>> {
    let extractor = DocumentationExtractor::new(signature)?;
    let fetcher = FetchClient::new(BackoffPolicy::default())?;

    let renderer_fetcher = fetcher.clone();
    let backend = RenderBackend::new(move || Ok(HttpRenderer::new(renderer_fetcher.clone())));

    let total = urls.len();
    let done = AtomicUsize::new(0);
    let progress = |outcome: &ValidationOutcome| {
        let n = done.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            progress = %format!("{}/{}", n, total),
            url = %outcome.url,
            result = outcome.result.as_str(),
            comments = %outcome.comments,
            "checked"
        );
    };

    let result = validate_batch(urls, config, &backend, &fetcher, &extractor, Some(&progress)).await;
    backend.shutdown().await;

    Ok(result?)
}

fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read URLs from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))
    }
}
