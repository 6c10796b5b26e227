// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use sheet_guardian::config::{DEFAULT_CONCURRENCY, DEFAULT_DELAY_MS};

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "sheet-guardian",
    version,
    about = "Checks that product pages link their safety and technical data sheets",
    long_about = "sheet-guardian loads every product page in a list, finds the documentation \
                  section and checks that both the safety data sheet and the technical data \
                  sheet are linked (and, by default, that both links really serve a PDF)."
)]
pub struct Cli {
    /// More logging (-v = debug, -vv = trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every product URL in a list
    ///
    /// Example: sheet-guardian check products.csv --output report.csv
    Check {
        /// File with one URL per line, or a CSV with URLs in the first column.
        /// Use "-" to read from stdin.
        input: String,

        /// Also write the report as CSV to this file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        /// Only require the sheet links to be present; don't probe them
        #[arg(long)]
        no_pdf_check: bool,

        /// Pause before every HTTP request, in milliseconds
        #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
        delay_ms: u64,

        /// How many pages to check at the same time
        #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
        concurrency: usize,

        /// Class that marks the documentation section (repeat for several;
        /// the element must carry all of them)
        #[arg(long = "section-class")]
        section_classes: Vec<String>,

        /// Class shared by both sheet links
        #[arg(long)]
        link_class: Option<String>,

        /// Class that marks the safety sheet link
        #[arg(long)]
        safety_class: Option<String>,

        /// Class that marks the technical sheet link
        #[arg(long)]
        technical_class: Option<String>,
    },
}
