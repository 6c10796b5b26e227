// src/input.rs
// =============================================================================
// Reads the list of product URLs to check.
//
// Accepted input is a plain list or a CSV where the URL is the first column:
//
//   url,sku
//   https://shop.example/products/a,A-1
//   "https://shop.example/products/b?size=1,5",B-2
//   # comments and blank lines are skipped
//
// Parsing goes through the csv crate, so quoted fields may contain commas.
// A report written with --output reads back in as a URL list.
//
// URLs are deduplicated (case-sensitive), keeping the first occurrence, so
// the order of the report matches the order of the file.
// =============================================================================

use std::collections::HashSet;

use csv::{ReaderBuilder, Trim};

/// Extracts the distinct URLs from `text`, in order.
pub fn parse_url_list(text: &str) -> Result<Vec<String>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for record in reader.records() {
        let record = record?;
        let cell = record.get(0).unwrap_or("").trim();

        // Indented comments are not caught by the reader itself.
        if cell.is_empty() || cell.starts_with('#') || cell.eq_ignore_ascii_case("url") {
            continue;
        }

        if seen.insert(cell.to_string()) {
            urls.push(cell.to_string());
        }
    }

    Ok(urls)
}
