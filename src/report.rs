// src/report.rs
// =============================================================================
// Turns the outcome map into something a person (or a spreadsheet) can read.
//
// - ordered(): puts outcomes back in input order (the pool finishes them in
//   whatever order the network allows)
// - to_json(): pretty JSON array
// - to_csv(): url,result,comments with standard CSV quoting
// - format_table(): fixed-width terminal table plus a summary
// - render_stdout(): picks JSON or the table for the terminal
// =============================================================================

use std::collections::HashMap;

use anyhow::Result;
use csv::WriterBuilder;

use crate::checker::{ValidationOutcome, Verdict};

/// Outcomes in the order of `urls`. URLs without an outcome are skipped.
pub fn ordered<'a>(
    urls: &[String],
    results: &'a HashMap<String, ValidationOutcome>,
) -> Vec<&'a ValidationOutcome> {
    urls.iter().filter_map(|url| results.get(url)).collect()
}

pub fn to_json(outcomes: &[&ValidationOutcome]) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}

/// Everything the CLI prints on stdout: the JSON array alone in `json`
/// mode, the table otherwise.
pub fn render_stdout(outcomes: &[&ValidationOutcome], json: bool) -> Result<String> {
    if json {
        Ok(format!("{}\n", to_json(outcomes)?))
    } else {
        Ok(format_table(outcomes))
    }
}

/// The report as CSV with a `url,result,comments` header.
pub fn to_csv(outcomes: &[&ValidationOutcome]) -> Result<String> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());

    writer.write_record(["url", "result", "comments"])?;
    for outcome in outcomes {
        writer.serialize(outcome)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

pub fn format_table(outcomes: &[&ValidationOutcome]) -> String {
    let mut out = String::new();

    out.push_str(&format!("{:<60} {:<8} {}\n", "URL", "RESULT", "COMMENTS"));
    out.push_str(&format!("{}\n", "=".repeat(100)));

    for outcome in outcomes {
        // Truncate URL if too long for display
        let url_display = if outcome.url.chars().count() > 57 {
            let head: String = outcome.url.chars().take(57).collect();
            format!("{}...", head)
        } else {
            outcome.url.clone()
        };

        out.push_str(&format!(
            "{:<60} {:<8} {}\n",
            url_display,
            format_verdict(outcome.result),
            outcome.comments
        ));
    }

    let ok_count = outcomes.iter().filter(|o| o.is_ok()).count();
    let ko_count = outcomes.len() - ok_count;

    out.push('\n');
    out.push_str("📊 Summary:\n");
    out.push_str(&format!("   ✅ OK: {}\n", ok_count));
    out.push_str(&format!("   ❌ KO: {}\n", ko_count));
    out.push_str(&format!("   📋 Total: {}\n", outcomes.len()));
    out
}

fn format_verdict(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Ok => "✅ OK",
        Verdict::Ko => "❌ KO",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<String>, HashMap<String, ValidationOutcome>) {
        let urls = vec!["https://a.example/2".to_string(), "https://a.example/1".to_string()];
        let mut results = HashMap::new();
        results.insert(urls[1].clone(), ValidationOutcome::ok(&urls[1]));
        results.insert(
            urls[0].clone(),
            ValidationOutcome::ko(&urls[0], "safety sheet missing ; technical sheet missing"),
        );
        (urls, results)
    }

    #[test]
    fn test_ordered_follows_input() {
        let (urls, results) = sample();
        let outcomes = ordered(&urls, &results);
        assert_eq!(outcomes[0].url, "https://a.example/2");
        assert_eq!(outcomes[1].url, "https://a.example/1");
    }

    #[test]
    fn test_csv_quotes_when_needed() {
        let outcome = ValidationOutcome::ko("https://a.example/?a=1,2", "redirected to \"x\"");
        let csv = to_csv(&[&outcome]).unwrap();
        assert_eq!(
            csv,
            "url,result,comments\n\"https://a.example/?a=1,2\",KO,\"redirected to \"\"x\"\"\"\n"
        );
    }

    #[test]
    fn test_csv_header_written_for_empty_report() {
        assert_eq!(to_csv(&[]).unwrap(), "url,result,comments\n");
    }

    #[test]
    fn test_json_round_trip_fields() {
        let (urls, results) = sample();
        let json = to_json(&ordered(&urls, &results)).unwrap();
        let parsed: Vec<ValidationOutcome> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].result, Verdict::Ok);
    }

    #[test]
    fn test_json_stdout_is_only_json() {
        let (urls, results) = sample();
        let stdout = render_stdout(&ordered(&urls, &results), true).unwrap();
        let parsed: Vec<ValidationOutcome> = serde_json::from_str(&stdout).unwrap();
        assert_eq!(parsed.len(), 2);
        assert!(!stdout.contains("Summary"));
    }

    #[test]
    fn test_table_summary_counts() {
        let (urls, results) = sample();
        let table = format_table(&ordered(&urls, &results));
        assert!(table.contains("OK: 1"));
        assert!(table.contains("KO: 1"));
        assert!(table.contains("Total: 2"));
    }
}
