//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including status counts, external hosts, and failures.

use crate::output::summary::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Lists longer than this are truncated in the report
const LIST_LIMIT: usize = 50;

/// Generates a markdown summary from crawl statistics
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    md.push_str("# Sitewalk Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", summary.seed));
    if let Some(run_id) = summary.run_id {
        md.push_str(&format!("- **Run ID**: {}\n", run_id));
    }
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!(
        "- **robots.txt**: {}\n",
        if summary.robots_found {
            "found"
        } else {
            "unavailable (all paths allowed)"
        }
    ));
    md.push_str(&format!(
        "- **Request Interval**: {} ms\n",
        summary.request_interval_ms
    ));
    if !summary.config_hash.is_empty() {
        md.push_str(&format!("- **Config Hash**: {}\n", summary.config_hash));
    }
    md.push('\n');

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **URLs Catalogued**: {}\n", summary.total_urls));
    md.push_str(&format!("- **Link Edges**: {}\n", summary.total_links));
    md.push_str(&format!("- **Pages Fetched**: {}\n", summary.pages_fetched));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        summary.success_rate()
    ));

    // Status breakdown
    md.push_str("## URL Status Breakdown\n\n");
    md.push_str("| Status | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Visited | {} |\n", summary.urls_visited));
    md.push_str(&format!("| Unreachable | {} |\n", summary.urls_unreachable));
    md.push_str(&format!(
        "| Excluded by robots.txt | {} |\n",
        summary.urls_excluded
    ));
    md.push_str(&format!("| External | {} |\n", summary.urls_external));
    md.push_str(&format!("| Malformed | {} |\n", summary.urls_malformed));
    if summary.urls_pending > 0 {
        md.push_str(&format!("| Pending | {} |\n", summary.urls_pending));
    }
    md.push('\n');

    if !summary.external_hosts.is_empty() {
        md.push_str("## External Hosts\n\n");
        md.push_str("| Host | References |\n");
        md.push_str("|------|------------|\n");
        for (host, count) in summary.external_hosts.iter().take(LIST_LIMIT) {
            md.push_str(&format!("| {} | {} |\n", host, count));
        }
        push_overflow(&mut md, summary.external_hosts.len());
    }

    if !summary.unreachable.is_empty() {
        md.push_str("## Unreachable Pages\n\n");
        md.push_str("| URL | Reason |\n");
        md.push_str("|-----|--------|\n");
        for (url, reason) in summary.unreachable.iter().take(LIST_LIMIT) {
            md.push_str(&format!("| {} | {} |\n", url, reason));
        }
        push_overflow(&mut md, summary.unreachable.len());
    }

    if !summary.excluded.is_empty() {
        md.push_str("## Excluded by robots.txt\n\n");
        for url in summary.excluded.iter().take(LIST_LIMIT) {
            md.push_str(&format!("- {}\n", url));
        }
        push_overflow(&mut md, summary.excluded.len());
    }

    if !summary.malformed.is_empty() {
        md.push_str("## Malformed Links\n\n");
        for raw in summary.malformed.iter().take(LIST_LIMIT) {
            md.push_str(&format!("- `{}`\n", raw.replace('`', "'")));
        }
        push_overflow(&mut md, summary.malformed.len());
    }

    md
}

fn push_overflow(md: &mut String, total: usize) {
    if total > LIST_LIMIT {
        md.push_str(&format!("\n... and {} more\n\n", total - LIST_LIMIT));
    } else {
        md.push('\n');
    }
}
