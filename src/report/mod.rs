// SPDX-License-Identifier: PMPL-1.0-or-later
//! Report generation for audit findings.
//!
//! Supports multiple output formats:
//! - Text: one `section: status — details` line per finding
//! - Markdown: bold section names and code-formatted statuses
//! - JSON: structured findings for programmatic consumption

use crate::finding::{FindingSet, FindingStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// Markdown lines
    Markdown,
    /// Structured JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Findings of one audit together with what was audited
#[derive(Debug, Clone, Serialize)]
pub struct AuditReport {
    pub url: String,
    pub generated_at: DateTime<Utc>,
    pub findings: FindingSet,
}

impl AuditReport {
    pub fn new(url: &str, findings: FindingSet) -> Self {
        Self {
            url: url.to_string(),
            generated_at: Utc::now(),
            findings,
        }
    }
}

/// Generate a report from findings
pub fn generate_report(report: &AuditReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => generate_text_report(report),
        OutputFormat::Markdown => generate_markdown_report(report),
        OutputFormat::Json => generate_json_report(report),
    }
}

/// Generate human-readable text report
fn generate_text_report(report: &AuditReport) -> String {
    let mut output = String::new();

    output.push_str("=== crobot CRO Audit Report ===\n");
    output.push_str(&format!("Page: {}\n\n", report.url));

    for finding in &report.findings {
        output.push_str(&format!("{}\n", finding));
    }

    let findings = &report.findings;
    if findings.is_failure() {
        output.push_str("\nRESULT: AUDIT FAILED\n");
    } else {
        let found = findings.by_status(FindingStatus::Found).len();
        let missing = findings.by_status(FindingStatus::Missing).len();
        output.push_str(&format!(
            "\nRESULT: {} of {} checklist items found, {} missing\n",
            found,
            found + missing,
            missing
        ));
    }

    output
}

/// Generate markdown report
fn generate_markdown_report(report: &AuditReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("## CRO audit: {}\n\n", report.url));
    for finding in &report.findings {
        output.push_str(&format!(
            "- **{}**: `{}` — {}\n",
            finding.section, finding.status, finding.details
        ));
    }

    output
}

/// Generate JSON report
fn generate_json_report(report: &AuditReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| {
        format!("{{\"error\": \"Failed to serialize findings: {}\"}}", e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Finding;

    fn sample_report() -> AuditReport {
        AuditReport::new(
            "https://shop.example/p/1",
            FindingSet::from(vec![
                Finding::found("product_title", "Tag: h1 found"),
                Finding::missing("buy_now_button"),
                Finding::insights("Missing/Weak: Emphasize benefits, not just features"),
            ]),
        )
    }

    #[test]
    fn test_text_report_lines() {
        let report = generate_report(&sample_report(), OutputFormat::Text);
        assert!(report.contains("product_title: Found — Tag: h1 found\n"));
        assert!(report.contains("buy_now_button: Missing — Not found\n"));
        assert!(report.contains("1 of 2 checklist items found, 1 missing"));
    }

    #[test]
    fn test_text_report_failure() {
        let report = AuditReport::new(
            "https://down.example",
            FindingSet::from(vec![Finding::failed("connection refused")]),
        );
        let text = generate_report(&report, OutputFormat::Text);
        assert!(text.contains("Error: Failed — connection refused"));
        assert!(text.contains("AUDIT FAILED"));
    }

    #[test]
    fn test_markdown_report() {
        let report = generate_report(&sample_report(), OutputFormat::Markdown);
        assert!(report.contains("- **product_title**: `Found` — Tag: h1 found"));
        assert!(report.contains("- **ML_Suggestions**: `Insights` — Missing/Weak:"));
    }

    #[test]
    fn test_json_report() {
        let report = generate_report(&sample_report(), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&report).expect("valid JSON");
        assert_eq!(parsed["url"], "https://shop.example/p/1");
        assert!(parsed["generated_at"].is_string());
        assert_eq!(parsed["findings"].as_array().map(|a| a.len()), Some(3));
        assert_eq!(parsed["findings"][1]["status"], "Missing");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("sarif".parse::<OutputFormat>().is_err());
    }
}
