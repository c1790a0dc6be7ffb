// SPDX-License-Identifier: PMPL-1.0-or-later
//! Findings produced by an audit.
//!
//! A finding is a plain value: which checklist section it describes, whether
//! the section was detected, and a short piece of evidence. An audit yields
//! one ordered [`FindingSet`] and nothing else.

use serde::{Deserialize, Serialize};

/// Section label used for the single finding of a failed fetch.
pub const ERROR_SECTION: &str = "Error";

/// Section label used for the semantic gap summary.
pub const SUGGESTIONS_SECTION: &str = "ML_Suggestions";

/// Details recorded when a rule matched nothing.
pub const NOT_FOUND: &str = "Not found";

/// Outcome of one checklist item or semantic check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingStatus {
    /// The element was detected on the page
    Found,
    /// The element was not detected
    Missing,
    /// The page could not be acquired
    Failed,
    /// Semantic suggestions
    Insights,
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingStatus::Found => write!(f, "Found"),
            FindingStatus::Missing => write!(f, "Missing"),
            FindingStatus::Failed => write!(f, "Failed"),
            FindingStatus::Insights => write!(f, "Insights"),
        }
    }
}

/// A single audit result line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule name, or one of the synthetic sections
    pub section: String,
    /// Detection outcome
    pub status: FindingStatus,
    /// Evidence or message
    pub details: String,
}

impl Finding {
    /// Create a new finding
    pub fn new(section: &str, status: FindingStatus, details: impl Into<String>) -> Self {
        Self {
            section: section.to_string(),
            status,
            details: details.into(),
        }
    }

    /// The default outcome for a rule that matched nothing
    pub fn missing(section: &str) -> Self {
        Self::new(section, FindingStatus::Missing, NOT_FOUND)
    }

    /// A detected element with its evidence
    pub fn found(section: &str, details: impl Into<String>) -> Self {
        Self::new(section, FindingStatus::Found, details)
    }

    /// The terminal finding for a page that could not be fetched
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new(ERROR_SECTION, FindingStatus::Failed, message)
    }

    /// The semantic gap summary
    pub fn insights(details: impl Into<String>) -> Self {
        Self::new(SUGGESTIONS_SECTION, FindingStatus::Insights, details)
    }

    /// Whether the element was detected
    pub fn is_found(&self) -> bool {
        self.status == FindingStatus::Found
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} — {}", self.section, self.status, self.details)
    }
}

/// Ordered findings of one audit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FindingSet {
    /// All findings, in checklist order
    pub findings: Vec<Finding>,
}

impl FindingSet {
    /// Create empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a finding
    pub fn add(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Extend with findings from an iterator
    pub fn extend(&mut self, findings: impl IntoIterator<Item = Finding>) {
        self.findings.extend(findings);
    }

    /// Get findings by status
    pub fn by_status(&self, status: FindingStatus) -> Vec<&Finding> {
        self.findings.iter().filter(|f| f.status == status).collect()
    }

    /// Look up the finding for a section
    pub fn section(&self, name: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.section == name)
    }

    /// Whether the audit stopped on a fetch failure
    pub fn is_failure(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.status == FindingStatus::Failed)
    }

    /// Total count
    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Is empty
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    /// Iterate in checklist order
    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.findings.iter()
    }
}

impl From<Vec<Finding>> for FindingSet {
    fn from(findings: Vec<Finding>) -> Self {
        Self { findings }
    }
}

impl<'a> IntoIterator for &'a FindingSet {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}
