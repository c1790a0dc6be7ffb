// SPDX-License-Identifier: PMPL-1.0-or-later
//! Semantic gap analysis.
//!
//! Compares the page text against short descriptions of content a
//! high-converting page should carry and lists the ones with little lexical
//! overlap. This is a bag-of-words heuristic, not a trained model: the vector
//! space is rebuilt from scratch for every page.

pub mod tfidf;

use crate::analyzers::Analyzer;
use crate::document::Document;
use crate::finding::Finding;
use tfidf::VectorSpace;
use tracing::debug;

/// Similarity below which an ideal section is reported
pub const DEFAULT_THRESHOLD: f64 = 0.2;

/// Separator between individual gap messages
pub const GAP_SEPARATOR: &str = "; ";

/// Descriptions of content a converting product page is expected to contain
pub fn default_ideal_sections() -> Vec<String> {
    [
        "Highlight limited-time offers",
        "Include trust badges (authentic, money-back, etc.)",
        "Ensure mobile-optimized image carousels",
        "Display social proof and high-quality reviews",
        "Emphasize benefits, not just features",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Flags ideal sections weakly represented in the page text
#[derive(Debug, Clone)]
pub struct SemanticAnalyzer {
    ideal_sections: Vec<String>,
    threshold: f64,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new(default_ideal_sections(), DEFAULT_THRESHOLD)
    }
}

impl SemanticAnalyzer {
    pub fn new(ideal_sections: Vec<String>, threshold: f64) -> Self {
        Self {
            ideal_sections,
            threshold,
        }
    }

    /// Cosine similarity of the page text to each ideal section, in order
    pub fn similarities(&self, page_text: &str) -> Vec<f64> {
        let mut corpus = Vec::with_capacity(self.ideal_sections.len() + 1);
        corpus.push(page_text);
        corpus.extend(self.ideal_sections.iter().map(String::as_str));

        let space = VectorSpace::fit(&corpus);
        (1..space.len()).map(|i| space.similarity(0, i)).collect()
    }

    /// Joined gap messages for the given similarity scores
    pub fn gaps(&self, scores: &[f64]) -> String {
        self.ideal_sections
            .iter()
            .zip(scores)
            .filter(|(_, score)| **score < self.threshold)
            .map(|(section, _)| format!("Missing/Weak: {}", section))
            .collect::<Vec<_>>()
            .join(GAP_SEPARATOR)
    }

    /// Summarise the gaps of a page as the single suggestions finding
    pub fn analyze_text(&self, page_text: &str) -> Finding {
        let scores = self.similarities(page_text);
        for (section, score) in self.ideal_sections.iter().zip(&scores) {
            debug!("similarity {:.4} to '{}'", score, section);
        }
        Finding::insights(self.gaps(&scores))
    }
}

impl Analyzer for SemanticAnalyzer {
    fn name(&self) -> &str {
        "Semantic Gap Analyzer"
    }

    fn description(&self) -> &str {
        "Compares page text with ideal content descriptions via TF-IDF similarity"
    }

    fn analyze(&self, document: &Document) -> Vec<Finding> {
        vec![self.analyze_text(document.text())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::FindingStatus;

    #[test]
    fn test_concatenated_ideals_have_no_gaps() {
        let analyzer = SemanticAnalyzer::default();
        let page = default_ideal_sections().join(" ");
        let finding = analyzer.analyze_text(&page);
        assert_eq!(finding.section, "ML_Suggestions");
        assert_eq!(finding.status, FindingStatus::Insights);
        assert_eq!(finding.details, "");
    }

    #[test]
    fn test_empty_text_flags_every_section() {
        let analyzer = SemanticAnalyzer::default();
        let finding = analyzer.analyze_text("");
        let expected = default_ideal_sections()
            .iter()
            .map(|s| format!("Missing/Weak: {}", s))
            .collect::<Vec<_>>()
            .join("; ");
        assert_eq!(finding.details, expected);
        assert_eq!(finding.details.matches("Missing/Weak:").count(), 5);
    }

    #[test]
    fn test_threshold_is_strict() {
        let analyzer = SemanticAnalyzer::new(vec!["at".to_string(), "below".to_string()], 0.2);
        assert_eq!(analyzer.gaps(&[0.2, 0.199999]), "Missing/Weak: below");
    }

    #[test]
    fn test_partial_overlap() {
        let analyzer = SemanticAnalyzer::default();
        let scores = analyzer
            .similarities("Shop our limited-time offers and read high-quality reviews from customers");
        assert!(scores[0] >= 0.2);
        assert!(scores[3] >= 0.2);
        assert_eq!(scores[1], 0.0);

        let details = analyzer.analyze_text(
            "Shop our limited-time offers and read high-quality reviews from customers",
        ).details;
        assert!(!details.contains("limited-time"));
        assert!(details.contains("Missing/Weak: Include trust badges"));
        assert_eq!(details.split("; ").count(), 3);
    }

    #[test]
    fn test_custom_threshold() {
        let analyzer = SemanticAnalyzer::new(default_ideal_sections(), 0.0);
        assert_eq!(analyzer.analyze_text("").details, "");
    }

    #[test]
    fn test_similarities_one_per_section() {
        let analyzer = SemanticAnalyzer::default();
        assert_eq!(analyzer.similarities("anything").len(), 5);
    }
}
