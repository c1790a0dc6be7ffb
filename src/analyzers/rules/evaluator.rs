// SPDX-License-Identifier: PMPL-1.0-or-later
//! Structural rule evaluation.
//!
//! Produces exactly one finding per catalog entry, in catalog order. Within a
//! rule the first match wins; a rule that matches nothing yields the
//! `Missing` / "Not found" default. Absence is never an error.

use super::{CompiledRule, RuleCatalog, RuleKind};
use crate::analyzers::Analyzer;
use crate::document::Document;
use crate::finding::Finding;
use tracing::debug;

/// Maximum characters of matched page text quoted in a finding
pub const EXCERPT_CHARS: usize = 30;

/// Applies a rule catalog to a document
#[derive(Debug, Clone)]
pub struct RuleEvaluator {
    catalog: RuleCatalog,
}

impl RuleEvaluator {
    pub fn new(catalog: RuleCatalog) -> Self {
        Self { catalog }
    }

    /// The rules this evaluator runs
    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Evaluate every rule against the document
    pub fn evaluate(&self, document: &Document) -> Vec<Finding> {
        self.catalog
            .rules()
            .iter()
            .map(|rule| evaluate_rule(document, rule))
            .collect()
    }
}

impl Analyzer for RuleEvaluator {
    fn name(&self) -> &str {
        "Rule Evaluator"
    }

    fn description(&self) -> &str {
        "Checks the page for each expected landing-page element"
    }

    fn analyze(&self, document: &Document) -> Vec<Finding> {
        self.evaluate(document)
    }
}

/// Evaluate a single rule
pub fn evaluate_rule(document: &Document, rule: &CompiledRule) -> Finding {
    let name = rule.spec.name.as_str();
    let finding = match &rule.spec.kind {
        RuleKind::TagPresence { tags } => tags
            .iter()
            .find(|tag| document.has_tag(tag))
            .map(|tag| Finding::found(name, format!("Tag: {} found", tag))),

        RuleKind::RegexMatch { .. } => rule
            .regexes
            .first()
            .filter(|re| re.is_match(document.text()))
            .map(|_| Finding::found(name, "Pattern matched")),

        RuleKind::ButtonText { phrases } => {
            let phrases = lowercased(phrases);
            document
                .interactive_texts()
                .into_iter()
                .find(|text| {
                    let lower = text.to_lowercase();
                    phrases.iter().any(|p| lower.contains(p.as_str()))
                })
                .map(|text| {
                    Finding::found(name, format!("Button with text: {}", excerpt(&text)))
                })
        }

        RuleKind::KeywordSubstring { keywords } => {
            let keywords = lowercased(keywords);
            document
                .text_nodes()
                .find(|node| {
                    let lower = node.to_lowercase();
                    keywords.iter().any(|k| lower.contains(k.as_str()))
                })
                .map(|node| {
                    Finding::found(name, format!("Keyword match: {}", excerpt(node.trim())))
                })
        }

        RuleKind::ClassPattern { patterns } => patterns
            .iter()
            .zip(&rule.regexes)
            .find(|(_, re)| document.elements_with_class(re).next().is_some())
            .map(|(pattern, _)| Finding::found(name, format!("Class match: {}", pattern))),

        RuleKind::ImageCountThreshold { min } => {
            let count = document.image_count();
            (count >= *min).then(|| Finding::found(name, format!("{} images found", count)))
        }

        // Review photos are not told apart from other images; the page's
        // total image count stands in for them.
        RuleKind::ReviewImageThreshold { min } => {
            let count = document.image_count();
            (count >= *min)
                .then(|| Finding::found(name, format!("{} review images found", count)))
        }
    };

    let finding = finding.unwrap_or_else(|| Finding::missing(name));
    debug!("{} -> {}", name, finding.status);
    finding
}

fn lowercased(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

/// First [`EXCERPT_CHARS`] characters of `text`
pub fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}
