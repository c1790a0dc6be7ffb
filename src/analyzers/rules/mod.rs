// SPDX-License-Identifier: PMPL-1.0-or-later
//! Declarative landing-page checklist.
//!
//! Each [`RuleSpec`] names one element a converting product page is expected
//! to carry and says how to detect it. Specs are compiled into a
//! [`RuleCatalog`] once, so every regex is validated before any page is
//! evaluated.

pub mod evaluator;

pub use evaluator::RuleEvaluator;

use crate::error::{CrobotError, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How a rule detects its element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleKind {
    /// Any of the tags exists, tried in order
    TagPresence { tags: Vec<String> },
    /// Pattern found anywhere in the page text
    RegexMatch { pattern: String },
    /// A button or link whose text contains one of the phrases
    ButtonText { phrases: Vec<String> },
    /// A text node containing one of the keywords
    KeywordSubstring { keywords: Vec<String> },
    /// An element whose class matches one of the regex fragments
    ClassPattern { patterns: Vec<String> },
    /// At least `min` images on the page
    ImageCountThreshold { min: usize },
    /// At least `min` images, read as review photos
    ReviewImageThreshold { min: usize },
}

impl RuleKind {
    /// Short label used when listing the catalog
    pub fn label(&self) -> &'static str {
        match self {
            RuleKind::TagPresence { .. } => "tag",
            RuleKind::RegexMatch { .. } => "regex",
            RuleKind::ButtonText { .. } => "button",
            RuleKind::KeywordSubstring { .. } => "keyword",
            RuleKind::ClassPattern { .. } => "class",
            RuleKind::ImageCountThreshold { .. } => "images",
            RuleKind::ReviewImageThreshold { .. } => "review-images",
        }
    }

    /// Human-readable parameter summary
    pub fn parameters(&self) -> String {
        match self {
            RuleKind::TagPresence { tags } => tags.join(", "),
            RuleKind::RegexMatch { pattern } => pattern.clone(),
            RuleKind::ButtonText { phrases } => phrases.join(", "),
            RuleKind::KeywordSubstring { keywords } => keywords.join(", "),
            RuleKind::ClassPattern { patterns } => patterns.join(", "),
            RuleKind::ImageCountThreshold { min } | RuleKind::ReviewImageThreshold { min } => {
                format!(">= {}", min)
            }
        }
    }
}

/// One checklist entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Unique identifier, also the finding's section label
    pub name: String,
    #[serde(flatten)]
    pub kind: RuleKind,
}

impl RuleSpec {
    /// A named rule of the given kind
    pub fn new(name: &str, kind: RuleKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
        }
    }

    fn tags(name: &str, tags: &[&str]) -> Self {
        Self::new(name, RuleKind::TagPresence { tags: owned(tags) })
    }

    fn pattern(name: &str, pattern: &str) -> Self {
        Self::new(
            name,
            RuleKind::RegexMatch {
                pattern: pattern.to_string(),
            },
        )
    }

    fn buttons(name: &str, phrases: &[&str]) -> Self {
        Self::new(name, RuleKind::ButtonText { phrases: owned(phrases) })
    }

    fn keywords(name: &str, keywords: &[&str]) -> Self {
        Self::new(name, RuleKind::KeywordSubstring { keywords: owned(keywords) })
    }

    fn classes(name: &str, patterns: &[&str]) -> Self {
        Self::new(name, RuleKind::ClassPattern { patterns: owned(patterns) })
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The standard 17-entry product page checklist, in report order
pub fn default_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::keywords("announcement_bar", &["offer", "free shipping", "new drop", "sale"]),
        RuleSpec::tags("header_menu", &["header"]),
        RuleSpec::new("product_image_carousel", RuleKind::ImageCountThreshold { min: 5 }),
        RuleSpec::tags("product_title", &["h1"]),
        RuleSpec::pattern("product_price", r"₹?\s?\d+[.,]?\d*"),
        RuleSpec::tags("compare_price", &["del", "strike"]),
        RuleSpec::pattern("discount_percentage", r"\d+%\s*off"),
        RuleSpec::classes("review_star", &["star", "review", "rating"]),
        RuleSpec::buttons("add_to_cart_button", &["add to cart"]),
        RuleSpec::buttons("buy_now_button", &["buy now"]),
        RuleSpec::keywords("offer_section", &["limited time", "extra", "combo"]),
        RuleSpec::keywords("delivery_time", &["delivery", "dispatch", "estimated"]),
        RuleSpec::keywords("product_badges", &["guarantee", "authentic", "safe"]),
        RuleSpec::tags("product_description", &["p"]),
        RuleSpec::keywords("frequently_bought_together", &["frequently bought", "bundle"]),
        RuleSpec::keywords("a_plus_content", &["why us", "brand promise", "crafted"]),
        RuleSpec::new("reviews_with_images", RuleKind::ReviewImageThreshold { min: 50 }),
    ]
}

/// A rule with its patterns compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub spec: RuleSpec,
    /// One regex per pattern, in the order the rule lists them
    pub(crate) regexes: Vec<Regex>,
}

/// Ordered, validated checklist
#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: Vec<CompiledRule>,
}

impl RuleCatalog {
    /// Validate specs and compile their patterns.
    ///
    /// Rejects empty or duplicate names, rules with nothing to look for, and
    /// patterns that fail to compile.
    pub fn new(specs: Vec<RuleSpec>, case_insensitive: bool) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut rules = Vec::with_capacity(specs.len());

        for spec in specs {
            if spec.name.trim().is_empty() {
                return Err(CrobotError::Catalog("rule with empty name".to_string()));
            }
            if !seen.insert(spec.name.clone()) {
                return Err(CrobotError::Catalog(format!(
                    "duplicate rule name: {}",
                    spec.name
                )));
            }

            let empty = match &spec.kind {
                RuleKind::TagPresence { tags } => tags.is_empty(),
                RuleKind::RegexMatch { pattern } => pattern.is_empty(),
                RuleKind::ButtonText { phrases } => phrases.is_empty(),
                RuleKind::KeywordSubstring { keywords } => keywords.is_empty(),
                RuleKind::ClassPattern { patterns } => patterns.is_empty(),
                RuleKind::ImageCountThreshold { .. } | RuleKind::ReviewImageThreshold { .. } => {
                    false
                }
            };
            if empty {
                return Err(CrobotError::Catalog(format!(
                    "rule {} has no parameters",
                    spec.name
                )));
            }

            let sources: &[String] = match &spec.kind {
                RuleKind::RegexMatch { pattern } => std::slice::from_ref(pattern),
                RuleKind::ClassPattern { patterns } => patterns,
                _ => &[],
            };
            let regexes = sources
                .iter()
                .map(|p| {
                    RegexBuilder::new(p)
                        .case_insensitive(case_insensitive)
                        .build()
                        .map_err(|e| {
                            CrobotError::Catalog(format!(
                                "rule {}: invalid pattern '{}': {}",
                                spec.name, p, e
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?;

            rules.push(CompiledRule { spec, regexes });
        }

        Ok(Self { rules })
    }

    /// The standard checklist with case-sensitive patterns
    pub fn standard() -> Result<Self> {
        Self::new(default_rules(), false)
    }

    /// Compiled rules in catalog order
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// Number of rules, and of rule findings per audit
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the catalog has no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in catalog order
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.spec.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_has_17_rules() {
        let catalog = RuleCatalog::standard().expect("standard catalog compiles");
        assert_eq!(catalog.len(), 17);
        assert_eq!(catalog.names()[0], "announcement_bar");
        assert_eq!(catalog.names()[16], "reviews_with_images");
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let specs = vec![
            RuleSpec::tags("title", &["h1"]),
            RuleSpec::tags("title", &["h2"]),
        ];
        let err = RuleCatalog::new(specs, false).unwrap_err();
        assert!(err.to_string().contains("duplicate rule name"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let specs = vec![RuleSpec::pattern("broken", "(unclosed")];
        let err = RuleCatalog::new(specs, false).unwrap_err();
        assert!(matches!(err, CrobotError::Catalog(_)));
    }

    #[test]
    fn test_empty_parameters_rejected() {
        let specs = vec![RuleSpec::keywords("nothing", &[])];
        assert!(RuleCatalog::new(specs, false).is_err());
    }

    #[test]
    fn test_class_patterns_compiled_in_order() {
        let catalog = RuleCatalog::standard().unwrap();
        let review = catalog
            .rules()
            .iter()
            .find(|r| r.spec.name == "review_star")
            .unwrap();
        let compiled: Vec<&str> = review.regexes.iter().map(|r| r.as_str()).collect();
        assert_eq!(compiled, vec!["star", "review", "rating"]);
    }

    #[test]
    fn test_rule_spec_yaml_shape() {
        let yaml = "name: hero_title\nkind: tag_presence\ntags: [h1, h2]\n";
        let spec: RuleSpec = serde_yaml::from_str(yaml).expect("valid rule yaml");
        assert_eq!(spec, RuleSpec::tags("hero_title", &["h1", "h2"]));

        let yaml = "name: carousel\nkind: image_count_threshold\nmin: 3\n";
        let spec: RuleSpec = serde_yaml::from_str(yaml).expect("valid rule yaml");
        assert_eq!(spec.kind, RuleKind::ImageCountThreshold { min: 3 });
    }
}
