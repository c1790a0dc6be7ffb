// SPDX-License-Identifier: PMPL-1.0-or-later
//! Audit orchestration.
//!
//! One audit moves through
//! `Idle -> Fetching -> {Failed | Parsed -> Evaluating -> Analyzing -> Complete}`.
//! A failed fetch is terminal and yields exactly one `Error` finding; a
//! completed audit yields one finding per rule plus the semantic summary.
//! Nothing is retried and no state survives between audits.

use crate::analyzers::rules::RuleEvaluator;
use crate::analyzers::semantic::SemanticAnalyzer;
use crate::analyzers::Analyzer;
use crate::config::Config;
use crate::document::Document;
use crate::error::{FetchError, Result};
use crate::fetch::PageFetcher;
use crate::finding::{Finding, FindingSet};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle of a single audit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditState {
    Idle,
    Fetching,
    Failed,
    Parsed,
    Evaluating,
    Analyzing,
    Complete,
}

impl AuditState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AuditState::Failed | AuditState::Complete)
    }
}

fn advance(state: &mut AuditState, next: AuditState) {
    debug!("audit {:?} -> {:?}", state, next);
    *state = next;
}

/// Runs the checklist and the semantic analysis over a fetched page
pub struct Auditor {
    fetcher: Box<dyn PageFetcher>,
    evaluator: RuleEvaluator,
    semantic: SemanticAnalyzer,
    timeout: Duration,
}

impl Auditor {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        evaluator: RuleEvaluator,
        semantic: SemanticAnalyzer,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            evaluator,
            semantic,
            timeout,
        }
    }

    /// Build an auditor from configuration and a fetcher
    pub fn from_config(config: &Config, fetcher: Box<dyn PageFetcher>) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            fetcher,
            RuleEvaluator::new(config.catalog()?),
            config.semantic_analyzer(),
            config.timeout(),
        ))
    }

    /// Fetch `url` and audit it
    pub fn audit(&self, url: &str) -> FindingSet {
        let mut state = AuditState::Idle;
        info!("Auditing {}", url);

        advance(&mut state, AuditState::Fetching);
        let html = match self.acquire(url) {
            Ok(html) => html,
            Err(e) => {
                warn!("Fetch failed for {}: {}", url, e);
                advance(&mut state, AuditState::Failed);
                return FindingSet::from(vec![Finding::failed(e.to_string())]);
            }
        };

        let document = Document::parse(&html);
        advance(&mut state, AuditState::Parsed);
        self.run(&document, &mut state)
    }

    /// Audit HTML that has already been acquired
    pub fn audit_html(&self, html: &str) -> FindingSet {
        let mut state = AuditState::Parsed;
        self.run(&Document::parse(html), &mut state)
    }

    /// Audit an already-parsed document
    pub fn audit_document(&self, document: &Document) -> FindingSet {
        let mut state = AuditState::Parsed;
        self.run(document, &mut state)
    }

    fn acquire(&self, url: &str) -> std::result::Result<String, FetchError> {
        let html = self.fetcher.fetch(url, self.timeout)?;
        if html.trim().is_empty() {
            return Err(FetchError::Empty {
                url: url.to_string(),
            });
        }
        Ok(html)
    }

    fn run(&self, document: &Document, state: &mut AuditState) -> FindingSet {
        let mut findings = FindingSet::new();

        let stages: [(&dyn Analyzer, AuditState); 2] = [
            (&self.evaluator as &dyn Analyzer, AuditState::Evaluating),
            (&self.semantic as &dyn Analyzer, AuditState::Analyzing),
        ];
        for (analyzer, stage) in stages {
            advance(state, stage);
            let produced = analyzer.analyze(document);
            debug!("{} produced {} finding(s)", analyzer.name(), produced.len());
            findings.extend(produced);
        }

        advance(state, AuditState::Complete);
        info!(
            "Audit complete: {} of {} checklist items found",
            findings.iter().filter(|f| f.is_found()).count(),
            self.evaluator.catalog().len()
        );
        findings
    }
}
