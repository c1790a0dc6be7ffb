// SPDX-License-Identifier: PMPL-1.0-or-later
//! crobot - Conversion-Rate Audit Bot
//!
//! Part of the gitbot-fleet ecosystem. crobot audits a rendered e-commerce
//! product page against a checklist of landing-page elements and flags
//! content sections that look weak or absent.
//!
//! ## Analyzers
//!
//! - **Rules**: structural checklist (tags, patterns, buttons, keywords,
//!   classes, image counts), one finding per checklist entry
//! - **Semantic**: TF-IDF similarity between the page text and a set of
//!   ideal content descriptions, one summary finding
//!
//! An [`audit::Auditor`] fetches a page through a [`fetch::PageFetcher`]
//! and runs both analyzers in order.

pub mod analyzers;
pub mod audit;
pub mod config;
pub mod document;
pub mod error;
pub mod fetch;
pub mod finding;
pub mod report;

pub use analyzers::rules::{RuleCatalog, RuleEvaluator, RuleKind, RuleSpec};
pub use analyzers::semantic::SemanticAnalyzer;
pub use analyzers::Analyzer;
pub use audit::{AuditState, Auditor};
pub use config::Config;
pub use document::Document;
pub use error::{CrobotError, FetchError, Result};
pub use finding::{Finding, FindingSet, FindingStatus};
