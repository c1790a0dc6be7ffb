// SPDX-License-Identifier: PMPL-1.0-or-later
//! Page analyzers.
//!
//! The audit runs two independent stages over the same parsed document:
//! the structural rule checklist and the semantic gap heuristic. Each can be
//! exercised on its own.

pub mod rules;
pub mod semantic;

use crate::document::Document;
use crate::finding::Finding;

/// Trait implemented by all analyzers
pub trait Analyzer: Send + Sync {
    /// Human-readable name of this analyzer
    fn name(&self) -> &str;

    /// Short description of what this analyzer checks
    fn description(&self) -> &str;

    /// Analyze a parsed page and return findings in a stable order
    fn analyze(&self, document: &Document) -> Vec<Finding>;
}
