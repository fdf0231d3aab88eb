// SPDX-License-Identifier: PMPL-1.0-or-later
//! Heading structure rules - WCAG 1.3.1 Info and Relationships, 2.4.6 Headings and Labels
//!
//! Four rules share one implementation, selected by [`HeadingCheck`]:
//! - `heading-has-accessible-name`: every heading exposes a non-empty name
//! - `page-has-heading-one`: the first heading is level 1
//! - `heading-order`: levels never skip and never re-deepen past a closed level
//! - `page-has-single-h1`: exactly one level-1 heading
//!
//! Document order (depth-first, pre-order) defines "first" and "previous".

use async_trait::async_trait;
use scraper::ElementRef;

use crate::document::{Document, Heading, MAX_HEADING_LEVEL};
use crate::error::{RegistryError, RuleExecutionError};
use crate::inspector::{get_accessible_name, get_unique_selector};
use crate::registry::RuleRegistry;
use crate::result::{format_result, PAGE_SELECTOR};
use crate::rule::{ResultSink, Rule, RuleMetadata};
use crate::types::{RuleCategory, Severity};
use crate::wcag::criterion_tag;

const HEADINGS_AND_LABELS_URL: &str =
    "https://www.w3.org/WAI/WCAG21/Understanding/headings-and-labels.html";
const INFO_AND_RELATIONSHIPS_URL: &str =
    "https://www.w3.org/WAI/WCAG21/Understanding/info-and-relationships.html";

const CATEGORIES: &[RuleCategory] = &[RuleCategory::Structure, RuleCategory::Headings];

/// Which heading check a [`HeadingRule`] performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingCheck {
    AccessibleName,
    FirstIsH1,
    Order,
    SingleH1,
}

/// A heading rule with its registration metadata
pub struct HeadingRule {
    check: HeadingCheck,
    metadata: RuleMetadata,
    /// Criterion tags in the order results cite them
    criteria: Vec<String>,
}

impl HeadingRule {
    pub fn accessible_name() -> Self {
        Self::build(
            HeadingCheck::AccessibleName,
            RuleMetadata::new(
                "heading-has-accessible-name",
                "Headings must have an accessible name",
                "This rule checks that all heading elements have non-empty accessible names.",
            )
            .with_requirements(&["2.4.6"])
            .with_help_url(HEADINGS_AND_LABELS_URL),
            &["2.4.6", "1.3.1"],
        )
    }

    pub fn first_is_h1() -> Self {
        Self::build(
            HeadingCheck::FirstIsH1,
            RuleMetadata::new(
                "page-has-heading-one",
                "First heading must be h1",
                "This rule checks that the first heading in the document is an h1.",
            )
            .with_requirements(&["1.3.1"])
            .with_help_url(INFO_AND_RELATIONSHIPS_URL),
            &["1.3.1", "2.4.6"],
        )
    }

    pub fn order() -> Self {
        Self::build(
            HeadingCheck::Order,
            RuleMetadata::new(
                "heading-order",
                "Heading levels must follow proper hierarchy",
                "This rule checks that heading levels follow a proper hierarchical structure without skipping levels.",
            )
            .with_requirements(&["1.3.1"])
            .with_help_url(INFO_AND_RELATIONSHIPS_URL),
            &["1.3.1", "2.4.6"],
        )
    }

    pub fn single_h1() -> Self {
        Self::build(
            HeadingCheck::SingleH1,
            RuleMetadata::new(
                "page-has-single-h1",
                "Only one h1 heading per page",
                "This rule checks that each page has exactly one h1 heading.",
            )
            .with_requirements(&["1.3.1"])
            .with_help_url(INFO_AND_RELATIONSHIPS_URL),
            &["1.3.1", "2.4.6"],
        )
    }

    /// All heading rules in registration order
    pub fn all() -> Vec<HeadingRule> {
        vec![
            Self::accessible_name(),
            Self::first_is_h1(),
            Self::order(),
            Self::single_h1(),
        ]
    }

    pub fn check(&self) -> HeadingCheck {
        self.check
    }

    fn build(check: HeadingCheck, metadata: RuleMetadata, criteria: &[&str]) -> Self {
        Self {
            check,
            metadata: metadata.with_categories(CATEGORIES),
            criteria: criteria.iter().map(|c| criterion_tag(c)).collect(),
        }
    }

    fn emit(
        &self,
        sink: &mut dyn ResultSink,
        element: Option<ElementRef<'_>>,
        passed: bool,
        message: &str,
        severity: Severity,
    ) -> Result<(), RuleExecutionError> {
        let selector = element
            .map(get_unique_selector)
            .unwrap_or_else(|| PAGE_SELECTOR.to_string());
        let result = format_result(
            &self.metadata.id,
            &self.metadata.name,
            element,
            &selector,
            passed,
            message,
            severity,
            &self.criteria,
            &self.metadata.help_url,
        );
        sink.add_result(result)?;
        Ok(())
    }

    fn check_accessible_names(
        &self,
        headings: &[Heading<'_>],
        sink: &mut dyn ResultSink,
    ) -> Result<(), RuleExecutionError> {
        for heading in headings {
            let name = get_accessible_name(heading.element);
            let passed = !name.trim().is_empty();
            let message = if passed {
                format!("Level {} heading has accessible name: \"{}\"", heading.level, name)
            } else {
                format!("Level {} heading is empty", heading.level)
            };
            let severity = if passed { Severity::Low } else { Severity::High };
            self.emit(sink, Some(heading.element), passed, &message, severity)?;
        }
        Ok(())
    }

    fn check_first_heading(
        &self,
        headings: &[Heading<'_>],
        sink: &mut dyn ResultSink,
    ) -> Result<(), RuleExecutionError> {
        let Some(first) = headings.first() else {
            return Ok(());
        };

        let passed = first.level == 1;
        let message = if passed {
            "Document starts with h1 heading".to_string()
        } else {
            format!("Document starts with h{} - should start with h1", first.level)
        };
        let severity = if passed { Severity::Low } else { Severity::Critical };
        self.emit(sink, Some(first.element), passed, &message, severity)
    }

    fn check_order(
        &self,
        headings: &[Heading<'_>],
        sink: &mut dyn ResultSink,
    ) -> Result<(), RuleExecutionError> {
        let levels: Vec<u8> = headings.iter().map(|h| h.level).collect();

        for verdict in check_heading_order(&levels) {
            let heading = &headings[verdict.index];
            let passed = verdict.violation.is_none();
            let message = match verdict.violation {
                None => format!(
                    "Level {} heading follows h{} correctly",
                    verdict.current_level, verdict.previous_level
                ),
                Some(OrderViolation::SkippedLevel) => format!(
                    "Skipped heading level: h{} is followed by h{} - can only increase by one level",
                    verdict.previous_level, verdict.current_level
                ),
                Some(OrderViolation::ImproperNesting) => format!(
                    "Improper heading structure: h{} appears after seeing h{} earlier in the document",
                    verdict.current_level, verdict.lowest_level_seen
                ),
            };
            let severity = if passed { Severity::Low } else { Severity::High };
            self.emit(sink, Some(heading.element), passed, &message, severity)?;
        }
        Ok(())
    }

    fn check_single_h1(
        &self,
        document: &Document,
        sink: &mut dyn ResultSink,
    ) -> Result<(), RuleExecutionError> {
        let h1s = document.h1_headings();
        let passed = h1s.len() == 1;
        let message = if passed {
            "Page has exactly one h1 heading".to_string()
        } else {
            format!("Page has {} h1 headings - should have exactly one", h1s.len())
        };
        let target = h1s.first().map(|h| h.element);
        self.emit(sink, target, passed, &message, Severity::High)
    }
}

#[async_trait(?Send)]
impl Rule for HeadingRule {
    fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }

    fn is_applicable(&self, document: &Document) -> bool {
        match self.check {
            HeadingCheck::AccessibleName | HeadingCheck::FirstIsH1 => {
                !document.headings().is_empty()
            }
            HeadingCheck::Order => document.headings().len() >= 2,
            HeadingCheck::SingleH1 => !document.h1_headings().is_empty(),
        }
    }

    async fn execute(
        &self,
        document: &Document,
        sink: &mut dyn ResultSink,
    ) -> Result<(), RuleExecutionError> {
        match self.check {
            HeadingCheck::AccessibleName => {
                self.check_accessible_names(&document.headings(), sink)
            }
            HeadingCheck::FirstIsH1 => self.check_first_heading(&document.headings(), sink),
            HeadingCheck::Order => self.check_order(&document.headings(), sink),
            HeadingCheck::SingleH1 => self.check_single_h1(document, sink),
        }
    }
}

/// Register the four heading rules
pub fn register_heading_rules(registry: &mut RuleRegistry) -> Result<(), RegistryError> {
    for rule in HeadingRule::all() {
        registry.register(rule)?;
    }
    Ok(())
}

/// Why a heading breaks the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderViolation {
    /// More than one level deeper than the previous heading
    SkippedLevel,
    /// Deeper than the previous heading and more than one level below a
    /// level already closed by an earlier, shallower heading
    ImproperNesting,
}

/// Verdict for the heading at `index` (always >= 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderVerdict {
    pub index: usize,
    pub previous_level: u8,
    pub current_level: u8,
    pub lowest_level_seen: u8,
    pub violation: Option<OrderViolation>,
}

/// Evaluate heading levels in document order, one verdict per heading from
/// index 1 onward.
///
/// `lowest_level_seen` starts at 6 and, before each comparison, takes the
/// previous heading's level if that heading closed deeper levels (it was
/// shallower than its own predecessor). Same-level and upward transitions
/// always pass.
pub fn check_heading_order(levels: &[u8]) -> Vec<OrderVerdict> {
    let mut lowest_level_seen = MAX_HEADING_LEVEL;
    let mut verdicts = Vec::with_capacity(levels.len().saturating_sub(1));

    for index in 1..levels.len() {
        let previous_level = levels[index - 1];
        let current_level = levels[index];

        let previous_closed_levels = index >= 2 && previous_level < levels[index - 2];
        if previous_closed_levels {
            lowest_level_seen = lowest_level_seen.min(previous_level);
        }

        let skipped = current_level > previous_level + 1;
        let improper = current_level > previous_level && current_level > lowest_level_seen + 1;

        let violation = if skipped {
            Some(OrderViolation::SkippedLevel)
        } else if improper {
            Some(OrderViolation::ImproperNesting)
        } else {
            None
        };

        verdicts.push(OrderVerdict {
            index,
            previous_level,
            current_level,
            lowest_level_seen,
            violation,
        });
    }

    verdicts
}
