// SPDX-License-Identifier: PMPL-1.0-or-later
//! WCAG 2.1 success criterion references cited by rules.

use crate::types::WcagLevel;
use serde::{Deserialize, Serialize};
use tracing::debug;

const UNDERSTANDING_BASE: &str = "https://www.w3.org/WAI/WCAG21/Understanding";

/// (criterion, title, level, understanding slug)
const CRITERIA: &[(&str, &str, WcagLevel, &str)] = &[
    ("1.1.1", "Non-text Content", WcagLevel::A, "non-text-content"),
    ("1.3.1", "Info and Relationships", WcagLevel::A, "info-and-relationships"),
    ("1.3.2", "Meaningful Sequence", WcagLevel::A, "meaningful-sequence"),
    ("2.4.1", "Bypass Blocks", WcagLevel::A, "bypass-blocks"),
    ("2.4.2", "Page Titled", WcagLevel::A, "page-titled"),
    ("2.4.4", "Link Purpose (In Context)", WcagLevel::A, "link-purpose-in-context"),
    ("2.4.6", "Headings and Labels", WcagLevel::AA, "headings-and-labels"),
    ("2.4.10", "Section Headings", WcagLevel::AAA, "section-headings"),
    ("3.3.2", "Labels or Instructions", WcagLevel::A, "labels-or-instructions"),
    ("4.1.2", "Name, Role, Value", WcagLevel::A, "name-role-value"),
];

/// Descriptive reference to one success criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WcagReference {
    pub num: String,
    pub title: String,
    pub level: WcagLevel,
    pub url: String,
}

/// Look up a success criterion by number (e.g. "1.3.1")
pub fn reference(criterion: &str) -> Option<WcagReference> {
    CRITERIA
        .iter()
        .find(|(num, _, _, _)| *num == criterion)
        .map(|(num, title, level, slug)| WcagReference {
            num: num.to_string(),
            title: title.to_string(),
            level: *level,
            url: format!("{}/{}.html", UNDERSTANDING_BASE, slug),
        })
}

/// Build the requirement list of a rule definition in declared order.
/// Unknown and repeated criteria are skipped.
pub fn requirements(criteria: &[&str]) -> Vec<WcagReference> {
    let mut refs: Vec<WcagReference> = Vec::with_capacity(criteria.len());
    for criterion in criteria {
        if refs.iter().any(|r| r.num == *criterion) {
            continue;
        }
        match reference(criterion) {
            Some(r) => refs.push(r),
            None => debug!("No WCAG reference for criterion {}", criterion),
        }
    }
    refs
}

/// Tag form used in result criteria lists, e.g. `WCAG2.1:1.3.1`
pub fn criterion_tag(criterion: &str) -> String {
    format!("WCAG2.1:{}", criterion)
}
