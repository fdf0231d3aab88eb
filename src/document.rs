// SPDX-License-Identifier: PMPL-1.0-or-later
//! Read-only view over a parsed HTML document.
//!
//! Rules never mutate the tree; every accessor here borrows it.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Standard heading tags plus ARIA headings that declare a level
pub const HEADING_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, [role='heading'][aria-level]";

/// Level assumed for `role="heading"` without a usable level
pub const DEFAULT_ARIA_HEADING_LEVEL: u8 = 2;

/// Deepest heading level
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Parsed HTML document
pub struct Document {
    html: Html,
}

/// A heading element together with its resolved level
#[derive(Debug, Clone, Copy)]
pub struct Heading<'a> {
    pub element: ElementRef<'a>,
    pub level: u8,
}

impl Document {
    /// Parse a complete HTML document
    pub fn parse(content: &str) -> Self {
        Self {
            html: Html::parse_document(content),
        }
    }

    /// Elements matching a CSS selector in document order.
    /// An unparsable selector matches nothing.
    pub fn select(&self, css: &str) -> Vec<ElementRef<'_>> {
        match Selector::parse(css) {
            Ok(selector) => self.html.select(&selector).collect(),
            Err(e) => {
                debug!("Ignoring invalid selector {:?}: {:?}", css, e);
                Vec::new()
            }
        }
    }

    /// All headings in depth-first pre-order
    pub fn headings(&self) -> Vec<Heading<'_>> {
        self.select(HEADING_SELECTOR)
            .into_iter()
            .map(|element| Heading {
                element,
                level: heading_level(element).unwrap_or(DEFAULT_ARIA_HEADING_LEVEL),
            })
            .collect()
    }

    /// Headings whose resolved level is 1
    pub fn h1_headings(&self) -> Vec<Heading<'_>> {
        self.headings().into_iter().filter(|h| h.level == 1).collect()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("headings", &self.headings().len())
            .finish()
    }
}

/// Resolve the level of a heading element.
///
/// A valid `aria-level` (1..=6) wins over the tag digit.
pub fn heading_level(element: ElementRef<'_>) -> Option<u8> {
    let aria_level = element
        .value()
        .attr("aria-level")
        .and_then(|v| v.trim().parse::<u8>().ok())
        .filter(|l| (1..=MAX_HEADING_LEVEL).contains(l));

    aria_level.or_else(|| tag_level(element.value().name()))
}

fn tag_level(tag: &str) -> Option<u8> {
    let mut chars = tag.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('h'), Some(d), None) => d
            .to_digit(10)
            .map(|d| d as u8)
            .filter(|l| (1..=MAX_HEADING_LEVEL).contains(l)),
        _ => None,
    }
}
