// SPDX-License-Identifier: PMPL-1.0-or-later
//! Element inspection: accessible names, locators and detached snapshots.
//!
//! Everything here only reads the tree the element belongs to.

use scraper::ElementRef;
use serde::{Deserialize, Serialize};

/// Detached copy of an element, safe to serialize across a transport boundary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub tag_name: String,
    pub text_content: String,
    pub xpath: String,
}

impl ElementSnapshot {
    pub fn of(element: ElementRef<'_>) -> Self {
        Self {
            tag_name: element.value().name().to_string(),
            text_content: text_content(element).trim().to_string(),
            xpath: get_xpath(element),
        }
    }
}

/// Compute a simplified accessible name.
///
/// Order: `aria-label`, `aria-labelledby` targets, native labelling
/// (`label[for]`, wrapping `<label>`, `alt`), then trimmed text content.
/// Returns an empty string when nothing yields a name.
///
/// Names are not computed from descendants: a heading whose only content
/// is `<img alt="Logo">` has an empty name, since `alt` only names the
/// image itself.
pub fn get_accessible_name(element: ElementRef<'_>) -> String {
    let el = element.value();

    if let Some(label) = el.attr("aria-label").map(str::trim) {
        if !label.is_empty() {
            return label.to_string();
        }
    }

    if let Some(ids) = el.attr("aria-labelledby") {
        let joined = ids
            .split_whitespace()
            .filter_map(|id| find_by_id(element, id))
            .map(|target| text_content(target).trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            return joined;
        }
    }

    if let Some(name) = native_label(element) {
        return name;
    }

    text_content(element).trim().to_string()
}

/// Human-readable CSS locator: `#id`, or tag + classes + role/aria-level.
/// Not guaranteed to be unique in the document.
pub fn get_unique_selector(element: ElementRef<'_>) -> String {
    let el = element.value();

    if let Some(id) = el.id().filter(|id| !id.is_empty()) {
        return format!("#{}", id);
    }

    let mut selector = el.name().to_string();

    let classes: Vec<&str> = el
        .attr("class")
        .map(|c| c.split_whitespace().collect())
        .unwrap_or_default();
    if !classes.is_empty() {
        selector.push('.');
        selector.push_str(&classes.join("."));
    }

    if let Some(role) = el.attr("role") {
        selector.push_str(&format!("[role=\"{}\"]", role));
    }

    if let Some(level) = el.attr("aria-level") {
        selector.push_str(&format!("[aria-level=\"{}\"]", level));
    }

    selector
}

/// Absolute positional XPath, or an id-anchored one when the element has an id
pub fn get_xpath(element: ElementRef<'_>) -> String {
    if let Some(id) = element.value().id().filter(|id| !id.is_empty()) {
        return format!("//*[@id=\"{}\"]", id);
    }

    let mut chain: Vec<ElementRef<'_>> = element.ancestors().filter_map(ElementRef::wrap).collect();
    chain.reverse();
    chain.push(element);

    chain
        .iter()
        .map(|el| {
            let name = el.value().name();
            let position = 1 + el
                .prev_siblings()
                .filter_map(ElementRef::wrap)
                .filter(|sib| sib.value().name() == name)
                .count();
            format!("/{}[{}]", name, position)
        })
        .collect()
}

/// Concatenated descendant text
pub fn text_content(element: ElementRef<'_>) -> String {
    element.text().collect()
}

fn find_by_id<'a>(element: ElementRef<'a>, id: &str) -> Option<ElementRef<'a>> {
    tree_elements(element).find(|el| el.value().id() == Some(id))
}

fn native_label(element: ElementRef<'_>) -> Option<String> {
    let el = element.value();

    if matches!(el.name(), "img" | "area")
        || (el.name() == "input" && el.attr("type") == Some("image"))
    {
        if let Some(alt) = el.attr("alt").map(str::trim).filter(|a| !a.is_empty()) {
            return Some(alt.to_string());
        }
    }

    if let Some(id) = el.id().filter(|id| !id.is_empty()) {
        let label = tree_elements(element).find(|candidate| {
            candidate.value().name() == "label" && candidate.value().attr("for") == Some(id)
        });
        if let Some(text) = label.map(|l| text_content(l).trim().to_string()) {
            if !text.is_empty() {
                return Some(text);
            }
        }
    }

    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "label")
        .map(|label| text_content(label).trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Every element of the tree the given element belongs to, in document order
fn tree_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    let root = element.ancestors().last().unwrap_or(*element);
    root.descendants().filter_map(ElementRef::wrap)
}
