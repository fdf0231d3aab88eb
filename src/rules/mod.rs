// SPDX-License-Identifier: PMPL-1.0-or-later
//! Built-in ACT rules.

pub mod headings;

pub use headings::{HeadingCheck, HeadingRule};

use crate::error::RegistryError;
use crate::registry::RuleRegistry;

/// Register every built-in rule, in their canonical order
pub fn register_default_rules(registry: &mut RuleRegistry) -> Result<(), RegistryError> {
    headings::register_heading_rules(registry)
}
