// SPDX-License-Identifier: PMPL-1.0-or-later
//! Wire-level enumerations shared by rules, results and reports.
//!
//! The serialized names of [`Severity`] and [`RuleCategory`] are part of the
//! transport contract with presentation layers and must round-trip exactly.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity assigned by a rule author to a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Prevents access to content outright
    Critical,
    /// Seriously degrades navigation or comprehension
    High,
    /// Noticeable barrier with a workaround
    Medium,
    /// Informational, also used for passing results
    Low,
}

impl Severity {
    /// Numeric rank, higher is more severe
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
        }
    }

    /// Whether a failing result at this severity should fail a CI invocation
    pub fn blocks_release(&self) -> bool {
        matches!(self, Severity::Critical | Severity::High)
    }

    pub fn all() -> [Severity; 4] {
        [Severity::Critical, Severity::High, Severity::Medium, Severity::Low]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::High => write!(f, "High"),
            Severity::Medium => write!(f, "Medium"),
            Severity::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "critical" => Ok(Severity::Critical),
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            other => Err(format!("Unknown severity: {}", other)),
        }
    }
}

/// Category tag attached to a rule definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCategory {
    /// Document structure and relationships
    Structure,
    /// Heading outline
    Headings,
    /// ARIA roles, states and properties
    Aria,
    /// Keyboard operability
    Keyboard,
    /// Text alternatives and readable text
    Text,
    /// Form controls and labels
    Forms,
}

impl RuleCategory {
    /// Name used on the wire and in CLI test ids
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Structure => "STRUCTURE",
            RuleCategory::Headings => "HEADINGS",
            RuleCategory::Aria => "ARIA",
            RuleCategory::Keyboard => "KEYBOARD",
            RuleCategory::Text => "TEXT",
            RuleCategory::Forms => "FORMS",
        }
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STRUCTURE" => Ok(RuleCategory::Structure),
            "HEADINGS" => Ok(RuleCategory::Headings),
            "ARIA" => Ok(RuleCategory::Aria),
            "KEYBOARD" => Ok(RuleCategory::Keyboard),
            "TEXT" => Ok(RuleCategory::Text),
            "FORMS" => Ok(RuleCategory::Forms),
            other => Err(format!("Unknown rule category: {}", other)),
        }
    }
}

/// WCAG conformance level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WcagLevel {
    /// Level A - minimum conformance
    A,
    /// Level AA - standard conformance
    AA,
    /// Level AAA - enhanced conformance
    AAA,
}

impl fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WcagLevel::A => write!(f, "A"),
            WcagLevel::AA => write!(f, "AA"),
            WcagLevel::AAA => write!(f, "AAA"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_wire_names() {
        for severity in Severity::all() {
            let json = serde_json::to_string(&severity).unwrap();
            assert_eq!(json, format!("\"{}\"", severity));
            let back: Severity = serde_json::from_str(&json).unwrap();
            assert_eq!(back, severity);
        }
    }

    #[test]
    fn test_severity_rank_order() {
        assert!(Severity::Critical.rank() > Severity::High.rank());
        assert!(Severity::High.rank() > Severity::Medium.rank());
        assert!(Severity::Medium.rank() > Severity::Low.rank());
        assert!(Severity::High.blocks_release());
        assert!(!Severity::Medium.blocks_release());
    }

    #[test]
    fn test_category_wire_name() {
        let json = serde_json::to_string(&RuleCategory::Structure).unwrap();
        assert_eq!(json, "\"STRUCTURE\"");
        let back: RuleCategory = serde_json::from_str("\"HEADINGS\"").unwrap();
        assert_eq!(back, RuleCategory::Headings);
    }

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!("headings".parse::<RuleCategory>().unwrap(), RuleCategory::Headings);
        assert_eq!("Structure".parse::<RuleCategory>().unwrap(), RuleCategory::Structure);
        assert!("links".parse::<RuleCategory>().is_err());
    }
}
