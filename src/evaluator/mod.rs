//! Atomic field matchers.
//!
//! Every matcher is a pure function in [`plugins`]; [`MatcherKind`] is the tag
//! a kind schema uses to bind one of them to a field.

pub mod plugins;

use serde::{Deserialize, Serialize};

pub use plugins::between::range_inclusive;
pub use plugins::boolean::bool_equals;
pub use plugins::comparison::exact_ignore_case;
pub use plugins::in_list::list_contains_ignore_case;
pub use plugins::like::substring_ignore_case;

/// Which matcher a declared filter field uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatcherKind {
    /// Case-folded equality on a text field.
    Exact,
    /// Case-folded containment on a text field.
    Substring,
    /// Inclusive numeric or date range.
    Range,
    /// Any list element matches, by equality when `exact`, otherwise by containment.
    ListContains {
        #[serde(default)]
        exact: bool,
    },
    /// Strict boolean equality.
    BoolEq,
}

impl MatcherKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exact => "EXACT",
            Self::Substring => "SUBSTRING",
            Self::Range => "RANGE",
            Self::ListContains { exact: true } => "LIST_CONTAINS_EXACT",
            Self::ListContains { exact: false } => "LIST_CONTAINS",
            Self::BoolEq => "BOOL_EQ",
        }
    }
}
