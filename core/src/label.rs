//! Sheet and column labels.
//!
//! Spreadsheet headers are not always text: a header row can contain numeric
//! identifiers, and sheets can be addressed by position. [`Label`] models
//! both shapes with one type so sheet identifiers and column names are
//! handled uniformly everywhere.

use serde::{Deserialize, Serialize};

/// A sheet identifier or column name: text, or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Label {
    Text(String),
    Index(i64),
}

impl Label {
    pub fn text(s: impl Into<String>) -> Label {
        Label::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Label::Text(s) => Some(s),
            Label::Index(_) => None,
        }
    }
}

impl Default for Label {
    fn default() -> Label {
        Label::Text(String::new())
    }
}

impl From<&str> for Label {
    fn from(s: &str) -> Label {
        Label::Text(s.to_string())
    }
}

impl From<String> for Label {
    fn from(s: String) -> Label {
        Label::Text(s)
    }
}

impl From<i64> for Label {
    fn from(i: i64) -> Label {
        Label::Index(i)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Text(s) => write!(f, "{}", s),
            Label::Index(i) => write!(f, "{}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Label;

    #[test]
    fn display_renders_both_variants() {
        assert_eq!(Label::text("Price").to_string(), "Price");
        assert_eq!(Label::Index(7).to_string(), "7");
    }

    #[test]
    fn text_and_index_labels_are_distinct() {
        assert_ne!(Label::text("7"), Label::Index(7));
    }

    #[test]
    fn conversions_produce_expected_variants() {
        assert_eq!(Label::from("id"), Label::Text("id".into()));
        assert_eq!(Label::from(3), Label::Index(3));
    }
}
