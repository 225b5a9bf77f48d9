//! Configuration for a comparison session.
//!
//! `CompareConfig` is immutable once built: it is constructed before any
//! sheet is processed and read-only during the run. Contradictory option
//! combinations are rejected by `validate()` at build time instead of being
//! silently reinterpreted mid-comparison.

use crate::error_codes;
use crate::label::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// How rows are keyed for alignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeySpec {
    /// Use the row's position as a synthetic key.
    #[default]
    Position,
    /// Use the named column as the key.
    Column(Label),
}

impl KeySpec {
    /// The column label the key occupies in output tables.
    ///
    /// The position key has no source column; it surfaces under the same
    /// sentinel name the row index is traditionally given.
    pub fn output_label(&self) -> Label {
        match self {
            KeySpec::Position => Label::text("_index_"),
            KeySpec::Column(label) => label.clone(),
        }
    }
}

/// What to do when the two workbooks have different sheet counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetCountBehavior {
    /// Pair positionally up to the shorter workbook and record a warning.
    #[default]
    WarnAndTruncate,
    /// Report unpaired trailing sheets as entirely added or deleted.
    DiffUnpaired,
    /// Abort the comparison.
    Error,
}

/// Options recognized by the comparison engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Alignment key: a named column, or row position.
    pub key: KeySpec,
    /// Columns excluded from every sheet's comparison.
    pub ignored_columns: BTreeSet<Label>,
    /// Old-table columns carried into `changed` as context, never compared.
    pub reference_columns: Vec<Label>,
    pub on_sheet_count_mismatch: SheetCountBehavior,
}

impl CompareConfig {
    pub fn builder() -> CompareConfigBuilder {
        CompareConfigBuilder {
            inner: CompareConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if let KeySpec::Column(key) = &self.key
            && self.ignored_columns.contains(key)
        {
            return Err(ConfigError::KeyIgnored { column: key.clone() });
        }

        for reference in &self.reference_columns {
            if self.ignored_columns.contains(reference) {
                return Err(ConfigError::ReferenceIgnored {
                    column: reference.clone(),
                });
            }
        }

        Ok(())
    }

    pub fn is_reference(&self, column: &Label) -> bool {
        self.reference_columns.contains(column)
    }
}

/// Errors produced by config validation.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error(
        "[SHDIFF_CFG_001] key column '{column}' is also listed in ignored_columns. Suggestion: remove it from ignored_columns or choose a different key."
    )]
    KeyIgnored { column: Label },
    #[error(
        "[SHDIFF_CFG_002] reference column '{column}' is also listed in ignored_columns. Suggestion: a column cannot be both carried as context and ignored."
    )]
    ReferenceIgnored { column: Label },
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::KeyIgnored { .. } => error_codes::CFG_KEY_IGNORED,
            ConfigError::ReferenceIgnored { .. } => error_codes::CFG_REFERENCE_IGNORED,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompareConfigBuilder {
    inner: CompareConfig,
}

impl CompareConfigBuilder {
    pub fn new() -> Self {
        CompareConfig::builder()
    }

    /// Align rows on the named column.
    pub fn key_column(mut self, column: impl Into<Label>) -> Self {
        self.inner.key = KeySpec::Column(column.into());
        self
    }

    /// Align rows by position (the default).
    pub fn position_key(mut self) -> Self {
        self.inner.key = KeySpec::Position;
        self
    }

    pub fn ignore_column(mut self, column: impl Into<Label>) -> Self {
        self.inner.ignored_columns.insert(column.into());
        self
    }

    pub fn ignore_columns<I, L>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Label>,
    {
        self.inner
            .ignored_columns
            .extend(columns.into_iter().map(Into::into));
        self
    }

    pub fn reference_column(mut self, column: impl Into<Label>) -> Self {
        self.inner.reference_columns.push(column.into());
        self
    }

    pub fn on_sheet_count_mismatch(mut self, behavior: SheetCountBehavior) -> Self {
        self.inner.on_sheet_count_mismatch = behavior;
        self
    }

    pub fn build(self) -> Result<CompareConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_uses_position_key_and_truncation() {
        let cfg = CompareConfig::default();
        assert_eq!(cfg.key, KeySpec::Position);
        assert_eq!(
            cfg.on_sheet_count_mismatch,
            SheetCountBehavior::WarnAndTruncate
        );
        assert!(cfg.ignored_columns.is_empty());
        assert!(cfg.reference_columns.is_empty());
    }

    #[test]
    fn serde_roundtrip_preserves_defaults() {
        let cfg = CompareConfig::default();
        let json = serde_json::to_string(&cfg).expect("serialize default config");
        let parsed: CompareConfig = serde_json::from_str(&json).expect("deserialize default config");
        assert_eq!(cfg, parsed);
    }

    #[test]
    fn builder_rejects_ignored_key() {
        let err = CompareConfig::builder()
            .key_column("id")
            .ignore_column("id")
            .build()
            .expect_err("ignoring the key column should be rejected");
        assert!(matches!(err, ConfigError::KeyIgnored { .. }));
        assert_eq!(err.code(), "SHDIFF_CFG_001");
    }

    #[test]
    fn builder_rejects_ignored_reference_column() {
        let err = CompareConfig::builder()
            .key_column("id")
            .reference_column("name")
            .ignore_column("name")
            .build()
            .expect_err("an ignored reference column should be rejected");
        assert!(matches!(err, ConfigError::ReferenceIgnored { .. }));
    }

    #[test]
    fn position_key_surfaces_under_sentinel_label() {
        assert_eq!(KeySpec::Position.output_label(), Label::text("_index_"));
        assert_eq!(
            KeySpec::Column("sku".into()).output_label(),
            Label::text("sku")
        );
    }
}
