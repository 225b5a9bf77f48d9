//! Stable error codes surfaced in error messages and machine-readable output.
//!
//! Codes are append-only: once published they keep their meaning forever.

pub const CMP_AMBIGUOUS_KEY: &str = "SHDIFF_CMP_001";
pub const CMP_MISSING_KEY: &str = "SHDIFF_CMP_002";
pub const CMP_SHEET_COUNT_MISMATCH: &str = "SHDIFF_CMP_003";
pub const CMP_INTERNAL: &str = "SHDIFF_CMP_004";

pub const CFG_KEY_IGNORED: &str = "SHDIFF_CFG_001";
pub const CFG_REFERENCE_IGNORED: &str = "SHDIFF_CFG_002";

#[cfg(feature = "excel-open-xml")]
pub const OPEN_CONTAINER: &str = "SHDIFF_OPEN_001";
#[cfg(feature = "excel-open-xml")]
pub const OPEN_PARSE: &str = "SHDIFF_OPEN_002";
#[cfg(feature = "excel-open-xml")]
pub const OPEN_WORKBOOK_XML_MISSING: &str = "SHDIFF_OPEN_003";
#[cfg(feature = "excel-open-xml")]
pub const OPEN_WORKSHEET_XML_MISSING: &str = "SHDIFF_OPEN_004";
