//! Report serialization: JSON and the formatted `.xlsx` artifact.

pub mod json;
pub mod xlsx;
