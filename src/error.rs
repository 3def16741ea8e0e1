//! Errors raised by the core pipeline.
//!
//! Normalization and derivation never fail; they degrade to defaults. Only the
//! aggregation stage rejects a dataset, and only when a structurally required
//! field is missing as a whole column.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("Missing required column '{0}'. Check the report's column mapping.")]
    MissingField(&'static str),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
