//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so geometry and parameter failures propagate with
//! `?` from any layer.

use thiserror::Error;

use crate::ParameterType;

/// Errors produced by `mts-core`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("parameter {0} is not defined")]
    ParameterUndefined(ParameterType),

    #[error("parameter {parameter} = {value} violates constraint: {constraint}")]
    ParameterOutOfBounds {
        parameter:  ParameterType,
        value:      f64,
        constraint: &'static str,
    },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `mts-core`.
pub type CoreResult<T> = Result<T, CoreError>;
