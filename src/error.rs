//! Error types for Rigflow.
//!
//! All errors in Rigflow are represented by the `RigflowError` enum.
//! Runtime step resolution never produces one; errors surface to pack
//! authors (structure, simulation) and to the session service.

use std::{io::ErrorKind, string::FromUtf8Error};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Rigflow operations.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum RigflowError {
    /// Fatal pack structure errors (missing start, unresolved branch target).
    #[error("{0}")]
    Structural(String),

    /// Node definition errors (unknown kind, conflicting dialect fields).
    #[error("{0}")]
    Node(String),

    /// Data conversion errors (JSON, schema).
    #[error("{0}")]
    Convert(String),

    /// Configuration parsing errors.
    #[error("{0}")]
    Config(String),

    /// Simulation path is too short or too long for the procedure.
    #[error("{0}")]
    SimulationLength(String),

    /// Simulation visited too many steps without reaching a terminal node.
    #[error("simulation exceeded {limit} steps without terminating")]
    StepBudgetExceeded {
        limit: usize,
    },

    /// A technician submission that cannot be recorded.
    #[error("{0}")]
    Submission(String),

    /// Session history changed between read and append.
    #[error("stale session history: expected {expected} actions, found {actual}")]
    Conflict {
        expected: usize,
        actual: usize,
    },

    /// Storage operation errors.
    #[error("{0}")]
    Store(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<RigflowError> for String {
    fn from(val: RigflowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for RigflowError {
    fn from(error: std::io::Error) -> Self {
        RigflowError::IoError(error.to_string())
    }
}

impl From<RigflowError> for std::io::Error {
    fn from(val: RigflowError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<FromUtf8Error> for RigflowError {
    fn from(_: FromUtf8Error) -> Self {
        RigflowError::Convert("Error with utf-8 string convert".to_string())
    }
}

impl From<serde_json::Error> for RigflowError {
    fn from(error: serde_json::Error) -> Self {
        RigflowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for RigflowError {
    fn from(error: toml::de::Error) -> Self {
        RigflowError::Config(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for RigflowError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        RigflowError::Convert(format!("schema violation: {}", error))
    }
}
