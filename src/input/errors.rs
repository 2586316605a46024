/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for settings and input loading

use std::io;
use thiserror::Error;

/// Errors that can occur while loading settings or QHA input data
#[derive(Error, Debug)]
pub enum InputError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid input format: {0}")]
    InvalidFormat(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Volumes are not monotonic: {0}")]
    NonMonotonicVolumes(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for input operations
pub type Result<T> = std::result::Result<T, InputError>;
