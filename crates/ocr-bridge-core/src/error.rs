// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the OCR bridge.

use thiserror::Error;

/// Error type for bridge-level operations (configuration, C-ABI arguments,
/// result encoding).
///
/// Engine failures on the Python surface never pass through this type; they
/// keep the collaborator's own error so callers see it unchanged.
#[derive(Debug, Error)]
pub enum OcrBridgeError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Engine(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, OcrBridgeError>;
