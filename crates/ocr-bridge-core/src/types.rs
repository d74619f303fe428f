// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result envelope exchanged with C-ABI hosts.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Outcome of one recognition request, as JSON hosts see it.
///
/// The reference engine already returns dictionaries in this shape. The
/// bridge only builds the `Error` variant itself, for failures it catches
/// before or around the engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OcrOutcome {
    Success {
        text: String,
        /// Engine-defined box geometry, kept opaque.
        #[serde(default)]
        boxes: Value,
        #[serde(default = "default_confidence")]
        confidence: f64,
    },
    Error {
        message: String,
    },
}

fn default_confidence() -> f64 {
    1.0
}

impl OcrOutcome {
    /// Wrap a failure caught by the bridge.
    pub fn bridge_error(err: impl std::fmt::Display) -> Self {
        Self::Error {
            message: format!("Bridge error: {err}"),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
