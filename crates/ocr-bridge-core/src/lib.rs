// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OCR bridge — engine handle, configuration, and result types shared by the
// Python extension module and the C-ABI surface.

pub mod config;
pub mod engine;
pub mod error;
pub mod handle;
pub mod types;

pub use config::BridgeConfig;
pub use engine::{EngineFactory, OcrEngine};
pub use error::OcrBridgeError;
pub use handle::{EngineHandle, HandleState};
pub use types::OcrOutcome;
