// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Collaborator-agnostic trait definitions for the OCR engine.
//
// The engine itself lives outside this workspace (a Python class in the
// reference deployment). These traits describe only what the bridge needs:
// a way to build one, and a way to forward a request to it.

/// An OCR engine instance the bridge can forward requests to.
pub trait OcrEngine {
    /// Whatever the engine returns. The bridge never inspects it.
    type Output;
    /// The engine's own failure type, propagated to callers unchanged.
    type Error;

    /// Run recognition on the image at `image_path`, keeping results at or
    /// above `confidence`. Range and existence checks belong to the engine.
    fn process_image(&self, image_path: &str, confidence: f32)
    -> Result<Self::Output, Self::Error>;
}

/// Builds the engine on first use.
///
/// The engine shares the factory's error type so that resolution,
/// construction, and delegated-call failures all reach the caller through
/// one channel without translation.
pub trait EngineFactory {
    type Engine: OcrEngine<Error = Self::Error>;
    type Error;

    /// Resolve and construct a fresh engine instance.
    fn create(&self) -> Result<Self::Engine, Self::Error>;
}
