// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Lazily-initialised engine handle.
//
// Two states: `Uninitialized` until a factory call succeeds, then `Ready` for
// the life of the handle. A failed construction leaves the slot empty so the
// next request tries again from scratch. Construction happens under a mutex,
// so concurrent first callers never build more than one engine.

use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, instrument, warn};

use crate::engine::{EngineFactory, OcrEngine};

/// Observable lifecycle of an [`EngineHandle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// No engine yet; the next request attempts construction.
    Uninitialized,
    /// Engine constructed. Terminal.
    Ready,
}

/// Caller-owned handle that builds its engine once and reuses it.
pub struct EngineHandle<F: EngineFactory> {
    factory: F,
    slot: Mutex<Option<Arc<F::Engine>>>,
}

impl<F> EngineHandle<F>
where
    F: EngineFactory,
    F::Error: Display,
{
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            slot: Mutex::new(None),
        }
    }

    /// The factory this handle builds engines with.
    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn state(&self) -> HandleState {
        if self.lock().is_some() {
            HandleState::Ready
        } else {
            HandleState::Uninitialized
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state() == HandleState::Ready
    }

    /// Build the engine now instead of on the first request.
    ///
    /// A no-op once the handle is ready.
    #[instrument(level = "debug", skip(self))]
    pub fn initialize(&self) -> Result<(), F::Error> {
        self.engine().map(|_| ())
    }

    /// Return the engine, constructing it first if necessary.
    ///
    /// The lock is held for the whole construction attempt; waiters observe
    /// either the finished engine or an empty slot after a failure.
    pub fn engine(&self) -> Result<Arc<F::Engine>, F::Error> {
        let mut slot = self.lock();
        if let Some(engine) = slot.as_ref() {
            return Ok(Arc::clone(engine));
        }

        debug!("OCR engine not initialised; constructing");
        match self.factory.create() {
            Ok(engine) => {
                let engine = Arc::new(engine);
                *slot = Some(Arc::clone(&engine));
                info!("OCR engine initialised");
                Ok(engine)
            }
            Err(err) => {
                warn!(error = %err, "OCR engine initialisation failed; will retry on next call");
                Err(err)
            }
        }
    }

    /// Forward a request to the engine, initialising it on first use.
    ///
    /// The delegated call runs outside the lock. Its failure is returned
    /// as-is and does not reset the handle.
    #[instrument(level = "debug", skip(self))]
    pub fn process_image(
        &self,
        image_path: &str,
        confidence: f32,
    ) -> Result<<F::Engine as OcrEngine>::Output, F::Error> {
        let engine = self.engine()?;
        engine.process_image(image_path, confidence)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<F::Engine>>> {
        // The slot is only ever assigned a finished engine, so a panic while
        // holding the lock cannot leave it half-written.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
