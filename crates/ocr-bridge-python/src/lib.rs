// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! `ocr_bridge` — Python extension module exposing `process_image`.
//!
//! The module owns one process-wide [`EngineHandle`]. The first call imports
//! the collaborator module, builds its `OCREngine`, and keeps it; every call
//! forwards `(image_path, confidence)` to the engine's `process_image` and
//! returns the result untouched. Failed initialisation is retried on the next
//! call; a failed request is not.
//!
//! ```python
//! import ocr_bridge
//!
//! result = ocr_bridge.process_image("receipt.png", 0.5)
//! ```

pub mod engine;

use std::sync::LazyLock;

use ocr_bridge_core::EngineHandle;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

pub use engine::{PythonEngine, PythonEngineFactory};

static ENGINE: LazyLock<EngineHandle<PythonEngineFactory>> =
    LazyLock::new(|| EngineHandle::new(PythonEngineFactory::from_env()));

/// The process-wide handle used by the exported `process_image`.
pub fn engine_handle() -> &'static EngineHandle<PythonEngineFactory> {
    &ENGINE
}

/// Forward one request through `handle`.
///
/// Detaches from the interpreter while waiting on the handle's
/// initialisation lock; the factory and engine re-attach for their own
/// Python calls. Holding the GIL while blocked on that lock would deadlock
/// against a collaborator that releases the GIL during import.
pub fn forward(
    py: Python<'_>,
    handle: &EngineHandle<PythonEngineFactory>,
    image_path: &str,
    confidence: f32,
) -> PyResult<Py<PyAny>> {
    py.detach(|| handle.process_image(image_path, confidence))
}

/// Process an image with OCR
#[pyfunction]
#[pyo3(signature = (image_path, confidence, /))]
fn process_image(py: Python<'_>, image_path: String, confidence: f32) -> PyResult<Py<PyAny>> {
    let image_path = checked_path(&image_path)?;
    forward(py, engine_handle(), image_path, confidence)
}

/// The path must be representable as a C string: no interior NUL.
fn checked_path(image_path: &str) -> PyResult<&str> {
    if image_path.contains('\0') {
        return Err(PyValueError::new_err("embedded null character"));
    }
    Ok(image_path)
}

/// Install the module's method table into `m`.
pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(process_image, m)?)?;
    Ok(())
}

#[pymodule]
fn ocr_bridge(m: &Bound<'_, PyModule>) -> PyResult<()> {
    register(m)
}
