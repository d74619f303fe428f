// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// C-ABI surface for hosts that embed Python (e.g. a Flutter app calling
// through `dart:ffi` after loading `libpython` and this library).
//
// Requests go through the same process-wide engine handle as the Python
// extension module. Results come back as caller-owned JSON strings: the
// engine's result serialised with `json.dumps` on success, or an
// `{"status": "error", "message": "Bridge error: ..."}` envelope on any
// failure. Nothing unwinds across the boundary.
//
// Every string returned by `ocr_bridge_process_image` must be released with
// `ocr_bridge_string_free`.

use std::ffi::{CStr, CString, c_char, c_int};
use std::panic::{self, AssertUnwindSafe};

use ocr_bridge::engine_handle;
use ocr_bridge_core::error::{OcrBridgeError, Result};
use ocr_bridge_core::OcrOutcome;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyString};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Served when even the error envelope cannot be encoded.
const FALLBACK_ERROR_JSON: &str =
    r#"{"status":"error","message":"Bridge error: failed to encode result"}"#;

/// Install a `tracing` subscriber writing to stderr.
///
/// The filter comes from `RUST_LOG`, then the configured `log_filter`, then
/// `info`. Returns `0` on success and `1` if a subscriber already exists.
#[unsafe(no_mangle)]
pub extern "C" fn ocr_bridge_init_logging() -> c_int {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&engine_handle().factory().config().log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        Ok(()) => {
            info!("OCR bridge logging initialised");
            0
        }
        Err(_) => 1,
    }
}

/// Build the OCR engine ahead of the first request.
///
/// Returns `0` once the engine is ready and `-1` if initialisation failed;
/// the failure is logged and the next call (or request) tries again.
#[unsafe(no_mangle)]
pub extern "C" fn ocr_bridge_initialize() -> c_int {
    let outcome =
        panic::catch_unwind(AssertUnwindSafe(|| engine_handle().initialize().map_err(engine_error)));
    match outcome {
        Ok(Ok(())) => 0,
        Ok(Err(err)) => {
            warn!(error = %err, "OCR engine initialisation failed");
            -1
        }
        Err(_) => {
            warn!("OCR engine initialisation panicked");
            -1
        }
    }
}

/// Run OCR on the image at `image_path` and return a JSON result string.
///
/// # Safety
///
/// `image_path` must be null or point to a NUL-terminated string that stays
/// valid for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ocr_bridge_process_image(
    image_path: *const c_char,
    min_confidence: f32,
) -> *mut c_char {
    // SAFETY: forwarded from this function's contract.
    let path = unsafe { read_path(image_path) };

    let json = panic::catch_unwind(AssertUnwindSafe(|| {
        path.and_then(|path| run(path, min_confidence))
    }))
    .unwrap_or_else(|_| Err(OcrBridgeError::Engine("OCR request panicked".into())))
    .unwrap_or_else(|err| {
        warn!(error = %err, "OCR request failed");
        OcrOutcome::bridge_error(err)
            .to_json()
            .unwrap_or_else(|_| FALLBACK_ERROR_JSON.to_string())
    });

    into_raw(json)
}

/// Release a string returned by [`ocr_bridge_process_image`].
///
/// # Safety
///
/// `ptr` must be null or a pointer obtained from `ocr_bridge_process_image`
/// that has not been freed yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn ocr_bridge_string_free(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: `ptr` came from `CString::into_raw` in `into_raw` below.
    drop(unsafe { CString::from_raw(ptr) });
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Borrow the caller's path as UTF-8.
///
/// # Safety
///
/// See [`ocr_bridge_process_image`].
unsafe fn read_path<'a>(image_path: *const c_char) -> Result<&'a str> {
    if image_path.is_null() {
        return Err(OcrBridgeError::InvalidArgument("image path is null".into()));
    }
    // SAFETY: non-null and NUL-terminated per the caller's contract.
    let raw = unsafe { CStr::from_ptr(image_path) };
    raw.to_str()
        .map_err(|err| OcrBridgeError::InvalidArgument(format!("image path is not UTF-8: {err}")))
}

fn run(image_path: &str, confidence: f32) -> Result<String> {
    let result = engine_handle()
        .process_image(image_path, confidence)
        .map_err(engine_error)?;
    Python::attach(|py| dumps(result.bind(py))).map_err(engine_error)
}

/// `json.dumps(value, default=str)`.
fn dumps(value: &Bound<'_, PyAny>) -> PyResult<String> {
    let py = value.py();
    let kwargs = PyDict::new(py);
    kwargs.set_item("default", py.get_type::<PyString>())?;
    py.import("json")?
        .call_method("dumps", (value,), Some(&kwargs))?
        .extract()
}

/// Keep only the exception message, like Python's `str(e)`.
fn engine_error(err: PyErr) -> OcrBridgeError {
    let message = Python::attach(|py| err.value(py).to_string());
    OcrBridgeError::Engine(message)
}

fn into_raw(json: String) -> *mut c_char {
    CString::new(json)
        .or_else(|_| CString::new(FALLBACK_ERROR_JSON))
        .map(CString::into_raw)
        .unwrap_or(std::ptr::null_mut())
}

#[cfg(test)]
mod tests {
    use ocr_bridge_core::BridgeConfig;
    use pyo3::types::PyList;
    use serde_json::Value;

    use super::*;

    /// Mimics the reference engine's result dictionary.
    #[pyclass]
    struct DictEngine {}

    #[pymethods]
    impl DictEngine {
        #[new]
        fn new() -> Self {
            Self {}
        }

        fn process_image<'py>(
            &self,
            py: Python<'py>,
            image_path: String,
            confidence: f32,
        ) -> PyResult<Bound<'py, PyDict>> {
            let result = PyDict::new(py);
            result.set_item("status", "success")?;
            result.set_item("text", format!("read {image_path}"))?;
            result.set_item("boxes", vec![vec![0, 0, 10, 4]])?;
            result.set_item("confidence", confidence)?;
            Ok(result)
        }
    }

    /// Publish `package.leaf` with `DictEngine` as its `OCREngine`. The
    /// parent package must be importable too, so it is registered alongside.
    fn install_collaborator(py: Python<'_>, dotted: &str) -> PyResult<()> {
        let (package_name, leaf) = dotted.rsplit_once('.').unwrap_or(("", dotted));
        let modules = py.import("sys")?.getattr("modules")?;

        let engine_module = PyModule::new(py, dotted)?;
        engine_module.add("OCREngine", py.get_type::<DictEngine>())?;

        if !package_name.is_empty() {
            let package = PyModule::new(py, package_name)?;
            package.add("__path__", PyList::empty(py))?;
            package.add(leaf, &engine_module)?;
            modules.set_item(package_name, package)?;
        }
        modules.set_item(dotted, engine_module)?;
        Ok(())
    }

    fn call(path: Option<&CStr>, confidence: f32) -> String {
        let ptr = path.map_or(std::ptr::null(), CStr::as_ptr);
        // SAFETY: `ptr` is null or borrowed from a live `CStr`.
        let out = unsafe { ocr_bridge_process_image(ptr, confidence) };
        assert!(!out.is_null());
        // SAFETY: `out` was just returned and is NUL-terminated.
        let json = unsafe { CStr::from_ptr(out) }.to_str().unwrap().to_owned();
        // SAFETY: returned by `ocr_bridge_process_image`, freed once.
        unsafe { ocr_bridge_string_free(out) };
        json
    }

    #[test]
    fn null_path_is_reported_as_bridge_error() {
        let json = call(None, 0.5);
        assert_eq!(
            OcrOutcome::from_json(&json).unwrap(),
            OcrOutcome::Error {
                message: "Bridge error: invalid argument: image path is null".into()
            }
        );
    }

    #[test]
    fn non_utf8_path_is_reported_as_bridge_error() {
        let path = CString::new(vec![0xff, 0xfe, b'a']).unwrap();
        let json = call(Some(path.as_c_str()), 0.5);
        match OcrOutcome::from_json(&json).unwrap() {
            OcrOutcome::Error { message } => {
                assert!(message.starts_with("Bridge error: invalid argument: image path is not UTF-8"));
            }
            other => panic!("expected error envelope, got {other:?}"),
        }
    }

    #[test]
    fn free_null_is_noop() {
        // SAFETY: null is explicitly allowed.
        unsafe { ocr_bridge_string_free(std::ptr::null_mut()) };
    }

    #[test]
    fn logging_installs_once() {
        let _ = ocr_bridge_init_logging();
        assert_eq!(ocr_bridge_init_logging(), 1);
    }

    #[test]
    fn engine_lifecycle_through_c_abi() {
        let module = BridgeConfig::default().engine_module;
        assert_eq!(engine_handle().factory().config().engine_module, module);
        let path = CString::new("receipt.png").unwrap();

        // Collaborator not importable yet: error envelope, and again on retry.
        assert_eq!(ocr_bridge_initialize(), -1);
        for _ in 0..2 {
            match OcrOutcome::from_json(&call(Some(path.as_c_str()), 0.5)).unwrap() {
                OcrOutcome::Error { message } => {
                    assert_eq!(message, "Bridge error: No module named 'flutter_onnx_ffi'");
                }
                other => panic!("expected error envelope, got {other:?}"),
            }
        }
        assert!(!engine_handle().is_ready());

        Python::attach(|py| install_collaborator(py, &module)).unwrap();

        assert_eq!(ocr_bridge_initialize(), 0);
        let json = call(Some(path.as_c_str()), 0.5);
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["text"], "read receipt.png");
        assert_eq!(value["boxes"], serde_json::json!([[0, 0, 10, 4]]));
        assert_eq!(value["confidence"], 0.5);
        assert!(OcrOutcome::from_json(&json).unwrap().is_success());
    }

    #[test]
    fn engine_error_keeps_message_only() {
        let err = engine_error(pyo3::exceptions::PyFileNotFoundError::new_err("scan.png"));
        assert_eq!(
            OcrOutcome::bridge_error(err),
            OcrOutcome::Error {
                message: "Bridge error: scan.png".into()
            }
        );
    }
}
