// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Python-backed engine: resolves the collaborator class by import path and
// forwards requests to its instance.
//
// Every Python exception is returned as the original `PyErr`, so callers on
// the Python side see exactly what the collaborator raised.

use ocr_bridge_core::{BridgeConfig, EngineFactory, OcrEngine};
use pyo3::prelude::*;
use tracing::{debug, warn};

/// Builds [`PythonEngine`]s from the module and class named in the config.
#[derive(Debug, Clone)]
pub struct PythonEngineFactory {
    config: BridgeConfig,
}

impl PythonEngineFactory {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    /// Factory configured from the process environment, falling back to the
    /// defaults when the configuration cannot be read.
    pub fn from_env() -> Self {
        let config = BridgeConfig::from_env().unwrap_or_else(|err| {
            warn!(error = %err, "ignoring unreadable OCR bridge configuration");
            BridgeConfig::default()
        });
        Self::new(config)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl EngineFactory for PythonEngineFactory {
    type Engine = PythonEngine;
    type Error = PyErr;

    fn create(&self) -> PyResult<PythonEngine> {
        Python::attach(|py| {
            debug!(
                module = %self.config.engine_module,
                class = %self.config.engine_class,
                "resolving OCR engine"
            );
            let module = PyModule::import(py, self.config.engine_module.as_str())?;
            let class = module.getattr(self.config.engine_class.as_str())?;
            let instance = class.call0()?;

            Ok(PythonEngine {
                instance: instance.unbind(),
                method: self.config.engine_method.clone(),
            })
        })
    }
}

/// A live collaborator instance.
#[derive(Debug)]
pub struct PythonEngine {
    instance: Py<PyAny>,
    method: String,
}

impl OcrEngine for PythonEngine {
    type Output = Py<PyAny>;
    type Error = PyErr;

    fn process_image(&self, image_path: &str, confidence: f32) -> PyResult<Py<PyAny>> {
        Python::attach(|py| {
            self.instance
                .bind(py)
                .call_method1(self.method.as_str(), (image_path, confidence))
                .map(Bound::unbind)
        })
    }
}
