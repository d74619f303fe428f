// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OcrBridgeError, Result};

/// Environment variable naming a JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "OCR_BRIDGE_CONFIG";
pub const ENGINE_MODULE_ENV: &str = "OCR_BRIDGE_ENGINE_MODULE";
pub const ENGINE_CLASS_ENV: &str = "OCR_BRIDGE_ENGINE_CLASS";
pub const ENGINE_METHOD_ENV: &str = "OCR_BRIDGE_ENGINE_METHOD";
pub const LOG_FILTER_ENV: &str = "OCR_BRIDGE_LOG";

/// Where the collaborator engine lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Dotted import path of the module that defines the engine class.
    pub engine_module: String,
    /// Name of the zero-argument engine class inside `engine_module`.
    pub engine_class: String,
    /// Method invoked on the engine instance for every request.
    pub engine_method: String,
    /// `tracing` filter directive used when the C-ABI host installs logging.
    pub log_filter: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            engine_module: "flutter_onnx_ffi.ocr".into(),
            engine_class: "OCREngine".into(),
            engine_method: "process_image".into(),
            log_filter: "info".into(),
        }
    }
}

impl BridgeConfig {
    /// Read a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration from the process environment.
    ///
    /// `OCR_BRIDGE_CONFIG` names an optional JSON file used as the base; the
    /// per-field variables are then applied on top.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reading variables through
    /// `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::load(path)?,
            _ => Self::default(),
        };

        if let Some(module) = lookup(ENGINE_MODULE_ENV) {
            config.engine_module = module;
        }
        if let Some(class) = lookup(ENGINE_CLASS_ENV) {
            config.engine_class = class;
        }
        if let Some(method) = lookup(ENGINE_METHOD_ENV) {
            config.engine_method = method;
        }
        if let Some(filter) = lookup(LOG_FILTER_ENV) {
            config.log_filter = filter;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject empty collaborator names; an empty import path can never resolve.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("engine_module", &self.engine_module),
            ("engine_class", &self.engine_class),
            ("engine_method", &self.engine_method),
        ] {
            if value.trim().is_empty() {
                return Err(OcrBridgeError::Config(format!("{field} must not be empty")));
            }
        }
        Ok(())
    }
}
