//! # profiler-settings
//!
//! Layered run configuration for the MLOps profiler.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`ProfilerSettings::default()`]
//! 2. **Settings file**: `~/.mlops/profiler.json` (deep-merged over defaults)
//! 3. **Environment variables**: `MLOPS_*` overrides (highest priority)
//!
//! [`ProfilerSettings::to_run_config`] then validates the identity fields and
//! resolves the process [`Role`](profiler_core::Role) once, producing the
//! [`RunConfig`] the emitter is built from.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod run_config;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    LoadedSettings, RejectedEnvVar, apply_env_overrides_with, deep_merge, load_settings,
    load_settings_with, settings_path, settings_path_with,
};
pub use run_config::RunConfig;
pub use types::*;
