//! Lazily constructed, process-lifetime emitter slot.
//!
//! The composition root owns one [`EmitterCell`] and passes it (or the
//! emitter it yields) to whatever needs to report events. The first
//! successful [`EmitterCell::get_or_create`] builds the emitter; every later
//! call returns the same instance and ignores its arguments.
//!
//! Construction is double-checked: a lock-free [`OnceLock`] read serves the
//! ready state, and a mutex serializes the fallible check-and-create so at
//! most one broker connection is ever opened. A failed construction leaves
//! the cell empty and the next caller tries again.

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use tracing::debug;

use profiler_core::errors::{ProfilerError, TransportError};
use profiler_settings::{ProfilerSettings, RunConfig};

use crate::emitter::ProfilerEventEmitter;
use crate::publisher::BrokerConnector;

/// Holder for the single [`ProfilerEventEmitter`] of a process.
#[derive(Debug, Default)]
pub struct EmitterCell {
    emitter: OnceLock<Arc<ProfilerEventEmitter>>,
    init_lock: Mutex<()>,
}

impl EmitterCell {
    /// An empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// The emitter, if it has been constructed.
    pub fn get(&self) -> Option<Arc<ProfilerEventEmitter>> {
        self.emitter.get().cloned()
    }

    /// Whether the emitter has been constructed.
    pub fn is_ready(&self) -> bool {
        self.emitter.get().is_some()
    }

    /// Return the emitter, connecting it from `config` on first use.
    pub fn get_or_create(
        &self,
        config: &RunConfig,
        connector: &dyn BrokerConnector,
    ) -> Result<Arc<ProfilerEventEmitter>, TransportError> {
        self.get_or_try_init(|| ProfilerEventEmitter::connect(config, connector))
    }

    /// Like [`get_or_create`](Self::get_or_create), but validates raw settings
    /// on first use. Identity errors surface here, before any connection is
    /// attempted; once the emitter exists `settings` is not looked at.
    pub fn get_or_create_from_settings(
        &self,
        settings: &ProfilerSettings,
        connector: &dyn BrokerConnector,
    ) -> Result<Arc<ProfilerEventEmitter>, ProfilerError> {
        self.get_or_try_init(|| -> Result<_, ProfilerError> {
            let config = settings.to_run_config()?;
            Ok(ProfilerEventEmitter::connect(&config, connector)?)
        })
    }

    fn get_or_try_init<E>(
        &self,
        init: impl FnOnce() -> Result<ProfilerEventEmitter, E>,
    ) -> Result<Arc<ProfilerEventEmitter>, E> {
        if let Some(emitter) = self.emitter.get() {
            return Ok(Arc::clone(emitter));
        }

        let _guard = self.init_lock.lock();
        if let Some(emitter) = self.emitter.get() {
            debug!("emitter constructed by a concurrent caller");
            return Ok(Arc::clone(emitter));
        }

        let emitter = Arc::new(init()?);
        Ok(Arc::clone(self.emitter.get_or_init(|| emitter)))
    }
}
