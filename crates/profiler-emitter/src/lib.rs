//! # profiler-emitter
//!
//! Process-lifetime emitter for profiler lifecycle events.
//!
//! - [`ProfilerEventEmitter`]: stamps and publishes `started` / `ended` events
//! - [`EmitterCell`]: lazily constructs exactly one emitter per process
//! - [`Publisher`] / [`BrokerConnector`]: the broker client contract
//! - [`MemoryBroker`] / [`MemoryConnector`]: in-memory transport for tests
//! - [`LinePublisher`] / [`StdoutConnector`]: line-per-message transport

#![deny(unsafe_code)]

pub mod cell;
pub mod emitter;
pub mod line;
pub mod memory;
pub mod publisher;

pub use cell::EmitterCell;
pub use emitter::ProfilerEventEmitter;
pub use line::{LinePublisher, StdoutConnector};
pub use memory::{MemoryBroker, MemoryConnector, PublishedMessage};
pub use publisher::{BrokerConnector, Publisher};
