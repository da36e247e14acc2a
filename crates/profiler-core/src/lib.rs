//! # profiler-core
//!
//! Foundation types for the MLOps profiler event emitter.
//!
//! This crate provides the shared vocabulary the other profiler crates depend on:
//!
//! - **Identifiers**: [`RunId`] and [`EdgeId`] for the run and the emitting participant
//! - **Events**: [`EventType`] and the [`EventMessage`] wire payload
//! - **Codec**: [`build_event_message`] producing the `(topic, payload)` pair
//! - **Identity**: [`Role`] tagged union and edge id resolution by rank
//! - **Errors**: [`ConfigError`], [`TransportError`], [`ProfilerError`] via `thiserror`
//! - **Logging**: `tracing` subscriber setup and test capture utilities

#![deny(unsafe_code)]

pub mod codec;
pub mod errors;
pub mod event;
pub mod identity;
pub mod ids;
pub mod logging;

pub use codec::{EVENT_TOPIC, build_event_message, build_event_message_at};
pub use errors::{ConfigError, ProfilerError, Result, TransportError};
pub use event::{EventMessage, EventTime, EventType};
pub use identity::{ClientIdList, Role, resolve_edge_id};
pub use ids::{EdgeId, RunId};
