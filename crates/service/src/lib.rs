//! Handheld controller service.
//!
//! Wires physical controllers to virtual gamepads. At startup a
//! [`ServiceContext`] is built from the [`ServiceConfig`]; every controller
//! then gets a [`Pipeline`] that reads, transforms and emits on each tick
//! of the shared timer. [`HandpadService`] owns the timer and the
//! pipelines and detaches controllers that disappear.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod context;
pub mod loopback;
pub mod observability;
pub mod pipeline;
pub mod service;

pub use config::{ConfigError, ConfigFormat, DeviceOverride, ServiceConfig};
pub use context::ServiceContext;
pub use loopback::LoopbackBus;
pub use observability::{LogFormat, init_logging};
pub use pipeline::Pipeline;
pub use service::HandpadService;
