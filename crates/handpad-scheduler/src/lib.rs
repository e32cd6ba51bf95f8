//! Fixed-period tick timer and ordered tick bus.
//!
//! One thread drives the whole input pipeline. [`TickTimer`] wakes on
//! absolute deadlines every 3-10 ms and dispatches each [`Tick`] through a
//! [`TickBus`]:
//!
//! - **Read**: controllers pull and decode their latest report
//! - **Transform**: layouts and actions run over the decoded state
//! - **Emit**: virtual targets pack and submit
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use handpad_scheduler::{Stage, Tick, TickBus, TickConfig, TickTimer};
//!
//! let bus = Arc::new(TickBus::new());
//! bus.subscribe("probe", Stage::Read, |tick: &Tick| println!("tick {}", tick.index));
//!
//! let mut timer = TickTimer::new(TickConfig::default(), Arc::clone(&bus));
//! timer.start()?;
//! std::thread::sleep(std::time::Duration::from_millis(100));
//! timer.stop();
//! # Ok::<(), handpad_scheduler::SchedulerError>(())
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod bus;
pub mod error;
pub mod jitter;
pub mod scheduler;
pub mod timer;

pub use bus::{Stage, SubscriptionId, TickBus, TickSubscriber};
pub use error::{SchedulerError, SchedulerResult};
pub use jitter::JitterMetrics;
pub use scheduler::{
    AbsoluteScheduler, DEFAULT_PERIOD_MS, MAX_PERIOD_MS, MIN_PERIOD_MS, Tick, TickConfig,
};
pub use timer::TickTimer;
