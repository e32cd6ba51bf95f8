//! Publish/subscribe tick bus.
//!
//! Controllers and virtual targets attach to the bus on plug and detach on
//! unplug. Every tick is dispatched on one thread, stage by stage, so reads
//! always happen before transforms and transforms before emission. Within a
//! stage subscribers run in subscription order.

use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::scheduler::Tick;

/// Pipeline stage a subscriber runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Pull raw reports from physical controllers.
    Read,
    /// Run layouts and actions.
    Transform,
    /// Pack and submit virtual reports.
    Emit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Read => f.write_str("read"),
            Stage::Transform => f.write_str("transform"),
            Stage::Emit => f.write_str("emit"),
        }
    }
}

pub trait TickSubscriber: Send {
    fn on_tick(&mut self, tick: &Tick);
}

impl<F> TickSubscriber for F
where
    F: FnMut(&Tick) + Send,
{
    fn on_tick(&mut self, tick: &Tick) {
        self(tick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

struct Entry {
    id: SubscriptionId,
    stage: Stage,
    name: String,
    subscriber: Box<dyn TickSubscriber>,
}

/// Ordered subscriber list.
///
/// Dispatch holds the list lock for the whole tick, so once
/// [`TickBus::unsubscribe`] returns the handler will not run again.
/// Subscribers must not call back into the bus from `on_tick`.
#[derive(Default)]
pub struct TickBus {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicU64,
}

impl fmt::Debug for TickBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickBus")
            .field("subscribers", &self.names())
            .finish()
    }
}

impl TickBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &self,
        name: impl Into<String>,
        stage: Stage,
        subscriber: impl TickSubscriber + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let name = name.into();
        debug!(subscriber = %name, %stage, "tick subscriber attached");

        let mut entries = self.entries.lock();
        let position = entries.partition_point(|e| e.stage <= stage);
        entries.insert(
            position,
            Entry {
                id,
                stage,
                name,
                subscriber: Box::new(subscriber),
            },
        );
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let Some(position) = entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = entries.remove(position);
        debug!(subscriber = %entry.name, stage = %entry.stage, "tick subscriber detached");
        true
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Subscriber names in dispatch order.
    pub fn names(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.name.clone()).collect()
    }

    pub fn dispatch(&self, tick: &Tick) {
        let mut entries = self.entries.lock();
        for entry in entries.iter_mut() {
            entry.subscriber.on_tick(tick);
        }
    }
}
