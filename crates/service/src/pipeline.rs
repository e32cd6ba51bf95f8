//! One physical controller driving one virtual target.
//!
//! A pipeline owns three tick subscriptions, one per stage:
//!
//! 1. **Read**: tick the controller and fire OEM chords on new presses
//! 2. **Transform**: run the layout over the physical state
//! 3. **Emit**: pack the logical state and submit it to the bus
//!
//! Stage ordering on the tick bus keeps these in sequence for every
//! controller attached to the same bus.

use std::sync::Arc;

use handpad_actions::{ActionContext, Layout, LayoutEngine};
use handpad_controller::{Controller, TickOutcome, Vibration};
use handpad_devices::{ChordRunner, DeviceDescriptor, InjectedButtons, KeySink};
use handpad_errors::{Result, ValidationError};
use handpad_input::{ButtonState, ControllerState};
use handpad_scheduler::{Stage, SubscriptionId, Tick, TickBus};
use handpad_targets::{TargetKind, VirtualTarget};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::context::ServiceContext;

/// Chord keys that name a button go to the injected state. Other keys
/// have no keyboard backend here and are only logged.
struct ChordSink {
    injected: InjectedButtons,
}

impl ChordSink {
    fn is_button(key: &str) -> bool {
        handpad_input::ButtonFlags::ALL
            .iter()
            .any(|button| button.name() == key)
    }
}

impl KeySink for ChordSink {
    fn key_down(&self, key: &str) {
        if Self::is_button(key) {
            self.injected.key_down(key);
        } else {
            debug!(key, "key down");
        }
    }

    fn key_up(&self, key: &str) {
        if Self::is_button(key) {
            self.injected.key_up(key);
        } else {
            debug!(key, "key up");
        }
    }
}

struct Slot {
    controller: Controller,
    engine: LayoutEngine,
    device: DeviceDescriptor,
    chords: ChordRunner,
    previous: ButtonState,
    outcome: TickOutcome,
    logical: ControllerState,
}

impl Slot {
    fn read(&mut self, tick: &Tick) {
        self.outcome = self.controller.tick(tick.rate_hz());

        let pressed = &self.controller.state().buttons;
        for chord in &self.device.oem_chords {
            if pressed.get(chord.button) && !self.previous.get(chord.button) {
                self.chords.fire(chord);
            }
        }
        self.previous = pressed.clone();
    }

    fn transform(&mut self, tick: &Tick) {
        if self.outcome == TickOutcome::Disconnected {
            self.engine.reset();
            self.logical.clear();
            return;
        }
        let period_ms = u32::try_from(tick.period_ms()).unwrap_or(u32::MAX);
        self.logical = self
            .engine
            .apply(self.controller.state(), &ActionContext::new(period_ms));
    }
}

pub struct Pipeline {
    name: String,
    ticks: Arc<TickBus>,
    slot: Arc<Mutex<Slot>>,
    target: Arc<Mutex<VirtualTarget>>,
    subscriptions: Vec<SubscriptionId>,
}

impl core::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Plug `controller`, connect a `kind` target and subscribe to the
    /// context's tick bus.
    ///
    /// # Errors
    ///
    /// An invalid layout, a controller that cannot be acquired or a bus
    /// that refuses the target. Nothing stays plugged on failure.
    pub fn attach(
        ctx: &ServiceContext,
        mut controller: Controller,
        kind: TargetKind,
        layout: &Layout,
    ) -> Result<Self> {
        let engine = LayoutEngine::new(layout)?;
        let info = controller.info();
        let device = ctx.resolve_device(&info).clone();
        if let Some(motion) = ctx.motion_for(controller.kind(), &device) {
            controller = controller.with_motion(motion);
        }
        controller.plug()?;

        let mut target = VirtualTarget::new(kind, Arc::clone(ctx.virtual_bus()));
        target.connect()?;

        let sink = Arc::new(ChordSink {
            injected: controller.injected().clone(),
        });
        let chords = ChordRunner::for_device(ctx.runtime().clone(), sink, &device);
        let name = format!("{} -> {}", controller.name(), kind);

        let slot = Arc::new(Mutex::new(Slot {
            controller,
            engine,
            device,
            chords,
            previous: ButtonState::new(),
            outcome: TickOutcome::Skipped,
            logical: ControllerState::new(),
        }));
        let target = Arc::new(Mutex::new(target));

        let feedback_slot = Arc::downgrade(&slot);
        target
            .lock()
            .set_feedback_handler(Arc::new(move |vibration: Vibration| {
                if let Some(slot) = feedback_slot.upgrade() {
                    slot.lock().controller.set_vibration(vibration);
                }
            }));

        let ticks = Arc::clone(ctx.tick_bus());
        let mut subscriptions = Vec::with_capacity(3);

        let reader = Arc::clone(&slot);
        subscriptions.push(ticks.subscribe(
            format!("{name}/read"),
            Stage::Read,
            move |tick: &Tick| reader.lock().read(tick),
        ));

        let transformer = Arc::clone(&slot);
        subscriptions.push(ticks.subscribe(
            format!("{name}/transform"),
            Stage::Transform,
            move |tick: &Tick| transformer.lock().transform(tick),
        ));

        let emitter = Arc::clone(&slot);
        let emit_target = Arc::clone(&target);
        subscriptions.push(ticks.subscribe(
            format!("{name}/emit"),
            Stage::Emit,
            move |tick: &Tick| {
                let logical = emitter.lock().logical.clone();
                emit_target.lock().submit(&logical, tick.delta);
            },
        ));

        info!(pipeline = %name, "pipeline attached");
        Ok(Self {
            name,
            ticks,
            slot,
            target,
            subscriptions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_kind(&self) -> TargetKind {
        self.target.lock().kind()
    }

    /// The controller went away; the pipeline only emits neutral reports
    /// until it is detached.
    pub fn is_disconnected(&self) -> bool {
        self.slot.lock().outcome == TickOutcome::Disconnected
    }

    pub fn physical_state(&self) -> ControllerState {
        self.slot.lock().controller.state().clone()
    }

    pub fn logical_state(&self) -> ControllerState {
        self.slot.lock().logical.clone()
    }

    pub fn injected(&self) -> InjectedButtons {
        self.slot.lock().controller.injected().clone()
    }

    pub fn dropped_reports(&self) -> u64 {
        self.target.lock().dropped_reports()
    }

    /// Rumble from the bus driver for this pipeline's target.
    pub fn feedback(&self, large_motor: u8, small_motor: u8) {
        self.target.lock().feedback(large_motor, small_motor);
    }

    /// Swap in a new layout. Press timers start over.
    ///
    /// # Errors
    ///
    /// The layout's validation error; the running layout is kept.
    pub fn set_layout(&self, layout: &Layout) -> std::result::Result<(), ValidationError> {
        let engine = LayoutEngine::new(layout)?;
        self.slot.lock().engine = engine;
        debug!(pipeline = %self.name, "layout replaced");
        Ok(())
    }

    /// Unsubscribe, disconnect the target and unplug the controller.
    pub fn detach(&mut self) {
        if self.subscriptions.is_empty() {
            return;
        }
        for id in self.subscriptions.drain(..) {
            self.ticks.unsubscribe(id);
        }
        self.target.lock().disconnect();
        self.slot.lock().controller.unplug();
        info!(pipeline = %self.name, "pipeline detached");
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.detach();
    }
}
