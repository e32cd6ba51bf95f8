//! One-shot key chords fired off the tick thread.
//!
//! Firing presses every key of the chord, waits the device's key press
//! delay on a background task and then releases the keys in reverse order.
//! The tick thread only spawns the task and never waits for it.

use std::sync::Arc;
use std::time::Duration;

use handpad_input::{ButtonFlags, ButtonState};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::descriptor::{DeviceDescriptor, OemChord};

/// Receiver of simulated key events.
pub trait KeySink: Send + Sync {
    fn key_down(&self, key: &str);
    fn key_up(&self, key: &str);
}

/// Injected button state shared with a controller, driven as a key sink.
///
/// Keys are button flag names (`"OEM1"`, `"B1"`, ...); unknown names are
/// ignored.
#[derive(Debug, Clone, Default)]
pub struct InjectedButtons {
    state: Arc<Mutex<ButtonState>>,
}

impl InjectedButtons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ButtonState {
        self.state.lock().clone()
    }

    pub fn set(&self, button: ButtonFlags, pressed: bool) {
        self.state.lock().set(button, pressed);
    }

    pub fn clear(&self) {
        self.state.lock().clear();
    }

    fn lookup(key: &str) -> Option<ButtonFlags> {
        ButtonFlags::ALL
            .iter()
            .copied()
            .find(|button| button.name() == key)
    }
}

impl KeySink for InjectedButtons {
    fn key_down(&self, key: &str) {
        if let Some(button) = Self::lookup(key) {
            self.set(button, true);
        }
    }

    fn key_up(&self, key: &str) {
        if let Some(button) = Self::lookup(key) {
            self.set(button, false);
        }
    }
}

/// Spawns press/delay/release sequences on a tokio runtime.
#[derive(Clone)]
pub struct ChordRunner {
    runtime: Handle,
    sink: Arc<dyn KeySink>,
    delay: Duration,
}

impl core::fmt::Debug for ChordRunner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ChordRunner")
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl ChordRunner {
    pub fn new(runtime: Handle, sink: Arc<dyn KeySink>, delay: Duration) -> Self {
        Self {
            runtime,
            sink,
            delay,
        }
    }

    /// Runner using the descriptor's key press delay.
    pub fn for_device(runtime: Handle, sink: Arc<dyn KeySink>, device: &DeviceDescriptor) -> Self {
        Self::new(runtime, sink, device.key_press_delay())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Tap `keys`. Returns `None` for an empty chord.
    pub fn fire_keys(&self, keys: Vec<String>) -> Option<JoinHandle<()>> {
        if keys.is_empty() {
            return None;
        }

        let sink = Arc::clone(&self.sink);
        let delay = self.delay;
        Some(self.runtime.spawn(async move {
            for key in &keys {
                sink.key_down(key);
            }
            tokio::time::sleep(delay).await;
            for key in keys.iter().rev() {
                sink.key_up(key);
            }
        }))
    }

    pub fn fire(&self, chord: &OemChord) -> Option<JoinHandle<()>> {
        debug!(chord = %chord.name, button = %chord.button, "firing OEM chord");
        self.fire_keys(chord.keys.clone())
    }

    /// Fire the descriptor's chord bound to `button`, if any.
    pub fn fire_button(
        &self,
        device: &DeviceDescriptor,
        button: ButtonFlags,
    ) -> Option<JoinHandle<()>> {
        match device.chord_for(button) {
            Some(chord) => self.fire(chord),
            None => {
                warn!(device = %device.name, button = %button, "no chord bound to OEM button");
                None
            }
        }
    }

    /// Tap a button through the sink by its flag name.
    pub fn tap_button(&self, button: ButtonFlags) -> Option<JoinHandle<()>> {
        self.fire_keys(vec![button.name().to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handpad_test_helpers::{must, must_some};

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl KeySink for RecordingSink {
        fn key_down(&self, key: &str) {
            self.events.lock().push(format!("+{key}"));
        }

        fn key_up(&self, key: &str) {
            self.events.lock().push(format!("-{key}"));
        }
    }

    #[tokio::test]
    async fn test_press_all_then_release_in_reverse() {
        let sink = Arc::new(RecordingSink::default());
        let runner = ChordRunner::new(Handle::current(), sink.clone(), Duration::from_millis(5));
        let chord = OemChord::new("combo", ButtonFlags::OEM3).with_keys(["Ctrl", "Alt", "F18"]);

        let handle = must_some(runner.fire(&chord), "chord has keys");
        must(handle.await);

        assert_eq!(
            *sink.events.lock(),
            vec!["+Ctrl", "+Alt", "+F18", "-F18", "-Alt", "-Ctrl"]
        );
    }

    #[tokio::test]
    async fn test_empty_chord_spawns_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let runner = ChordRunner::new(Handle::current(), sink.clone(), Duration::from_millis(5));
        assert!(runner.fire(&OemChord::new("cc", ButtonFlags::OEM1)).is_none());
        assert!(sink.events.lock().is_empty());
    }

    #[tokio::test]
    async fn test_keys_held_for_delay() {
        let injected = InjectedButtons::new();
        let runner = ChordRunner::new(
            Handle::current(),
            Arc::new(injected.clone()),
            Duration::from_millis(250),
        );

        let handle = must_some(runner.tap_button(ButtonFlags::OEM2), "tap spawns");
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert!(injected.snapshot().get(ButtonFlags::OEM2));

        must(handle.await);
        assert!(!injected.snapshot().get(ButtonFlags::OEM2));
    }
}
