//! Tick bus ordering and subscription lifetime.

use std::sync::Arc;
use std::time::Duration;

use handpad_scheduler::{Stage, Tick, TickBus, TickConfig, TickSubscriber};
use handpad_test_helpers::must;
use parking_lot::Mutex;
use proptest::prelude::*;

fn tick(index: u64) -> Tick {
    Tick {
        index,
        period: Duration::from_millis(5),
        delta: Duration::from_millis(5),
    }
}

struct Recorder {
    name: &'static str,
    log: Arc<Mutex<Vec<(u64, &'static str)>>>,
}

impl TickSubscriber for Recorder {
    fn on_tick(&mut self, tick: &Tick) {
        self.log.lock().push((tick.index, self.name));
    }
}

#[test]
fn test_controllers_read_before_targets_emit() {
    let bus = TickBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let recorder = |name| Recorder {
        name,
        log: Arc::clone(&log),
    };

    // Target plugged first, controller second: the stage still wins.
    bus.subscribe("xbox360", Stage::Emit, recorder("xbox360"));
    bus.subscribe("legion-go", Stage::Read, recorder("legion-go"));

    bus.dispatch(&tick(1));
    bus.dispatch(&tick(2));

    assert_eq!(
        *log.lock(),
        vec![
            (1, "legion-go"),
            (1, "xbox360"),
            (2, "legion-go"),
            (2, "xbox360")
        ]
    );
}

#[test]
fn test_unplugged_controller_is_skipped() {
    let bus = TickBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));
    let first = bus.subscribe(
        "pad-a",
        Stage::Read,
        Recorder {
            name: "pad-a",
            log: Arc::clone(&log),
        },
    );
    bus.subscribe(
        "pad-b",
        Stage::Read,
        Recorder {
            name: "pad-b",
            log: Arc::clone(&log),
        },
    );

    assert!(bus.unsubscribe(first));
    bus.dispatch(&tick(7));

    assert_eq!(*log.lock(), vec![(7, "pad-b")]);
    assert_eq!(bus.len(), 1);
}

#[test]
fn test_tick_config_from_json() {
    let config: TickConfig = must(serde_json::from_str(r#"{ "period_ms": 4 }"#));
    assert_eq!(config.period_ms, 4);
    assert!(config.spin_tail);
    assert_eq!(config.validate(), Ok(()));

    let unknown: Result<TickConfig, _> = serde_json::from_str(r#"{ "period": 4 }"#);
    assert!(unknown.is_err());
}

fn stage_strategy() -> impl Strategy<Value = Stage> {
    prop_oneof![Just(Stage::Read), Just(Stage::Transform), Just(Stage::Emit)]
}

proptest! {
    #[test]
    fn prop_dispatch_is_stage_then_subscription_order(
        stages in proptest::collection::vec(stage_strategy(), 0..24)
    ) {
        let bus = TickBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        for (i, stage) in stages.iter().copied().enumerate() {
            let order = Arc::clone(&order);
            bus.subscribe(format!("s{i}"), stage, move |_: &Tick| order.lock().push((stage, i)));
        }

        bus.dispatch(&tick(1));

        let seen = order.lock().clone();
        prop_assert_eq!(seen.len(), stages.len());
        let mut expected = seen.clone();
        expected.sort();
        prop_assert_eq!(seen, expected);
    }
}
