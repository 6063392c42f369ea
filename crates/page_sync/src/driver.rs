//! Tokio driver: polls the location, feeds deliveries into the engine and
//! runs deferred work one tick later.

use crate::engine::SyncEngine;
use crate::host::{DashboardPage, Location, ResourceLoader};
use crate::registry::ResourceId;
use core::ops::ControlFlow;
use core::time::Duration;
use log::info;
use serde_json::Value;
use tokio::select;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::yield_now;
use tokio::time::{MissedTickBehavior, interval};

/// Interval used for the idle ticker when polling is disabled; its branch is
/// never selected then.
const IDLE_INTERVAL: Duration = Duration::from_secs(3600);

/// Messages delivered to a running engine.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
    /// A single resource was loaded.
    Arrived { id: ResourceId, payload: Value },
    /// A results bundle keyed by builder name was loaded.
    Results(Value),
    /// The host observed a navigation (for hosts with native notifications).
    Navigated,
    /// Stop the driver.
    Shutdown,
}

pub type EventSender = UnboundedSender<EngineEvent>;
pub type EventReceiver = UnboundedReceiver<EngineEvent>;

/// Channel used by loaders and hosts to reach a running engine.
#[inline]
pub fn event_channel() -> (EventSender, EventReceiver) {
    unbounded_channel()
}

impl<L: Location, R: ResourceLoader, P: DashboardPage> SyncEngine<L, R, P> {
    /// Apply one event. Breaks on [`EngineEvent::Shutdown`].
    pub fn handle_event(&mut self, event: EngineEvent) -> ControlFlow<()> {
        match event {
            EngineEvent::Arrived { id, payload } => self.mark_arrived(id, payload),
            EngineEvent::Results(bundle) => {
                let _builders = self.ingest_results(bundle);
            }
            EngineEvent::Navigated => {
                let _changed = self.poll_location();
            }
            EngineEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }
}

/// Drive `engine` until a shutdown event arrives or every sender is dropped.
///
/// With `poll_interval` set the location is polled on that cadence; without
/// it, changes are only noticed through [`EngineEvent::Navigated`]. After each
/// event or poll the driver yields once, so loads dispatched synchronously
/// get scheduled, and then runs the engine's deferred work.
pub async fn run<L: Location, R: ResourceLoader, P: DashboardPage>(
    engine: &mut SyncEngine<L, R, P>,
    mut events: EventReceiver,
    poll_interval: Option<Duration>,
) {
    let polling = poll_interval.is_some();
    let mut ticker = interval(poll_interval.unwrap_or(IDLE_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        let flow = select! {
            biased;
            event = events.recv() => match event {
                Some(event) => engine.handle_event(event),
                None => ControlFlow::Break(()),
            },
            _ = ticker.tick(), if polling => {
                let _changed = engine.poll_location();
                ControlFlow::Continue(())
            }
        };
        if flow.is_break() {
            break;
        }
        yield_now().await;
        let _ran = engine.run_tick();
    }
    info!(
        "Driver: stopped after {} renders",
        engine.gate_stats().renders
    );
}
