//! The synchronization engine: location → state → resources → render.

use crate::config::{BuilderSet, BuilderTables, RESULTS_FILE};
use crate::context::{PageContext, resynchronize};
use crate::error::SyncError;
use crate::gate::{GateDecision, GateStats, RenderGate};
use crate::host::{DashboardPage, LoadRequest, Location, ResourceLoader};
use crate::registry::ResourceId;
use crate::tick::TickQueue;
use log::{debug, info, warn};
use page_state::{DefaultsTable, ParameterValidator, ParseReport};
use serde_json::Value;
use std::time::Instant;

/// Key of a results bundle that carries the format version, not a builder.
const VERSION_KEY: &str = "version";

/// Work deferred to the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    /// Re-read the location, then render if every resource is present.
    Resynchronize,
}

/// Keeps a dashboard page in sync with its location and loaded resources.
///
/// The engine is single-threaded: the host drives it by calling
/// [`SyncEngine::poll_location`], [`SyncEngine::mark_arrived`] and friends, and
/// then [`SyncEngine::run_tick`] once per scheduler tick (see
/// [`crate::driver::run`] for a tokio-based driver).
pub struct SyncEngine<L: Location, R: ResourceLoader, P: DashboardPage> {
    context: PageContext,
    location: L,
    loader: R,
    page: P,
    tables: BuilderTables,
    builders: Option<BuilderSet>,
    dispatched_test_type: Option<String>,
    queue: TickQueue<Deferred>,
    gate: RenderGate,
    created_at: Instant,
}

impl<L: Location, R: ResourceLoader, P: DashboardPage> SyncEngine<L, R, P> {
    pub fn new(location: L, loader: R, page: P, tables: BuilderTables) -> Self {
        let defaults = DefaultsTable::new(page.page_defaults());
        Self {
            context: PageContext::new(defaults),
            location,
            loader,
            page,
            tables,
            builders: None,
            dispatched_test_type: None,
            queue: TickQueue::new(),
            gate: RenderGate::new(),
            created_at: Instant::now(),
        }
    }

    /// Parse the initial location, fix the expected resources from the
    /// builder table selected by `debug`, and request every load.
    ///
    /// # Errors
    /// Returns [`SyncError::AlreadyStarted`] when called more than once.
    pub fn start(&mut self) -> Result<(), SyncError> {
        if self.builders.is_some() {
            return Err(SyncError::AlreadyStarted);
        }
        let _report = self.resynchronize();
        let set = self.tables.select(self.context.debug()).clone();
        self.context
            .registry
            .expect(set.resource_ids(), ResourceId::Expectations)?;
        info!(
            "SyncEngine: waiting on {} builders from {} ({} mode)",
            set.builders.len(),
            set.base,
            if self.context.debug() { "debug" } else { "release" }
        );
        self.builders = Some(set);
        self.dispatch_loads();
        self.on_potential_state_change();
        Ok(())
    }

    /// Show the loading indicator and queue a re-synchronization for the
    /// next tick, unless one is already queued.
    pub fn on_potential_state_change(&mut self) {
        self.page.set_loading_visible(true);
        if self.gate.trigger() {
            self.queue.defer(Deferred::Resynchronize);
        }
    }

    /// Check the location against the last snapshot; a difference triggers
    /// a re-synchronization. Returns true if the location changed.
    pub fn poll_location(&mut self) -> bool {
        let href = self.location.href();
        if !self.context.detector.observe(&href) {
            return false;
        }
        debug!("SyncEngine: location changed to {href}");
        self.on_potential_state_change();
        true
    }

    /// Deliver a resource. Repeated deliveries replace the payload.
    pub fn mark_arrived(&mut self, id: ResourceId, payload: Value) {
        let first = self.context.registry.mark_arrived(id.clone(), payload);
        debug!(
            "SyncEngine: {id} arrived{}",
            if first { "" } else { " again" }
        );
        self.on_potential_state_change();
    }

    /// Deliver a results bundle keyed by builder name. Returns the number of
    /// builders it contained.
    pub fn ingest_results(&mut self, bundle: Value) -> usize {
        let mut delivered = 0_usize;
        match bundle {
            Value::Object(builds) => {
                for (builder, results) in builds {
                    if builder == VERSION_KEY {
                        continue;
                    }
                    self.context
                        .registry
                        .mark_arrived(ResourceId::Results(builder), results);
                    delivered = delivered.saturating_add(1);
                }
            }
            other => warn!("SyncEngine: ignoring results bundle that is not an object: {other}"),
        }
        self.on_potential_state_change();
        delivered
    }

    /// Run the work deferred to this tick. Returns the number of tasks run.
    pub fn run_tick(&mut self) -> usize {
        let tasks = self.queue.drain();
        let count = tasks.len();
        for task in tasks {
            match task {
                Deferred::Resynchronize => self.resynchronize_and_render(),
            }
        }
        count
    }

    /// Write `params` into the state (each validated like a fragment
    /// parameter), replace the location with the permalink and queue one
    /// re-synchronization. Returns the keys that were written.
    pub fn set_query_parameters(&mut self, params: &[(&str, &str)]) -> Vec<String> {
        let validator = ParameterValidator::new(&self.page);
        let mut keys = Vec::with_capacity(params.len());
        for &(key, value) in params {
            match validator.accept(key, value, &mut self.context.state) {
                Ok(()) => keys.push(key.to_owned()),
                Err(err) => warn!("SyncEngine: {err}"),
            }
        }
        let permalink = self.permalink();
        self.location.replace(&permalink);
        self.context.detector.record(&self.location.href());
        self.on_potential_state_change();
        keys
    }

    /// Location path plus the fragment encoding the current state.
    pub fn permalink(&self) -> String {
        format!("{}#{}", self.location.pathname(), self.context.fragment())
    }

    fn resynchronize(&mut self) -> ParseReport {
        resynchronize(&mut self.context, &self.location, &self.page)
    }

    fn resynchronize_and_render(&mut self) {
        let _report = self.resynchronize();
        self.reload_if_test_type_changed();
        match self.gate.check(self.context.registry.is_complete()) {
            GateDecision::Wait => {
                let missing = self
                    .context
                    .registry
                    .missing()
                    .into_iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                debug!("SyncEngine: still waiting on {}", missing.join(", "));
            }
            GateDecision::Render => {
                let first = self.gate.is_first_render();
                self.page.render(&self.context);
                self.page.set_loading_visible(false);
                self.gate.rendered();
                if first {
                    info!(
                        "Time to first render: {}ms",
                        self.created_at.elapsed().as_millis()
                    );
                }
            }
        }
    }

    fn reload_if_test_type_changed(&mut self) {
        if self.builders.is_none()
            || self.dispatched_test_type.as_deref() == Some(self.context.test_type())
        {
            return;
        }
        info!(
            "SyncEngine: testType is now {}; reloading results",
            self.context.test_type()
        );
        self.dispatch_loads();
    }

    fn dispatch_loads(&mut self) {
        let Some(set) = self.builders.as_ref() else {
            return;
        };
        let test_type = self.context.test_type().to_owned();
        for entry in &set.builders {
            self.loader.request_load(LoadRequest {
                id: ResourceId::results(entry.name.as_str()),
                path: format!("{}{RESULTS_FILE}", set.results_dir(&test_type, entry)),
            });
        }
        match set.expectations_path(&test_type) {
            Some(path) => self.loader.request_load(LoadRequest {
                id: ResourceId::Expectations,
                path,
            }),
            None => warn!(
                "SyncEngine: no builder {:?} to load expectations from",
                set.expectations_source
            ),
        }
        self.dispatched_test_type = Some(test_type);
    }

    #[inline]
    pub const fn context(&self) -> &PageContext {
        &self.context
    }

    #[inline]
    pub const fn page(&self) -> &P {
        &self.page
    }

    #[inline]
    pub const fn page_mut(&mut self) -> &mut P {
        &mut self.page
    }

    #[inline]
    pub const fn loader(&self) -> &R {
        &self.loader
    }

    #[inline]
    pub const fn loader_mut(&mut self) -> &mut R {
        &mut self.loader
    }

    #[inline]
    pub const fn location(&self) -> &L {
        &self.location
    }

    /// Mutable access to the location, for hosts that navigate on the
    /// user's behalf. Changes are picked up by the next poll.
    #[inline]
    pub const fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    /// Builder set chosen at start.
    #[inline]
    pub const fn builders(&self) -> Option<&BuilderSet> {
        self.builders.as_ref()
    }

    #[inline]
    pub const fn gate_stats(&self) -> GateStats {
        self.gate.stats()
    }

    #[inline]
    pub const fn loading_visible(&self) -> bool {
        self.gate.loading_visible()
    }

    /// Tasks waiting for the next tick.
    #[inline]
    pub fn pending_tasks(&self) -> usize {
        self.queue.len()
    }
}
