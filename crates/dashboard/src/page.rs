//! A headless dashboard page that logs a summary of the loaded results.

use log::{debug, info};
use page_state::{ParameterExtension, is_valid_name};
use page_sync::{DashboardPage, EngineEvent, EventSender, PageContext, ResourceId};
use serde_json::Value;

/// Restricts the summary to one builder.
pub const BUILDER_KEY: &str = "builder";
/// Comma-separated test paths to report on.
pub const TESTS_KEY: &str = "tests";

/// Logs one line per builder on every render.
///
/// When built with a shutdown channel the page stops the driver after its
/// first render.
pub struct SummaryPage {
    shutdown: Option<EventSender>,
    renders: u64,
}

impl SummaryPage {
    pub const fn new(shutdown: Option<EventSender>) -> Self {
        Self {
            shutdown,
            renders: 0,
        }
    }

    #[inline]
    pub const fn renders(&self) -> u64 {
        self.renders
    }
}

/// Number of entries in a payload: object keys, array items, else 1.
fn entry_count(payload: &Value) -> usize {
    match payload {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        Value::Null => 0,
        _ => 1,
    }
}

impl ParameterExtension for SummaryPage {
    fn accept_parameter(&self, key: &str, value: &str) -> bool {
        match key {
            BUILDER_KEY => is_valid_name(value),
            TESTS_KEY => !value.is_empty(),
            _ => false,
        }
    }
}

impl DashboardPage for SummaryPage {
    fn render(&mut self, context: &PageContext) {
        self.renders = self.renders.saturating_add(1);
        let registry = context.registry();
        let only = context.state().text(BUILDER_KEY);
        info!("{} results for #{}", context.test_type(), context.fragment());
        for id in registry.expected() {
            let ResourceId::Results(builder) = id else {
                continue;
            };
            if only.is_some_and(|name| name != builder) {
                continue;
            }
            let entries = registry.payload(id).map_or(0, entry_count);
            info!("  {builder}: {entries} entries");
        }
        if let Some(tests) = context.state().text(TESTS_KEY) {
            info!("  tests: {}", tests.split(',').collect::<Vec<_>>().join(" "));
        }
        let expectations = registry
            .payload(&ResourceId::Expectations)
            .map_or(0, entry_count);
        info!("  expectations: {expectations} entries");

        if let Some(shutdown) = self.shutdown.take()
            && shutdown.send(EngineEvent::Shutdown).is_err()
        {
            debug!("SummaryPage: driver already stopped");
        }
    }

    fn set_loading_visible(&mut self, visible: bool) {
        debug!("SummaryPage: loading indicator {}", if visible { "shown" } else { "hidden" });
    }
}
