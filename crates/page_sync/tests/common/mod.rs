//! Shared fixtures for the engine integration tests.
#![allow(dead_code, reason = "each test binary uses a subset of the fixtures")]

use page_state::{ParameterExtension, StateValue};
use page_sync::{
    BuilderEntry, BuilderSet, BuilderTables, DashboardPage, LoadRequest, MemoryLocation,
    PageContext, ResourceLoader, SyncEngine,
};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Two release builders and one local debug builder.
pub fn tables() -> BuilderTables {
    BuilderTables {
        release: BuilderSet {
            base: String::from("results/"),
            builders: vec![BuilderEntry::new("A", "a-rel"), BuilderEntry::new("B", "b-dbg")],
            expectations_source: Some(String::from("A")),
        },
        debug: BuilderSet {
            base: String::from("../../Debug/"),
            builders: vec![BuilderEntry::new("Local", "")],
            expectations_source: None,
        },
    }
}

/// Remembers every load request.
#[derive(Default)]
pub struct RecordingLoader {
    pub requests: Vec<LoadRequest>,
}

impl ResourceLoader for RecordingLoader {
    fn request_load(&mut self, request: LoadRequest) {
        self.requests.push(request);
    }
}

/// Records each render (as the fragment it saw) and indicator change.
#[derive(Default)]
pub struct RecordingPage {
    pub renders: Vec<String>,
    pub indicator: Vec<bool>,
}

impl ParameterExtension for RecordingPage {
    fn accept_parameter(&self, key: &str, _value: &str) -> bool {
        matches!(key, "tests" | "showExpectations")
    }

    fn coerce_parameter(&self, key: &str, value: &str) -> StateValue {
        if key == "showExpectations" {
            StateValue::Flag(value == "true")
        } else {
            StateValue::Text(value.to_owned())
        }
    }
}

impl DashboardPage for RecordingPage {
    fn render(&mut self, context: &PageContext) {
        self.renders.push(context.fragment());
    }

    fn set_loading_visible(&mut self, visible: bool) {
        self.indicator.push(visible);
    }
}

pub type TestEngine = SyncEngine<MemoryLocation, RecordingLoader, RecordingPage>;

pub fn engine_at(href: &str) -> TestEngine {
    init_logging();
    let location = MemoryLocation::new(href).unwrap();
    SyncEngine::new(
        location,
        RecordingLoader::default(),
        RecordingPage::default(),
        tables(),
    )
}

pub fn started_engine(href: &str) -> TestEngine {
    let mut engine = engine_at(href);
    engine.start().unwrap();
    engine
}
