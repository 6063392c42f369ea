//! Default state layers.

use crate::record::StateRecord;
use crate::validator::{DEBUG_KEY, TEST_TYPE_KEY};

/// Results family shown when the fragment names none.
pub const DEFAULT_TEST_TYPE: &str = "layout_test_results";

/// Defaults shared by every dashboard page.
pub fn cross_dashboard_defaults() -> StateRecord {
    let mut defaults = StateRecord::new();
    defaults.insert(TEST_TYPE_KEY, DEFAULT_TEST_TYPE);
    defaults.insert(DEBUG_KEY, false);
    defaults
}

/// Copy every key of `from` that `to` does not already have.
pub fn fill_missing(to: &mut StateRecord, from: &StateRecord) {
    for (key, value) in from {
        if !to.contains_key(key) {
            to.insert(key.clone(), value.clone());
        }
    }
}

/// Cross-dashboard defaults layered over page defaults.
///
/// Explicit values win over cross-dashboard defaults, which win over page
/// defaults. The layers are fixed once the table is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaultsTable {
    cross_page: StateRecord,
    page: StateRecord,
}

impl DefaultsTable {
    /// The standard cross-dashboard layer over the given page defaults.
    pub fn new(page: StateRecord) -> Self {
        Self::with_layers(cross_dashboard_defaults(), page)
    }

    pub const fn with_layers(cross_page: StateRecord, page: StateRecord) -> Self {
        Self { cross_page, page }
    }

    #[inline]
    pub const fn cross_page(&self) -> &StateRecord {
        &self.cross_page
    }

    #[inline]
    pub const fn page(&self) -> &StateRecord {
        &self.page
    }

    /// Fill keys missing from `state`, cross-dashboard layer first.
    pub fn fill(&self, state: &mut StateRecord) {
        fill_missing(state, &self.cross_page);
        fill_missing(state, &self.page);
    }
}

impl Default for DefaultsTable {
    fn default() -> Self {
        Self::new(StateRecord::new())
    }
}
