//! Page-lifetime state shared by the engine's components.

use crate::detector::ChangeDetector;
use crate::host::Location;
use crate::registry::ResourceRegistry;
use page_state::{
    DEBUG_KEY, DefaultsTable, ParameterExtension, ParameterValidator, ParseReport, StateRecord,
    TEST_TYPE_KEY, encode,
};

/// Everything the engine mutates during a page's lifetime.
///
/// Render code only ever sees this through a shared borrow.
#[derive(Debug, Default)]
pub struct PageContext {
    pub(crate) state: StateRecord,
    pub(crate) registry: ResourceRegistry,
    pub(crate) detector: ChangeDetector,
    pub(crate) defaults: DefaultsTable,
}

impl PageContext {
    pub fn new(defaults: DefaultsTable) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    #[inline]
    pub const fn state(&self) -> &StateRecord {
        &self.state
    }

    #[inline]
    pub const fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    #[inline]
    pub const fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    #[inline]
    pub const fn defaults(&self) -> &DefaultsTable {
        &self.defaults
    }

    /// Current results family (`testType`).
    pub fn test_type(&self) -> &str {
        self.state
            .text(TEST_TYPE_KEY)
            .or_else(|| self.defaults.cross_page().text(TEST_TYPE_KEY))
            .unwrap_or_default()
    }

    #[inline]
    pub fn debug(&self) -> bool {
        self.state.flag(DEBUG_KEY)
    }

    /// Fragment encoding the current state.
    #[inline]
    pub fn fragment(&self) -> String {
        encode(&self.state)
    }
}

/// Re-derive page state from `location`: record the snapshot, apply the
/// fragment's parameters, then fill defaults.
pub fn resynchronize(
    context: &mut PageContext,
    location: &dyn Location,
    extension: &dyn ParameterExtension,
) -> ParseReport {
    context.detector.record(&location.href());
    let report = ParameterValidator::new(extension).apply(&location.fragment(), &mut context.state);
    context.defaults.fill(&mut context.state);
    report
}
