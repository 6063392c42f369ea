use log::trace;

/// Remembers the last location the engine processed.
///
/// A poll (or a navigation event) reports a change only when the observed
/// location differs from the stored snapshot, so each distinct change is
/// handled once. After the engine writes the location itself it calls
/// [`ChangeDetector::record`], which keeps the next poll from re-triggering.
#[derive(Debug, Default)]
pub struct ChangeDetector {
    snapshot: Option<String>,
    changes: u64,
}

impl ChangeDetector {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `href` with the snapshot. Returns true and stores `href` if they differ.
    pub fn observe(&mut self, href: &str) -> bool {
        if self.snapshot.as_deref() == Some(href) {
            return false;
        }
        trace!("ChangeDetector: location changed to {href}");
        self.snapshot = Some(href.to_owned());
        self.changes = self.changes.saturating_add(1);
        true
    }

    /// Overwrite the snapshot without reporting a change.
    #[inline]
    pub fn record(&mut self, href: &str) {
        if self.snapshot.as_deref() != Some(href) {
            self.snapshot = Some(href.to_owned());
        }
    }

    #[inline]
    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Number of changes reported by [`ChangeDetector::observe`].
    #[inline]
    pub const fn changes(&self) -> u64 {
        self.changes
    }
}
