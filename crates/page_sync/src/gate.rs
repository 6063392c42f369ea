//! Bookkeeping for "render once everything has arrived".

/// What the engine should do after re-checking completeness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateDecision {
    /// Resources are still missing; keep the loading indicator up.
    Wait,
    /// Everything is present; render and hide the indicator.
    Render,
}

/// Counters describing how the gate has been exercised.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GateStats {
    /// Calls to the render callback.
    pub renders: u64,
    /// Times the registry went from incomplete to complete.
    pub transitions: u64,
    /// Triggers folded into an already queued re-synchronization.
    pub coalesced: u64,
    /// Checks that found resources still missing.
    pub waits: u64,
}

/// Tracks the loading indicator, the queued re-synchronization and whether
/// the last check found the page complete.
///
/// At most one re-synchronization is queued at a time, so a burst of triggers
/// within one tick produces a single check and at most one render.
#[derive(Debug, Default)]
pub struct RenderGate {
    armed: bool,
    loading_visible: bool,
    was_complete: bool,
    stats: GateStats,
}

impl RenderGate {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Note a potential state change. Returns true if a re-synchronization
    /// must be queued, false if one is already pending.
    pub fn trigger(&mut self) -> bool {
        self.loading_visible = true;
        if self.armed {
            self.stats.coalesced = self.stats.coalesced.saturating_add(1);
            return false;
        }
        self.armed = true;
        true
    }

    /// Resolve the queued re-synchronization against the current completeness.
    pub fn check(&mut self, complete: bool) -> GateDecision {
        self.armed = false;
        if !complete {
            self.was_complete = false;
            self.stats.waits = self.stats.waits.saturating_add(1);
            return GateDecision::Wait;
        }
        if !self.was_complete {
            self.was_complete = true;
            self.stats.transitions = self.stats.transitions.saturating_add(1);
        }
        GateDecision::Render
    }

    /// The render callback ran and the indicator was hidden.
    pub fn rendered(&mut self) {
        self.loading_visible = false;
        self.stats.renders = self.stats.renders.saturating_add(1);
    }

    /// A re-synchronization is queued and has not run yet.
    #[inline]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    #[inline]
    pub const fn loading_visible(&self) -> bool {
        self.loading_visible
    }

    #[inline]
    pub const fn stats(&self) -> GateStats {
        self.stats
    }

    /// True for the first render of the page.
    #[inline]
    pub const fn is_first_render(&self) -> bool {
        self.stats.renders == 0
    }
}
