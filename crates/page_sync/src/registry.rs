//! Tracks which externally loaded resources the page is waiting on.

use crate::error::SyncError;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Identifier of one externally loaded resource.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceId {
    /// The results file of the named builder.
    Results(String),
    /// The shared test expectations file.
    Expectations,
}

impl ResourceId {
    #[inline]
    pub fn results<N: Into<String>>(builder: N) -> Self {
        Self::Results(builder.into())
    }
}

impl Display for ResourceId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Results(builder) => write!(formatter, "results[{builder}]"),
            Self::Expectations => formatter.write_str("expectations"),
        }
    }
}

/// Arrival state of a resource.
#[derive(Clone, Debug, PartialEq)]
pub enum ResourceEntry {
    Absent,
    Present {
        /// Most recently delivered payload.
        payload: Value,
        /// How many times the resource has been delivered.
        arrivals: u32,
    },
}

impl ResourceEntry {
    #[inline]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present { .. })
    }
}

/// Expected resources and everything that has arrived so far.
///
/// Once present, an entry never goes back to absent. Completeness depends only
/// on which resources are present, never on the order they arrived in.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    expected: Vec<ResourceId>,
    auxiliary: Option<ResourceId>,
    entries: HashMap<ResourceId, ResourceEntry>,
}

impl ResourceRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the set of resources required before rendering, plus the
    /// auxiliary resource that must also be present.
    ///
    /// # Errors
    /// Returns [`SyncError::AlreadyExpecting`] if the set was already fixed.
    pub fn expect<I: IntoIterator<Item = ResourceId>>(
        &mut self,
        ids: I,
        auxiliary: ResourceId,
    ) -> Result<(), SyncError> {
        if self.auxiliary.is_some() {
            return Err(SyncError::AlreadyExpecting);
        }
        for id in ids {
            if !self.expected.contains(&id) {
                self.entries.entry(id.clone()).or_insert(ResourceEntry::Absent);
                self.expected.push(id);
            }
        }
        self.entries
            .entry(auxiliary.clone())
            .or_insert(ResourceEntry::Absent);
        self.auxiliary = Some(auxiliary);
        Ok(())
    }

    /// Record a delivery of `id`. Repeated deliveries replace the payload.
    ///
    /// Returns true on the first delivery of `id`.
    pub fn mark_arrived(&mut self, id: ResourceId, payload: Value) -> bool {
        if !self.is_expected(&id) {
            debug!("ResourceRegistry: {id} arrived but was never expected");
        }
        let entry = self.entries.entry(id).or_insert(ResourceEntry::Absent);
        match entry {
            ResourceEntry::Absent => {
                *entry = ResourceEntry::Present {
                    payload,
                    arrivals: 1,
                };
                true
            }
            ResourceEntry::Present {
                payload: stored,
                arrivals,
            } => {
                *stored = payload;
                *arrivals = arrivals.saturating_add(1);
                false
            }
        }
    }

    /// Every expected resource and the auxiliary resource have arrived.
    pub fn is_complete(&self) -> bool {
        let Some(auxiliary) = self.auxiliary.as_ref() else {
            return false;
        };
        self.is_present(auxiliary) && self.expected.iter().all(|id| self.is_present(id))
    }

    /// Required resources still absent, auxiliary last.
    pub fn missing(&self) -> Vec<&ResourceId> {
        let mut missing: Vec<&ResourceId> = self
            .expected
            .iter()
            .filter(|id| !self.is_present(id))
            .collect();
        if let Some(auxiliary) = self.auxiliary.as_ref()
            && !self.is_present(auxiliary)
            && !missing.contains(&auxiliary)
        {
            missing.push(auxiliary);
        }
        missing
    }

    #[inline]
    pub fn is_present(&self, id: &ResourceId) -> bool {
        self.entries.get(id).is_some_and(ResourceEntry::is_present)
    }

    #[inline]
    pub fn is_expected(&self, id: &ResourceId) -> bool {
        self.expected.contains(id) || self.auxiliary.as_ref() == Some(id)
    }

    /// Latest payload delivered for `id`.
    pub fn payload(&self, id: &ResourceId) -> Option<&Value> {
        match self.entries.get(id) {
            Some(ResourceEntry::Present { payload, .. }) => Some(payload),
            _ => None,
        }
    }

    /// Number of deliveries of `id` so far.
    pub fn arrivals(&self, id: &ResourceId) -> u32 {
        match self.entries.get(id) {
            Some(ResourceEntry::Present { arrivals, .. }) => *arrivals,
            _ => 0,
        }
    }

    /// Number of distinct resources that have arrived.
    pub fn arrived_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.is_present())
            .count()
    }

    /// Required resources in the order they were expected.
    #[inline]
    pub fn expected(&self) -> &[ResourceId] {
        &self.expected
    }

    #[inline]
    pub const fn auxiliary(&self) -> Option<&ResourceId> {
        self.auxiliary.as_ref()
    }
}
