use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Misuse of the synchronization engine's setup API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// `expect` was called on a registry that already has its resource set.
    AlreadyExpecting,
    /// The engine was started twice.
    AlreadyStarted,
}

impl Display for SyncError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::AlreadyExpecting => {
                formatter.write_str("expected resources are fixed for the page lifetime")
            }
            Self::AlreadyStarted => formatter.write_str("engine already started"),
        }
    }
}

impl Error for SyncError {}
