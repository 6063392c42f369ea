use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Problems found while turning a fragment into page state.
///
/// None of these abort processing: the offending segment or key is skipped,
/// reported, and the remaining parameters are still applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamError {
    /// A fragment segment without exactly one `=`, or whose value is not
    /// valid percent-encoded UTF-8.
    Malformed {
        /// The raw segment as it appeared in the fragment.
        segment: String,
    },
    /// A recognized key with an unacceptable value, or a key no handler accepted.
    InvalidValue {
        /// Parameter name.
        key: String,
        /// Decoded parameter value.
        value: String,
    },
}

impl ParamError {
    /// The `key=value` form used in the summary diagnostic.
    pub fn describe(&self) -> String {
        match self {
            Self::Malformed { segment } => segment.clone(),
            Self::InvalidValue { key, value } => format!("{key}={value}"),
        }
    }
}

impl Display for ParamError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Malformed { segment } => write!(formatter, "Invalid query parameter: {segment}"),
            Self::InvalidValue { key, value } => {
                write!(formatter, "{key} value is not valid: {value}")
            }
        }
    }
}

impl Error for ParamError {}
