//! Permalinkable page state for results dashboards.
//!
//! This crate owns the mapping between the URL fragment (`#testType=...&debug=true`)
//! and the in-memory [`StateRecord`]: decoding and encoding fragments, validating
//! and coercing individual parameters, and layering default values underneath
//! whatever the fragment spelled out explicitly.

pub mod codec;
pub mod defaults;
pub mod error;
pub mod record;
pub mod validator;

pub use codec::{DecodedFragment, decode, encode};
pub use defaults::{DEFAULT_TEST_TYPE, DefaultsTable, cross_dashboard_defaults, fill_missing};
pub use error::ParamError;
pub use record::{StateRecord, StateValue};
pub use validator::{
    DEBUG_KEY, ParameterExtension, ParameterValidator, ParseReport, RejectUnknown, TEST_TYPE_KEY,
    is_valid_name,
};
