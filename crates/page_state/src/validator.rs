//! Per-key validation and coercion of fragment parameters.
//!
//! Cross-dashboard keys (`testType`, `debug`) are handled here; every other
//! key is offered to the hosting page through [`ParameterExtension`].

use crate::codec::decode;
use crate::error::ParamError;
use crate::record::{StateRecord, StateValue};
use log::warn;

/// Name of the results family the dashboard reads (`layout_test_results`, ...).
pub const TEST_TYPE_KEY: &str = "testType";
/// Switches resource loading to a local debug tree.
pub const DEBUG_KEY: &str = "debug";

/// Page-specific parameter handling.
///
/// A page accepts the keys it understands and may coerce their values. Keys
/// it does not accept are dropped and reported; nothing is accepted by default.
pub trait ParameterExtension {
    /// Whether `key` is a page parameter and `value` is acceptable for it.
    fn accept_parameter(&self, key: &str, value: &str) -> bool {
        let _unused = (key, value);
        false
    }

    /// Convert an accepted value into its stored form. Text by default.
    fn coerce_parameter(&self, key: &str, value: &str) -> StateValue {
        let _unused = key;
        StateValue::Text(value.to_owned())
    }
}

/// Extension for pages without parameters of their own.
#[derive(Clone, Copy, Debug, Default)]
pub struct RejectUnknown;

impl ParameterExtension for RejectUnknown {}

/// True if `value` contains at least one of `[A-Za-z0-9-_,]`.
#[inline]
pub fn is_valid_name(value: &str) -> bool {
    value
        .chars()
        .any(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '_' | ','))
}

/// Outcome of applying a whole fragment to a record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseReport {
    /// Keys written, in fragment order (repeated keys appear repeatedly).
    pub accepted: Vec<String>,
    /// Segments that could not be split into a pair.
    pub malformed: Vec<ParamError>,
    /// Pairs whose key or value was refused.
    pub rejected: Vec<ParamError>,
}

impl ParseReport {
    /// Nothing was skipped.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.malformed.is_empty() && self.rejected.is_empty()
    }
}

/// Validates fragment parameters and writes accepted ones into a record.
#[derive(Clone, Copy)]
pub struct ParameterValidator<'ext> {
    extension: &'ext dyn ParameterExtension,
}

impl<'ext> ParameterValidator<'ext> {
    #[inline]
    pub fn new(extension: &'ext dyn ParameterExtension) -> Self {
        Self { extension }
    }

    /// Validate one parameter and, if acceptable, store its coerced value.
    ///
    /// # Errors
    /// Returns [`ParamError::InvalidValue`] when the value fails a built-in
    /// check or the page extension refuses the key. `state` is untouched then.
    pub fn accept(&self, key: &str, value: &str, state: &mut StateRecord) -> Result<(), ParamError> {
        match key {
            TEST_TYPE_KEY => {
                if !is_valid_name(value) {
                    return Err(invalid(key, value));
                }
                state.insert(key, value);
            }
            DEBUG_KEY => state.insert(key, value == "true"),
            _ => {
                if !self.extension.accept_parameter(key, value) {
                    return Err(invalid(key, value));
                }
                state.insert(key, self.extension.coerce_parameter(key, value));
            }
        }
        Ok(())
    }

    /// Decode `fragment` and apply every pair to `state` in order.
    ///
    /// Rejected pairs are summarized in a single diagnostic line.
    pub fn apply(&self, fragment: &str, state: &mut StateRecord) -> ParseReport {
        let decoded = decode(fragment);
        let mut report = ParseReport {
            malformed: decoded.malformed,
            ..ParseReport::default()
        };
        for (key, value) in decoded.pairs {
            match self.accept(&key, &value, state) {
                Ok(()) => report.accepted.push(key),
                Err(err) => report.rejected.push(err),
            }
        }
        if !report.rejected.is_empty() {
            let listed = report
                .rejected
                .iter()
                .map(ParamError::describe)
                .collect::<Vec<_>>()
                .join(",");
            warn!("Invalid query parameters: {listed}");
        }
        report
    }
}

fn invalid(key: &str, value: &str) -> ParamError {
    ParamError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ShowTests;

    impl ParameterExtension for ShowTests {
        fn accept_parameter(&self, key: &str, value: &str) -> bool {
            match key {
                "tests" => true,
                "showWontFix" => value == "true" || value == "false",
                _ => false,
            }
        }

        fn coerce_parameter(&self, key: &str, value: &str) -> StateValue {
            if key == "showWontFix" {
                StateValue::Flag(value == "true")
            } else {
                StateValue::Text(value.to_owned())
            }
        }
    }

    #[test]
    fn valid_names() {
        assert!(is_valid_name("layout-tests_2"));
        assert!(is_valid_name("a,b"));
        assert!(is_valid_name("has space!"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("!@# $"));
    }

    #[test]
    fn debug_is_strictly_true() {
        let validator = ParameterValidator::new(&RejectUnknown);
        for (raw, expected) in [("true", true), ("TRUE", false), ("1", false), ("", false)] {
            let mut state = StateRecord::new();
            assert_eq!(validator.accept(DEBUG_KEY, raw, &mut state), Ok(()));
            assert_eq!(state.get(DEBUG_KEY), Some(&StateValue::Flag(expected)), "debug={raw}");
        }
    }

    #[test]
    fn rejected_test_type_keeps_prior_value() {
        let validator = ParameterValidator::new(&RejectUnknown);
        let mut state = StateRecord::new();
        state.insert(TEST_TYPE_KEY, "ui_tests");

        let result = validator.accept(TEST_TYPE_KEY, "", &mut state);

        assert!(matches!(result, Err(ParamError::InvalidValue { .. })));
        assert_eq!(state.text(TEST_TYPE_KEY), Some("ui_tests"));
    }

    #[test]
    fn unknown_keys_go_through_the_extension() {
        let validator = ParameterValidator::new(&ShowTests);
        let mut state = StateRecord::new();

        let report = validator.apply("tests=fast/a.html&showWontFix=true&showWontFix=maybe&bogus=1", &mut state);

        assert_eq!(report.accepted, vec!["tests", "showWontFix"]);
        assert_eq!(
            report.rejected,
            vec![
                ParamError::InvalidValue { key: "showWontFix".to_owned(), value: "maybe".to_owned() },
                ParamError::InvalidValue { key: "bogus".to_owned(), value: "1".to_owned() },
            ]
        );
        assert!(state.flag("showWontFix"));
        assert!(!state.contains_key("bogus"));
    }

    #[test]
    fn last_write_wins() {
        let validator = ParameterValidator::new(&RejectUnknown);
        let mut state = StateRecord::new();

        let report = validator.apply("testType=first&testType=second", &mut state);

        assert!(report.is_clean());
        assert_eq!(state.text(TEST_TYPE_KEY), Some("second"));
    }
}
