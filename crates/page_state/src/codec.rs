//! Fragment encoding: `key=value&key=value`, values percent-encoded.

use crate::error::ParamError;
use crate::record::StateRecord;
use log::warn;
use urlencoding::{decode as percent_decode, encode as percent_encode};

/// Result of splitting a fragment into parameter pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedFragment {
    /// Well-formed `(key, value)` pairs in fragment order, values decoded.
    pub pairs: Vec<(String, String)>,
    /// Segments that were skipped.
    pub malformed: Vec<ParamError>,
}

/// Split a fragment into decoded `(key, value)` pairs.
///
/// A leading `#` is ignored and an empty fragment has no parameters. Every
/// other segment must contain exactly one `=`; segments that don't, and values
/// that are not valid percent-encoded UTF-8, are reported and skipped without
/// affecting the rest of the fragment.
pub fn decode(fragment: &str) -> DecodedFragment {
    let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
    let mut decoded = DecodedFragment::default();
    if fragment.is_empty() {
        return decoded;
    }
    for segment in fragment.split('&') {
        match decode_segment(segment) {
            Some(pair) => decoded.pairs.push(pair),
            None => {
                warn!("Invalid query parameter: {segment}");
                decoded.malformed.push(ParamError::Malformed {
                    segment: segment.to_owned(),
                });
            }
        }
    }
    decoded
}

fn decode_segment(segment: &str) -> Option<(String, String)> {
    let (raw_key, raw_value) = segment.split_once('=')?;
    if raw_value.contains('=') {
        return None;
    }
    let key = percent_decode(raw_key).ok()?;
    let value = percent_decode(raw_value).ok()?;
    Some((key.into_owned(), value.into_owned()))
}

/// Serialize a record into a fragment (without the leading `#`).
pub fn encode(state: &StateRecord) -> String {
    state
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                percent_encode(key),
                percent_encode(&value.to_string())
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StateValue;

    fn pairs(fragment: &str) -> Vec<(String, String)> {
        decode(fragment).pairs
    }

    #[test]
    fn splits_and_decodes() {
        assert_eq!(
            pairs("#testType=layout_test_results&builder=Webkit%20Linux"),
            vec![
                ("testType".to_owned(), "layout_test_results".to_owned()),
                ("builder".to_owned(), "Webkit Linux".to_owned()),
            ]
        );
    }

    #[test]
    fn plus_is_not_a_space() {
        assert_eq!(pairs("tests=a+b"), vec![("tests".to_owned(), "a+b".to_owned())]);
    }

    #[test]
    fn malformed_segments_are_skipped() {
        let decoded = decode("a=1&novalue&b=2=3&c=4");
        assert_eq!(
            decoded.pairs,
            vec![("a".to_owned(), "1".to_owned()), ("c".to_owned(), "4".to_owned())]
        );
        assert_eq!(
            decoded.malformed,
            vec![
                ParamError::Malformed { segment: "novalue".to_owned() },
                ParamError::Malformed { segment: "b=2=3".to_owned() },
            ]
        );
    }

    #[test]
    fn bad_percent_escape_is_malformed() {
        let decoded = decode("a=%FF&b=ok");
        assert_eq!(decoded.pairs, vec![("b".to_owned(), "ok".to_owned())]);
        assert_eq!(decoded.malformed.len(), 1);
    }

    #[test]
    fn empty_fragment_has_no_parameters() {
        assert_eq!(decode(""), DecodedFragment::default());
        assert_eq!(decode("#"), DecodedFragment::default());
        assert_eq!(decode("a=1&").malformed.len(), 1);
    }

    #[test]
    fn empty_value_is_well_formed() {
        assert_eq!(pairs("debug="), vec![("debug".to_owned(), String::new())]);
    }

    #[test]
    fn encode_follows_insertion_order() {
        let mut state = StateRecord::new();
        state.insert("testType", "layout_test_results");
        state.insert("debug", StateValue::Flag(false));
        state.insert("tests", "fast/a b.html,c&d");

        assert_eq!(
            encode(&state),
            "testType=layout_test_results&debug=false&tests=fast%2Fa%20b.html%2Cc%26d"
        );
    }
}
