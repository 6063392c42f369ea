//! End-to-end checks of fragment → state → fragment handling.

use page_state::{
    DEBUG_KEY, DefaultsTable, ParameterValidator, RejectUnknown, StateRecord, StateValue,
    TEST_TYPE_KEY, cross_dashboard_defaults, decode, encode,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parse a fragment into a fresh record and fill defaults, as a page load does.
fn load(fragment: &str) -> StateRecord {
    let mut state = StateRecord::new();
    let _report = ParameterValidator::new(&RejectUnknown).apply(fragment, &mut state);
    DefaultsTable::default().fill(&mut state);
    state
}

#[test]
fn decode_encode_decode_is_stable() {
    init_logging();
    let fragments = [
        "testType=layout_test_results&debug=true",
        "tests=fast%2Fcss%2Fa.html%2Cfast%2Fdom&builder=Webkit%20(dbg)(1)",
        "a=&b=%26%3D%23&c=%E2%9C%93",
        "",
    ];
    for fragment in fragments {
        let first = decode(fragment).pairs;
        let record: StateRecord = first.iter().map(|(key, value)| (key.as_str(), value.as_str())).collect();
        let second = decode(&encode(&record)).pairs;
        assert_eq!(first, second, "round trip of {fragment:?}");
    }
}

#[test]
fn malformed_segment_does_not_block_others() {
    init_logging();
    let state = load("testType=ui_tests&oops&debug=true&x=1=2");

    assert_eq!(state.text(TEST_TYPE_KEY), Some("ui_tests"));
    assert!(state.flag(DEBUG_KEY));
    assert!(!state.contains_key("oops"));
    assert!(!state.contains_key("x"));
}

#[test]
fn debug_flag_semantics() {
    init_logging();
    assert_eq!(load("debug=true").get(DEBUG_KEY), Some(&StateValue::Flag(true)));
    for fragment in ["debug=TRUE", "debug=1", "debug="] {
        assert_eq!(load(fragment).get(DEBUG_KEY), Some(&StateValue::Flag(false)), "{fragment}");
    }
    assert_eq!(
        load("testType=x").get(DEBUG_KEY),
        cross_dashboard_defaults().get(DEBUG_KEY)
    );
}

#[test]
fn test_type_validation() {
    init_logging();
    assert_eq!(load("testType=layout-tests_2").text(TEST_TYPE_KEY), Some("layout-tests_2"));
    assert_eq!(
        load("testType=").text(TEST_TYPE_KEY),
        cross_dashboard_defaults().text(TEST_TYPE_KEY)
    );
}

#[test]
fn state_persists_across_reparses() {
    init_logging();
    let validator = ParameterValidator::new(&RejectUnknown);
    let mut state = StateRecord::new();
    let _first = validator.apply("testType=ui_tests", &mut state);

    let report = validator.apply("testType=", &mut state);

    assert_eq!(report.rejected.len(), 1);
    assert_eq!(state.text(TEST_TYPE_KEY), Some("ui_tests"));
}
