//! Error wrapping and flattening seen from a downstream crate.

use std::error::Error;

use fieldlog::error::Fielder;
use fieldlog::{
    error_fields, fields, to_fields, wrap, wrap_with_context, wrap_with_context_and_stack, Fields, ResultExt,
    WrappedError,
};

#[inline(never)]
fn wrap_for_caller(message: &str) -> WrappedError {
    wrap_with_context_and_stack(None, message, Fields::new(), 1)
}

#[test]
fn test_stack_skip_attributes_helper_caller() {
    let err = wrap_for_caller("lookup failed");
    let line = line!() - 1;

    let frame = err.frame().expect("caller frame resolved from debug info");
    assert!(frame.file.ends_with("wrapping.rs"));
    assert_eq!(frame.line, line);
    if let Some(function) = &frame.function {
        assert!(function.ends_with("test_stack_skip_attributes_helper_caller"));
    }
}

#[test]
fn test_example_scenario() {
    let e = wrap(None, "db failure");
    let e2 = wrap_with_context(Some(e.into()), "request failed", fields! { "code" => 500 });
    let fields = to_fields(&e2);

    assert_eq!(fields["message"], "request failed");
    assert_eq!(fields["code"], 500);
    assert_eq!(fields["innerError"]["message"], "db failure");
    assert!(fields["innerError"]["file"].as_str().unwrap().ends_with("wrapping.rs"));

    let mut keys: Vec<&str> = fields.keys().map(String::as_str).filter(|k| *k != "function").collect();
    keys.sort();
    assert_eq!(keys, vec!["code", "file", "innerError", "line", "message"]);
}

#[test]
fn test_absent_error_flattens_to_none() {
    assert!(error_fields(None).is_none());
}

#[test]
fn test_error_fields_on_present_error() {
    let err = wrap(None, "present");
    let fields = error_fields(Some(&err)).unwrap();
    assert_eq!(fields, err.to_fields());
}

#[test]
fn test_three_level_chain() {
    let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timed out");
    let err = wrap(Some(wrap(Some(io.into()), "query users").into()), "render dashboard");
    let fields = to_fields(&err);

    assert_eq!(fields["innerError"]["message"], "query users");
    assert_eq!(fields["innerError"]["innerError"]["error"], "socket timed out");

    let chain: Vec<String> = std::iter::successors(Some(&err as &(dyn Error + 'static)), |e| (*e).source())
        .map(|e| e.to_string())
        .collect();
    assert_eq!(chain, vec!["render dashboard", "query users", "socket timed out"]);
}

#[test]
fn test_result_ext_in_downstream_code() {
    fn parse_port(raw: &str) -> Result<u16, WrappedError> {
        raw.parse::<u16>()
            .wrap_err_with_context("invalid port", fields! { "raw" => raw })
    }

    let err = parse_port("http").unwrap_err();
    let fields = err.to_fields();
    assert_eq!(fields["raw"], "http");
    assert_eq!(fields["message"], "invalid port");
    assert!(fields["innerError"]["error"].is_string());
}
