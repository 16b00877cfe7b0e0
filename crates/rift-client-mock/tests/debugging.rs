//! Rule debugger behaviour as seen from a mock session.
//!
//! Each test records debugger output through a `RecordingSink` and checks
//! the exact explanation lines.

use rift_client_mock::{ClientMock, Method, MockError, MockResponse, RecordingSink, ValueMatcher};
use std::sync::Arc;

fn session() -> (ClientMock, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let mock = ClientMock::with_sink("http://localhost", sink.clone()).expect("valid base URL");
    (mock, sink)
}

fn has(lines: &[String], expected: &str) -> bool {
    lines.iter().any(|line| line == expected)
}

#[test]
fn disabled_debugger_records_nothing() {
    let (mock, sink) = session();
    mock.on_get("/admin").respond_with(MockResponse::text("admin")).unwrap();

    assert!(mock.get("http://localhost/login").is_err());
    assert_eq!(mock.get("http://localhost/admin").unwrap().body_text(), "admin");

    assert!(sink.requests().is_empty());
    assert!(sink.matching().is_empty());
    assert!(sink.not_matching().is_empty());
}

#[test]
fn only_requests_executed_while_enabled_are_recorded() {
    let (mock, sink) = session();
    mock.on_get("/login").register().unwrap();
    mock.on_get("/user").register().unwrap();
    mock.on_get("/admin").register().unwrap();

    mock.debug_on();
    mock.get("http://localhost/login").unwrap();
    mock.get("http://localhost/user").unwrap();
    mock.debug_off();
    mock.get("http://localhost/admin").unwrap();

    let requests = sink.requests();
    assert!(has(&requests, "http://localhost/login"));
    assert!(has(&requests, "http://localhost/user"));
    assert!(!has(&requests, "http://localhost/admin"));
}

#[test]
fn toggling_off_stops_messages_without_retroactive_output() {
    let (mock, sink) = session();
    mock.on_get("/admin").register().unwrap();

    mock.debug_on();
    let _ = mock.get("/login");
    mock.get("/admin").unwrap();
    let before = (sink.matching().len(), sink.not_matching().len());
    assert!(before.0 > 0 && before.1 > 0);

    mock.debug_off();
    let _ = mock.get("/login");
    mock.get("/admin").unwrap();
    assert_eq!((sink.matching().len(), sink.not_matching().len()), before);
    assert_eq!(sink.requests().len(), 2);
}

#[test]
fn header_condition() {
    let (mock, sink) = session();
    mock.on_get("/login")
        .with_header("User-Agent", "Mozilla")
        .respond_with(MockResponse::text("mozilla"))
        .unwrap();

    let mozilla = mock
        .request(Method::GET, "/login")
        .header("User-Agent", "Mozilla")
        .build()
        .unwrap();
    let chrome = mock
        .request(Method::GET, "/login")
        .header("User-Agent", "Chrome")
        .build()
        .unwrap();

    mock.debug_on();
    mock.execute(&mozilla).unwrap();
    assert!(mock.execute(&chrome).is_err());
    mock.debug_off();

    assert!(has(&sink.matching(), "header User-Agent is \"Mozilla\""));
    assert!(has(&sink.not_matching(), "header User-Agent is \"Mozilla\""));
    assert!(!has(&sink.not_matching(), "header User-Agent is \"Chrome\""));
    assert!(!has(&sink.not_matching(), "header User-Agent is redundant"));
}

#[test]
fn missing_parameter() {
    let (mock, sink) = session();
    mock.on_get("/login").with_parameter("foo", "bar").register().unwrap();

    mock.debug_on();
    assert!(mock.get("http://localhost/login").is_err());

    let not_matching = sink.not_matching();
    assert!(has(&not_matching, "parameter foo occurs in request"));
    assert!(has(&not_matching, "parameter foo is \"bar\""));
}

#[test]
fn matching_parameter() {
    let (mock, sink) = session();
    mock.on_get("/login").with_parameter("foo", "bar").register().unwrap();

    mock.debug_on();
    mock.get("http://localhost/login?foo=bar").unwrap();
    assert!(has(&sink.matching(), "parameter foo is \"bar\""));
    assert!(sink.not_matching().is_empty());
}

#[test]
fn not_matching_parameter_shows_expected_value() {
    let (mock, sink) = session();
    mock.on_get("/login").with_parameter("foo", "bar").register().unwrap();

    mock.debug_on();
    assert!(matches!(
        mock.get("http://localhost/login?foo=bbb"),
        Err(MockError::NoMatchingRule { .. })
    ));
    assert_eq!(sink.not_matching(), vec!["parameter foo is \"bar\""]);
}

#[test]
fn redundant_parameter() {
    let (mock, sink) = session();
    mock.on_get("/login").register().unwrap();

    mock.debug_on();
    mock.get("http://localhost/login?foo=bbb").unwrap();

    let not_matching = sink.not_matching();
    assert_eq!(
        not_matching.iter().filter(|l| *l == "parameter foo is redundant").count(),
        1
    );
    assert!(!sink.matching().iter().any(|l| l.starts_with("parameter foo")));
}

#[test]
fn all_parameter_matchers_in_one_message() {
    let (mock, sink) = session();
    mock.on_get("/login")
        .with_parameter("foo", ValueMatcher::starts_with("a"))
        .with_parameter("foo", ValueMatcher::ends_with("b"))
        .register()
        .unwrap();

    mock.debug_on();
    mock.get("http://localhost/login?foo=aabb").unwrap();
    assert!(has(
        &sink.matching(),
        "parameter foo is a string starting with \"a\" and a string ending with \"b\""
    ));
}

#[test]
fn not_matching_reference() {
    let (mock, sink) = session();
    mock.on_get("/login#foo").register().unwrap();

    mock.debug_on();
    assert!(mock.get("http://localhost/login").is_err());
    assert!(has(&sink.not_matching(), "reference is \"foo\""));
}

#[test]
fn matching_reference() {
    let (mock, sink) = session();
    mock.on_get("/login#foo").register().unwrap();

    mock.debug_on();
    mock.get("http://localhost/login#foo").unwrap();
    assert!(has(&sink.matching(), "reference is \"foo\""));
}

#[test]
fn no_reference_message_when_unused_on_both_sides() {
    let (mock, sink) = session();
    mock.on_get("/login").register().unwrap();

    mock.debug_on();
    mock.get("http://localhost/login").unwrap();
    assert!(!sink.matching().iter().any(|l| l.starts_with("reference")));
    assert!(!sink.not_matching().iter().any(|l| l.starts_with("reference")));
}

#[test]
fn undeclared_request_reference() {
    let (mock, sink) = session();
    mock.on_get("/login").register().unwrap();

    mock.debug_on();
    mock.get("http://localhost/login#top").unwrap();
    assert!(has(&sink.not_matching(), "reference is \"top\""));
}

#[test]
fn matching_http_method() {
    let (mock, sink) = session();
    mock.on_get("/login").register().unwrap();

    mock.debug_on();
    mock.get("http://localhost/login").unwrap();
    assert!(has(&sink.matching(), "HTTP method is GET"));
}

#[test]
fn not_matching_http_method() {
    let (mock, sink) = session();
    mock.on_get("/login").register().unwrap();

    mock.debug_on();
    assert!(mock.post("http://localhost/login", "").is_err());
    assert!(has(&sink.not_matching(), "HTTP method is GET"));
}

#[test]
fn not_matching_url() {
    let (mock, sink) = session();
    mock.on_get("http://localhost:8080/login").register().unwrap();

    mock.debug_on();
    assert!(mock.post("https://www.google.com", "").is_err());

    let not_matching = sink.not_matching();
    assert!(has(&not_matching, "schema is \"http\""));
    assert!(has(&not_matching, "host is \"localhost\""));
    assert!(has(&not_matching, "path is \"/login\""));
    assert!(has(&not_matching, "port is <8080>"));
}

#[test]
fn matching_url() {
    let (mock, sink) = session();
    mock.on_get("http://localhost:8080/login").register().unwrap();

    mock.debug_on();
    assert!(mock.post("http://localhost:8080/login", "").is_err());

    let matching = sink.matching();
    assert!(has(&matching, "schema is \"http\""));
    assert!(has(&matching, "host is \"localhost\""));
    assert!(has(&matching, "path is \"/login\""));
    assert!(has(&matching, "port is <8080>"));
    assert!(has(&sink.not_matching(), "HTTP method is GET"));
}

#[test]
fn explanation_corroborates_actual_match() {
    let (mock, sink) = session();
    mock.on_get("/login").with_parameter("foo", "bar").register().unwrap();
    mock.on_get("/login").register().unwrap();

    mock.debug_on();
    mock.get("http://localhost/login?foo=bar").unwrap();
    // the first rule matched, so nothing about foo is redundant
    assert!(sink.not_matching().is_empty());
    assert_eq!(mock.registry().snapshot()[0].invocations(), 1);
    assert_eq!(mock.registry().snapshot()[1].invocations(), 0);
}

#[test]
fn repeated_parameter_in_rule_url() {
    let (mock, sink) = session();
    mock.on_get("/login?foo=bar&foo=baz").register().unwrap();
    assert!(mock.get("/login?foo=bar&foo=baz").is_ok());

    mock.debug_on();
    assert!(mock.get("/login?foo=bar").is_err());
    assert!(has(&sink.matching(), "parameter foo is \"bar\""));
    assert_eq!(sink.not_matching(), vec!["parameter foo is \"baz\""]);
}
