//! End-to-end behaviour of the redirect filter against strict hosts.

use std::sync::Arc;

use axum::http::header::{HeaderValue, CONTENT_LENGTH};
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use xsendfile_filter::{xsendfile, Application, Body, Environ, GatewayError, Responder, X_REDIRECT_MAP};

mod common;

use common::{get_response, Call, DummyException, DummyFile, DummyFileWrapper, RecordingResponder};

fn file_app_for(path: &'static str) -> impl Fn(&mut Environ, &mut dyn Responder) -> Result<Body, GatewayError> + Send + Sync {
    move |environ: &mut Environ, responder: &mut dyn Responder| {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("7"));
        headers.append("x-accel-redirect", HeaderValue::from_static("/stale/"));
        responder.start_response(StatusCode::OK, headers, None)?;
        Ok(environ.send_file(DummyFile::boxed(path, b"content"), 4096))
    }
}

fn environ_with_map(map: &str) -> Environ {
    Environ::new().with_var(X_REDIRECT_MAP, map)
}

#[test]
fn test_x_accel_redirect() {
    let app = xsendfile(file_app_for("/path/fn"));
    let response = get_response(&app, &mut environ_with_map("/path/=/mapped/")).unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header_values("x-accel-redirect"), vec!["/mapped/fn"]);
    assert!(response.header_values("content-length").is_empty());
    assert!(response.chunks().is_empty());
}

#[test]
fn test_documented_mapping_example() {
    let app = xsendfile(file_app_for("/var/www/img/a.png"));
    let response = get_response(&app, &mut environ_with_map("/var/www/=/files/")).unwrap();
    assert_eq!(response.header_values("X-Accel-Redirect"), vec!["/files/img/a.png"]);
}

#[test]
fn test_first_listed_rule_wins() {
    let app = xsendfile(file_app_for("/a/b/c"));
    let response = get_response(&app, &mut environ_with_map("/a/=/x/,/a/b/=/y/")).unwrap();
    assert_eq!(response.header_values("X-Accel-Redirect"), vec!["/x/b/c"]);
}

#[test]
fn test_uses_upstream_file_wrapper_if_can_not_redirect() {
    let app = xsendfile(file_app_for("/path/fn"));
    let mut environ = environ_with_map("/does/not/match/").with_file_wrapper(Arc::new(DummyFileWrapper));
    let response = get_response(&app, &mut environ).unwrap();

    assert_eq!(response.header_values("content-length"), vec!["7"]);
    assert_eq!(response.header_values("x-accel-redirect"), vec!["/stale/"]);
    assert_eq!(response.chunks(), vec![Bytes::from("wrapped /path/fn 4096")]);
}

#[test]
fn test_unmapped_file_without_upstream_wrapper_is_streamed() {
    let app = xsendfile(file_app_for("/path/fn"));
    let response = get_response(&app, &mut environ_with_map("/does/not/match/")).unwrap();
    assert!(response.body.is_file());
    assert_eq!(response.chunks(), vec![Bytes::from_static(b"content")]);
}

#[test]
fn test_mapping_to_empty_uri_is_not_a_redirect() {
    let app = xsendfile(file_app_for("/path/fn"));
    let response = get_response(&app, &mut environ_with_map("/path/fn=")).unwrap();

    assert_eq!(response.header_values("x-accel-redirect"), vec!["/stale/"]);
    assert_eq!(response.header_values("content-length"), vec!["7"]);
    assert_eq!(response.chunks(), vec![Bytes::from_static(b"content")]);
}

#[test]
fn test_non_ascii_filename_falls_back() {
    let app = xsendfile(file_app_for("/p\u{f8}th/fn"));
    let mut environ = environ_with_map("/=/mapped/").with_file_wrapper(Arc::new(DummyFileWrapper));
    let response = get_response(&app, &mut environ).unwrap();
    assert_eq!(response.chunks(), vec![Bytes::from("wrapped /p\u{f8}th/fn 4096")]);
}

#[test]
fn test_no_redirect_map() {
    let app = xsendfile(file_app_for("/path/fn"));
    let mut environ = Environ::new().with_file_wrapper(Arc::new(DummyFileWrapper));
    let response = get_response(&app, &mut environ).unwrap();

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.chunks(), vec![Bytes::from("wrapped /path/fn 4096")]);
}

#[test]
fn test_non_ascii_redirect_map() {
    let app = xsendfile(|_: &mut Environ, responder: &mut dyn Responder| -> Result<Body, GatewayError> {
        responder.start_response(StatusCode::OK, HeaderMap::new(), None)?;
        Ok(Body::from("body"))
    });
    let response = get_response(&app, &mut environ_with_map("/path/=/mapped/\u{f8}")).unwrap();
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.chunks(), vec![Bytes::from_static(b"body")]);
}

#[test]
fn test_passes_on_calls_to_write() {
    let app = xsendfile(|_: &mut Environ, responder: &mut dyn Responder| -> Result<Body, GatewayError> {
        responder.start_response(StatusCode::OK, HeaderMap::new(), None)?;
        responder.write(Bytes::from_static(b"body"))?;
        Ok(Body::empty())
    });
    let response = get_response(&app, &mut environ_with_map("/")).unwrap();
    assert_eq!(response.chunks(), vec![Bytes::from_static(b"body")]);
}

#[test]
fn test_written_bytes_precede_file_body() {
    let app = xsendfile(|environ: &mut Environ, responder: &mut dyn Responder| -> Result<Body, GatewayError> {
        responder.start_response(StatusCode::OK, HeaderMap::new(), None)?;
        responder.write(Bytes::from_static(b"head "))?;
        Ok(environ.send_file(DummyFile::boxed("/path/fn", b"tail"), 2))
    });
    let response = get_response(&app, &mut environ_with_map("/path/=/mapped/")).unwrap();

    assert!(response.header_values("x-accel-redirect").is_empty());
    assert_eq!(
        response.chunks(),
        vec![Bytes::from_static(b"head "), Bytes::from_static(b"ta"), Bytes::from_static(b"il")]
    );
}

#[test]
fn test_start_response_called_with_exc_info() {
    let app = xsendfile(|_: &mut Environ, responder: &mut dyn Responder| -> Result<Body, GatewayError> {
        let exc: Arc<dyn std::error::Error + Send + Sync> = Arc::new(DummyException);
        responder.start_response(StatusCode::OK, HeaderMap::new(), Some(exc))?;
        Ok(Body::empty())
    });
    let err = get_response(&app, &mut environ_with_map("/")).unwrap_err();
    match err {
        GatewayError::Application(exc) => assert_eq!(exc.to_string(), "dummy exception"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_start_response_never_called() {
    let app = xsendfile(|_: &mut Environ, _: &mut dyn Responder| -> Result<Body, GatewayError> { Ok(Body::empty()) });
    let err = get_response(&app, &mut environ_with_map("/")).unwrap_err();
    assert!(matches!(err, GatewayError::StartResponseNeverCalled));
}

#[test]
fn test_start_response_called_twice() {
    let app = xsendfile(|_: &mut Environ, responder: &mut dyn Responder| -> Result<Body, GatewayError> {
        responder.start_response(StatusCode::OK, HeaderMap::new(), None)?;
        responder.start_response(StatusCode::OK, HeaderMap::new(), None)?;
        Ok(Body::empty())
    });
    let err = get_response(&app, &mut environ_with_map("/")).unwrap_err();
    assert!(matches!(err, GatewayError::ResponseAlreadyStarted));
}

#[test]
fn test_two_exc_calls_forwarded_unchanged() {
    let app = xsendfile(|_: &mut Environ, responder: &mut dyn Responder| -> Result<Body, GatewayError> {
        let exc: Arc<dyn std::error::Error + Send + Sync> = Arc::new(DummyException);
        responder.start_response(StatusCode::BAD_GATEWAY, HeaderMap::new(), Some(exc.clone()))?;
        responder.start_response(StatusCode::INTERNAL_SERVER_ERROR, HeaderMap::new(), Some(exc))?;
        Ok(Body::empty())
    });
    let mut downstream = RecordingResponder::default();
    let body = app.call(&mut environ_with_map("/"), &mut downstream);
    assert!(body.is_ok());
    assert_eq!(
        downstream.calls,
        vec![
            Call::Start(StatusCode::BAD_GATEWAY, true),
            Call::Start(StatusCode::INTERNAL_SERVER_ERROR, true),
        ]
    );
}

#[test]
fn test_application_errors_propagate() {
    let app = xsendfile(|_: &mut Environ, _: &mut dyn Responder| -> Result<Body, GatewayError> {
        Err(GatewayError::application(DummyException))
    });
    let err = get_response(&app, &mut environ_with_map("/")).unwrap_err();
    assert!(matches!(err, GatewayError::Application(_)));
}
