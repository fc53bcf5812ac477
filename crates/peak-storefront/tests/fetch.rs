//! Page fetching through a task `Session`.

mod common;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use peak_storefront::{Session, StorefrontError};

use common::{page_response, settings, XSRF};

#[tokio::test]
async fn fetch_returns_body_and_captures_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/dunk"))
        .respond_with(page_response("<html>ok</html>".to_owned()))
        .mount(&server)
        .await;

    let mut session = Session::new(&settings()).expect("session");
    assert!(session.anti_forgery_token().is_none());

    let url = format!("{}/products/dunk", server.uri());
    let page = session.fetch(&url).await.expect("page fetched");

    assert_eq!(page.body, "<html>ok</html>");
    assert_eq!(page.url, url);
    assert_eq!(session.anti_forgery_token(), Some(XSRF));
}

#[tokio::test]
async fn non_success_status_is_not_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut session = Session::new(&settings()).expect("session");
    let err = session
        .fetch(&format!("{}/products/unreleased", server.uri()))
        .await
        .unwrap_err();

    assert!(
        matches!(err, StorefrontError::NotReady { status: 404, .. }),
        "expected NotReady, got: {err:?}"
    );
    assert!(err.is_retryable());
}

#[tokio::test]
async fn server_error_is_also_not_ready() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut session = Session::new(&settings()).expect("session");
    let err = session.fetch(&server.uri()).await.unwrap_err();
    assert!(matches!(err, StorefrontError::NotReady { status: 503, .. }));
}

#[tokio::test]
async fn page_without_token_cookie_is_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&server)
        .await;

    let mut session = Session::new(&settings()).expect("session");
    let err = session.fetch(&server.uri()).await.unwrap_err();

    assert!(
        matches!(err, StorefrontError::MissingAntiForgeryToken { .. }),
        "expected MissingAntiForgeryToken, got: {err:?}"
    );
    assert!(!err.is_retryable());
    assert!(session.anti_forgery_token().is_none());
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let mut session = Session::new(&settings()).expect("session");
    // Port 9 (discard) on localhost is not expected to accept HTTP.
    let err = session.fetch("http://127.0.0.1:9/").await.unwrap_err();
    assert!(matches!(err, StorefrontError::Transport(_)), "got: {err:?}");
    assert!(!err.is_retryable());
}
