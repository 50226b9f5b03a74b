//! The default reqwest-backed transport against a local mock server.

mod support;

use std::time::Duration;

use apibind::prelude::*;
use apibind::types::HttpConfig;
use mockito::Matcher;
use support::mockito as mock;

const SHOW: Endpoint = Endpoint::get("/1.1/statuses/show.json").allowed_params(&["id"]);
const UPDATE: Endpoint = Endpoint::post("/statuses/update.json")
    .allowed_params(&["status"])
    .require_auth();

#[test]
fn get_sends_query_auth_and_headers() {
    let mut server = mock::start();
    let m = server
        .mock("GET", mock::path("/1.1/statuses/show.json"))
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("id".into(), "20".into()),
            Matcher::UrlEncoded("include_entities".into(), "true".into()),
        ]))
        .match_header("authorization", "Bearer secret-token")
        .match_header("x-client", "apibind-tests")
        .match_header("user-agent", "apibind-tests/1.0")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":20,"text":"just setting up"}"#)
        .expect(1)
        .create();

    let config = mock::config_for(&server)
        .api_root("")
        .http(
            HttpConfig::builder()
                .header("x-client", "apibind-tests")
                .user_agent(Some("apibind-tests/1.0"))
                .timeout(Duration::from_secs(5))
                .build(),
        )
        .build()
        .unwrap();
    let client = ApiClient::builder(config)
        .auth(BearerAuth::new("secret-token"))
        .build()
        .unwrap();

    let result = SHOW
        .call(&client, CallArgs::new().arg(20).param("include_entities", true))
        .unwrap();

    m.assert();
    assert_eq!(result.payload["text"], "just setting up");
    assert_eq!(result.response.unwrap().status, 200);
}

#[test]
fn post_sends_form_body() {
    let mut server = mock::start();
    let m = server
        .mock("POST", mock::path("/1.1/statuses/update.json"))
        .match_header(
            "content-type",
            Matcher::Regex("^application/x-www-form-urlencoded".into()),
        )
        .match_body(Matcher::UrlEncoded("status".into(), "hello world".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":1}"#)
        .expect(1)
        .create();

    let config = mock::config_for(&server).build().unwrap();
    let client = ApiClient::builder(config)
        .auth(BasicAuth::new("app", "secret"))
        .build()
        .unwrap();

    UPDATE
        .call(&client, CallArgs::new().post_data("status", "hello world"))
        .unwrap();

    m.assert();
}

#[test]
fn retries_over_http_until_budget_is_spent() {
    let mut server = mock::start();
    let failing = mock::json_mock(
        &mut server,
        "GET",
        "/1.1/statuses/show.json",
        503,
        r#"{"errors":[{"message":"Over capacity","code":130}]}"#,
        2,
    );

    let config = mock::config_for(&server)
        .api_root("")
        .retry(
            RetryPolicy::new()
                .with_retry_count(1)
                .with_retry_errors([503]),
        )
        .build()
        .unwrap();
    let client = ApiClient::builder(config).build().unwrap();

    let err = SHOW.call(&client, CallArgs::new().arg(1)).unwrap_err();

    failing.assert();
    assert_eq!(err.status_code(), Some(503));
    assert_eq!(err.api_code(), Some(130));
    assert_eq!(err.to_string(), "API error 503: Over capacity");
}

#[test]
fn cache_avoids_second_http_request() {
    let mut server = mock::start();
    let m = mock::json_mock(
        &mut server,
        "GET",
        "/1.1/statuses/show.json",
        200,
        r#"{"id":5}"#,
        1,
    );

    let config = mock::config_for(&server).api_root("").build().unwrap();
    let client = ApiClient::builder(config)
        .memory_cache(Duration::from_secs(60))
        .build()
        .unwrap();

    let first = SHOW.call(&client, CallArgs::new().arg(5)).unwrap();
    let second = SHOW.call(&client, CallArgs::new().arg(5)).unwrap();

    m.assert();
    assert!(!first.is_cached());
    assert!(second.is_cached());
}

#[test]
fn connection_failure_is_a_transport_error() {
    // nothing listens on the discard port
    let config = ClientConfig::builder("127.0.0.1:9")
        .scheme("http")
        .http(
            HttpConfig::builder()
                .timeout(Duration::from_secs(2))
                .build(),
        )
        .retry(RetryPolicy::new().with_retry_count(3))
        .build()
        .unwrap();
    let client = ApiClient::builder(config).build().unwrap();

    let err = SHOW.call(&client, CallArgs::new().arg(1)).unwrap_err();

    assert!(matches!(err, BindError::TransportError(_)));
    assert!(err.response().is_none());
}
