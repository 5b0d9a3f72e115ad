//! End-to-end negotiation scenarios
//!
//! Each test collates a small API, builds candidates the way a host router
//! would, and runs requests through the dispatcher.

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use http::request::Parts;
use http::Response;
use http_body_util::{BodyExt, Full};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use verso::prelude::*;
use verso::reporting::{API_SUPPORTED_VERSIONS, SUNSET};

fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("verso=debug")))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

fn v(major: u32) -> ApiVersion {
    ApiVersion::new(major, 0)
}

fn parts(builder: http::request::Builder) -> Parts {
    builder.body(()).unwrap().into_parts().0
}

/// `Orders` in two versions, each implemented by its own controller.
fn orders() -> Vec<ActionDescriptor<&'static str>> {
    let collated = collate(&[
        ControllerDeclaration::new("Orders", ApiVersionModel::from_version(v(1)))
            .action(ActionDeclaration::new("Get", ApiVersionModel::empty())),
        ControllerDeclaration::new("Orders", ApiVersionModel::from_version(v(2)))
            .action(ActionDeclaration::new("Get", ApiVersionModel::empty())),
    ]);

    vec![
        ActionDescriptor::new("OrdersV1", "Get", collated[0].actions[0].clone(), "orders v1")
            .method(Method::GET),
        ActionDescriptor::new("OrdersV2", "Get", collated[1].actions[0].clone(), "orders v2")
            .method(Method::GET),
    ]
}

async fn body_json(response: Response<Full<Bytes>>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Dispatch outcomes
// ============================================================================

#[test]
fn test_method_not_allowed_lists_allowed_methods() {
    init_tracing();
    let candidates = orders();
    let dispatcher = ApiVersionDispatcher::new(ApiVersioningOptions::new());
    let mut request = parts(Request::builder().method("DELETE").uri("/orders?api-version=1.0"));

    let error = dispatcher.select(&mut request, &candidates).unwrap_err();
    let response = dispatcher.error_response(&error);

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers()[http::header::ALLOW], "GET");
}

#[tokio::test]
async fn test_unsupported_version_is_reported() {
    init_tracing();
    let candidates = orders();
    let dispatcher = ApiVersionDispatcher::new(ApiVersioningOptions::new());
    let mut request = parts(Request::builder().uri("/orders?api-version=9.9"));

    let error = dispatcher.select(&mut request, &candidates).unwrap_err();
    let response = dispatcher.error_response(&error);

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()[API_SUPPORTED_VERSIONS], "1.0, 2.0");
    assert_eq!(
        response.headers()[http::header::CONTENT_TYPE],
        "application/problem+json"
    );

    let body = body_json(response).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["code"], "UnsupportedApiVersion");
    assert_eq!(body["title"], "Unsupported API version");
    assert!(body["type"].as_str().unwrap().ends_with("#unsupported"));
}

#[tokio::test]
async fn test_conflicting_versions_are_ambiguous() {
    let candidates = orders();
    let dispatcher = ApiVersionDispatcher::new(ApiVersioningOptions::new());
    let mut request = parts(
        Request::builder()
            .uri("/orders?api-version=2.0")
            .header("api-version", "1.0"),
    );

    let error = dispatcher.select(&mut request, &candidates).unwrap_err();
    assert_eq!(error.status(), StatusCode::BAD_REQUEST);

    let body = body_json(dispatcher.error_response(&error)).await;
    assert_eq!(body["code"], "AmbiguousApiVersion");
    assert_eq!(body["apiVersions"], serde_json::json!(["1.0", "2.0"]));
}

#[test]
fn test_same_version_on_several_channels_is_not_ambiguous() {
    let candidates = orders();
    let dispatcher = ApiVersionDispatcher::new(ApiVersioningOptions::new());
    let mut request = parts(
        Request::builder()
            .uri("/orders?api-version=2.0")
            .header("api-version", "2.0"),
    );

    let dispatch = dispatcher.select(&mut request, &candidates).unwrap();
    assert_eq!(*dispatch.candidate.handler(), "orders v2");
}

#[test]
fn test_explicit_mapping_beats_implicit() {
    let collated = collate(&[ControllerDeclaration::new(
        "Orders",
        ApiVersionModelBuilder::new()
            .has_api_version(v(1))
            .has_api_version(v(2))
            .build(),
    )
    .action(ActionDeclaration::new("Get", ApiVersionModel::empty()))
    .action(ActionDeclaration::new(
        "GetV2",
        ApiVersionModel::from_version(v(2)),
    ))]);
    let candidates = vec![
        ActionDescriptor::new("Orders", "Get", collated[0].actions[0].clone(), "get")
            .method(Method::GET),
        ActionDescriptor::new("Orders", "GetV2", collated[0].actions[1].clone(), "get v2")
            .method(Method::GET),
    ];
    let dispatcher = ApiVersionDispatcher::new(ApiVersioningOptions::new());

    let mut request = parts(Request::builder().uri("/orders?api-version=2.0"));
    let dispatch = dispatcher.select(&mut request, &candidates).unwrap();
    assert_eq!(*dispatch.candidate.handler(), "get v2");
    assert_eq!(dispatch.mapping, ApiVersionMapping::Explicit);

    let mut request = parts(Request::builder().uri("/orders?api-version=1.0"));
    let dispatch = dispatcher.select(&mut request, &candidates).unwrap();
    assert_eq!(*dispatch.candidate.handler(), "get");
    assert_eq!(dispatch.mapping, ApiVersionMapping::Implicit);
}

#[test]
fn test_two_explicit_controllers_are_an_ambiguous_match() {
    let collated = collate(&[
        ControllerDeclaration::new("Orders", ApiVersionModel::from_version(v(1)))
            .action(ActionDeclaration::new("Get", ApiVersionModel::from_version(v(1)))),
        ControllerDeclaration::new("Invoices", ApiVersionModel::from_version(v(1)))
            .action(ActionDeclaration::new("Get", ApiVersionModel::from_version(v(1)))),
    ]);
    let candidates = vec![
        ActionDescriptor::new("Orders", "Get", collated[0].actions[0].clone(), ()),
        ActionDescriptor::new("Invoices", "Get", collated[1].actions[0].clone(), ()),
    ];
    let dispatcher = ApiVersionDispatcher::new(ApiVersioningOptions::new());
    let mut request = parts(Request::builder().uri("/things?api-version=1.0"));

    let error = dispatcher.select(&mut request, &candidates).unwrap_err();
    assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(matches!(
        &error,
        ApiVersionError::AmbiguousMatch(e) if e.candidates == ["Orders.Get", "Invoices.Get"]
    ));
}

// ============================================================================
// Media types and selectors
// ============================================================================

#[test]
fn test_media_type_versions() {
    let candidates = orders();
    let dispatcher = ApiVersionDispatcher::new(
        ApiVersioningOptions::new().reader(MediaTypeApiVersionReader::new()),
    );

    let mut request = parts(
        Request::builder()
            .uri("/orders")
            .header("accept", "application/json;v=2.0"),
    );
    let dispatch = dispatcher.select(&mut request, &candidates).unwrap();
    assert_eq!(*dispatch.candidate.handler(), "orders v2");

    let mut request = parts(
        Request::builder()
            .uri("/orders")
            .header("accept", "application/json;v=3.0"),
    );
    let error = dispatcher.select(&mut request, &candidates).unwrap_err();
    assert_eq!(error.status(), StatusCode::NOT_ACCEPTABLE);
}

#[test]
fn test_assumed_version_follows_selector() {
    let candidates = orders();
    let dispatcher = ApiVersionDispatcher::new(
        ApiVersioningOptions::new()
            .assume_default_version_when_unspecified(true)
            .selector(CurrentImplementationApiVersionSelector),
    );

    for _ in 0..3 {
        let mut request = parts(Request::builder().uri("/orders"));
        let dispatch = dispatcher.select(&mut request, &candidates).unwrap();
        assert_eq!(*dispatch.candidate.handler(), "orders v2");
        assert_eq!(dispatch.version, Some(v(2)));

        let feature = ApiVersioningFeature::from_extensions(&request.extensions).unwrap();
        assert_eq!(feature.selected_api_version(), Some(&v(2)));
    }
}

// ============================================================================
// Reporting
// ============================================================================

#[test]
fn test_sunset_policy_is_reported() {
    let policies = SunsetPolicyManager::new().add(
        "Orders",
        v(1),
        SunsetPolicy::new()
            .effective(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())
            .link(LinkHeaderValue::sunset("https://example.com/policies/v1").title("Retirement")),
    );
    let candidates = orders();
    let dispatcher = ApiVersionDispatcher::new(
        ApiVersioningOptions::new()
            .reporter(DefaultApiVersionReporter::new().sunset_policies(policies)),
    );

    let mut request = parts(Request::builder().uri("/orders?api-version=1.0"));
    let dispatch = dispatcher.select(&mut request, &candidates).unwrap();
    let mut headers = HeaderMap::new();
    dispatcher.report(&mut headers, &dispatch);

    assert_eq!(headers[API_SUPPORTED_VERSIONS], "1.0, 2.0");
    assert_eq!(headers[SUNSET], "Sun, 01 Mar 2026 00:00:00 GMT");
    assert_eq!(
        headers[http::header::LINK],
        "<https://example.com/policies/v1>; rel=\"sunset\"; title=\"Retirement\""
    );

    let mut request = parts(Request::builder().uri("/orders?api-version=2.0"));
    let dispatch = dispatcher.select(&mut request, &candidates).unwrap();
    let mut headers = HeaderMap::new();
    dispatcher.report(&mut headers, &dispatch);
    assert!(headers.get(SUNSET).is_none());
}
