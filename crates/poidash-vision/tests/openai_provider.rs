//! Integration tests for `OpenAiVision` against a wiremock upstream.

use poidash_vision::{OpenAiVision, VisionError, VisionProvider};
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(base_url: &str) -> OpenAiVision {
    OpenAiVision::new("sk-test", "gpt-4o", base_url, 5).expect("provider construction")
}

fn image_url() -> Url {
    Url::parse("https://images.example.com/storefront.jpg").expect("valid url")
}

fn completion(content: serde_json::Value) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content, "refusal": null } }]
    })
}

#[tokio::test]
async fn extract_returns_validated_pois() {
    let server = MockServer::start().await;
    let content = json!({
        "pois": [{
            "name": "Cafe Roxy",
            "poi_type": "Restaurant",
            "phone": "",
            "category": "Cafe",
            "address": "12 Main St",
            "coordinates": [23.8, 90.4]
        }]
    })
    .to_string();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(content))))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider(&server.uri())
        .extract(&image_url())
        .await
        .expect("extraction should succeed");

    assert_eq!(result.pois.len(), 1);
    assert_eq!(result.pois[0].name, "Cafe Roxy");
    assert_eq!(result.pois[0].poi_type, "Restaurant");
    assert_eq!(result.pois[0].coordinates, vec![23.8, 90.4]);
}

#[tokio::test]
async fn extract_with_no_pois_found_is_empty_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion(json!(r#"{"pois": []}"#))),
        )
        .mount(&server)
        .await;

    let result = provider(&server.uri())
        .extract(&image_url())
        .await
        .expect("empty result is not an error");
    assert!(result.pois.is_empty());
}

#[tokio::test]
async fn extract_with_null_content_is_empty_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(null))))
        .mount(&server)
        .await;

    let result = provider(&server.uri())
        .extract(&image_url())
        .await
        .expect("null content is not an error");
    assert!(result.pois.is_empty());
}

#[tokio::test]
async fn extract_surfaces_schema_mismatch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!(
            r#"{"pois": [{"name": 42}]}"#
        ))))
        .mount(&server)
        .await;

    let err = provider(&server.uri())
        .extract(&image_url())
        .await
        .expect_err("wrong field type should fail");
    assert!(matches!(err, VisionError::Schema(_)), "got {err:?}");
}

#[tokio::test]
async fn extract_surfaces_upstream_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = provider(&server.uri())
        .extract(&image_url())
        .await
        .expect_err("429 should fail");
    assert!(
        matches!(err, VisionError::UpstreamStatus { status: 429, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn extract_without_choices_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = provider(&server.uri())
        .extract(&image_url())
        .await
        .expect_err("no choices should fail");
    assert!(
        matches!(err, VisionError::MalformedResponse { .. }),
        "got {err:?}"
    );
}
