mod common;

use common::{app_for, credentials, items, SERP_PATH, TOKEN};
use serde_json::json;
use thordata_node::errors::NodeErrorKind;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn google_search_posts_form_with_all_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SERP_PATH))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(header("token", TOKEN))
        .and(header("apikey", TOKEN))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("engine=google&json=1&num=10&q=rust+lang"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"organic": [{"title": "Rust"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let records = app
        .execute(
            &items(vec![json!({"operation": "searchEngine", "query": "rust lang"})]),
            &credentials(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].json, json!({"organic": [{"title": "Rust"}]}));
    assert!(records[0].binary.is_none());
}

#[tokio::test]
async fn bing_sends_count_and_yandex_sends_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SERP_PATH))
        .and(body_string("engine=bing&json=1&count=20&q=rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"engine": "bing"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SERP_PATH))
        .and(body_string("engine=yandex&json=1&num=5&text=rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"engine": "yandex"})))
        .expect(1)
        .mount(&server)
        .await;

    let app = app_for(&server);
    let records = app
        .execute(
            &items(vec![
                json!({"operation": "searchEngine", "query": "rust", "engine": "bing", "num": 20}),
                json!({"operation": "searchEngine", "query": "rust", "engine": "Yandex", "num": "5"}),
            ]),
            &credentials(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(records[0].json["engine"], "bing");
    assert_eq!(records[1].json["engine"], "yandex");
}

#[tokio::test]
async fn non_json_serp_body_is_wrapped_as_raw() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SERP_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>results</html>"))
        .mount(&server)
        .await;

    let records = app_for(&server)
        .execute(
            &items(vec![json!({"query": "duck", "engine": "duckduckgo"})]),
            &credentials(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(records[0].json, json!({"raw": "<html>results</html>"}));
}

#[tokio::test]
async fn non_2xx_reports_status_and_body_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SERP_PATH))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"code": 401, "msg": "Invalid token"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = app_for(&server)
        .execute(
            &items(vec![json!({"operation": "searchEngine", "query": "x"})]),
            &credentials(),
            Some(false),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, NodeErrorKind::Upstream);
    assert_eq!(err.message, "Thordata API Error (401): Invalid token");
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.details.as_ref().unwrap()["item_index"], 0);
}

#[tokio::test]
async fn non_2xx_without_message_falls_back_to_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SERP_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let records = app_for(&server)
        .execute(
            &items(vec![json!({"query": "x"})]),
            &credentials(),
            Some(true),
        )
        .await
        .unwrap();
    assert_eq!(
        records[0].json,
        json!({"error": "Thordata API Error (503): Service Unavailable"})
    );
}

#[tokio::test]
async fn out_of_range_num_never_reaches_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = app_for(&server)
        .execute(
            &items(vec![json!({"query": "x", "num": 51})]),
            &credentials(),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, NodeErrorKind::InvalidParams);
}
