use clap::Parser;
use rstest::rstest;
use serde_json::{Value, json};

use todos::{App, Config, Method, Request, Router, Store};

fn config(extra: &[&str]) -> Config {
    let mut args = vec!["todos", "--secret-key", "test-secret", "--database", ":memory:"];
    args.extend_from_slice(extra);
    Config::try_parse_from(args).expect("test config")
}

fn router() -> Router {
    App::new(config(&[]), Store::open_in_memory().expect("in-memory store")).router()
}

async fn send(router: &Router, method: Method, target: &str, body: Option<&str>) -> (u16, Value) {
    let mut req = Request::new(method, target).with_header("content-type", "application/json");
    if let Some(body) = body {
        req = req.with_body(body.to_owned());
    }
    let res = router.dispatch(req).await;
    let json = serde_json::from_slice(res.body()).unwrap_or(Value::Null);
    (res.status_code(), json)
}

async fn create(router: &Router, task: &str, due: &str) -> Value {
    let body = json!({ "task": task, "should_be_completed_by_date": due }).to_string();
    let (status, json) = send(router, Method::Post, "/api/v1/todos/", Some(&body)).await;
    assert_eq!(status, 201, "create failed: {json}");
    json["data"].clone()
}

// ── List ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn listing_an_empty_table_returns_an_empty_sequence() {
    let router = router();
    let (status, json) = send(&router, Method::Get, "/api/v1/todos/", None).await;
    assert_eq!(status, 200);
    assert_eq!(json, json!({ "data": [] }));
}

#[tokio::test]
async fn created_record_appears_in_the_list() {
    let router = router();
    let created = create(&router, "buy milk", "2024-12-01T00:00:00+00:00").await;

    let (status, json) = send(&router, Method::Get, "/api/v1/todos/", None).await;
    assert_eq!(status, 200);

    let data = json["data"].as_array().expect("data array");
    assert_eq!(data.len(), 1);
    let item = &data[0];
    assert_eq!(item["id"], created["id"]);
    assert_eq!(item["task"], "buy milk");
    assert_eq!(item["is_completed"], false);
    assert_eq!(item["should_be_completed_by_date"], "2024-12-01T00:00:00+00:00");
    assert!(item["created"].is_string());
}

#[tokio::test]
async fn list_is_ordered_by_due_date_descending() {
    let router = router();
    create(&router, "soon", "2024-12-01T00:00:00+00:00").await;
    create(&router, "later", "2025-01-15T12:00:00+00:00").await;
    create(&router, "middle", "2024-12-24T18:00:00+01:00").await;

    let (_, json) = send(&router, Method::Get, "/api/v1/todos/", None).await;
    let tasks: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["task"].as_str().unwrap())
        .collect();
    assert_eq!(tasks, ["later", "middle", "soon"]);
}

// ── Create ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_returns_the_full_persisted_record() {
    let router = router();
    let data = create(&router, "buy milk", "2024-12-01T02:00:00+02:00").await;

    assert!(data["id"].as_i64().is_some());
    assert_eq!(data["task"], "buy milk");
    assert_eq!(data["is_completed"], false);
    assert_eq!(data["should_be_completed_by_date"], "2024-12-01T00:00:00+00:00");
    assert_eq!(data["created"], data["last_updated"]);
}

#[tokio::test]
async fn create_with_invalid_payload_is_unprocessable() {
    let router = router();
    for body in [
        r#"{"task": "buy milk"}"#,
        r#"{"task": "buy milk", "should_be_completed_by_date": "whenever"}"#,
        r#"{"task": 12, "should_be_completed_by_date": "2024-12-01T00:00:00Z"}"#,
        "not json",
    ] {
        let (status, json) = send(&router, Method::Post, "/api/v1/todos/", Some(body)).await;
        assert_eq!(status, 422, "body {body}");
        assert!(json["error"].is_string());
    }

    let (_, json) = send(&router, Method::Get, "/api/v1/todos/", None).await;
    assert_eq!(json["data"], json!([]));
}

// ── Partial update ────────────────────────────────────────────────────────────

#[tokio::test]
async fn updating_completion_leaves_other_fields_and_advances_last_updated() {
    let router = router();
    let before = create(&router, "buy milk", "2024-12-01T00:00:00+00:00").await;
    let body = json!({ "id": before["id"], "is_completed": true }).to_string();

    let (status, json) = send(&router, Method::Patch, "/api/v1/todos/", Some(&body)).await;
    assert_eq!(status, 200);

    let after = &json["data"];
    assert_eq!(after["is_completed"], true);
    assert_eq!(after["task"], before["task"]);
    assert_eq!(after["should_be_completed_by_date"], before["should_be_completed_by_date"]);
    assert_eq!(after["created"], before["created"]);

    let parse = |v: &Value| chrono::DateTime::parse_from_rfc3339(v.as_str().unwrap()).unwrap();
    assert!(parse(&after["last_updated"]) > parse(&before["last_updated"]));
}

#[tokio::test]
async fn updating_several_fields_at_once() {
    let router = router();
    let before = create(&router, "buy milk", "2024-12-01T00:00:00+00:00").await;
    let body = json!({
        "id": before["id"],
        "task": "buy oat milk",
        "should_be_completed_by_date": "2024-12-02T09:00:00-05:00",
    })
    .to_string();

    let (status, json) = send(&router, Method::Patch, "/api/v1/todos/", Some(&body)).await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["task"], "buy oat milk");
    assert_eq!(json["data"]["should_be_completed_by_date"], "2024-12-02T14:00:00+00:00");
    assert_eq!(json["data"]["is_completed"], false);
}

#[tokio::test]
async fn naive_due_date_is_rejected_and_nothing_changes() {
    let router = router();
    let before = create(&router, "buy milk", "2024-12-01T00:00:00+00:00").await;
    let id = before["id"].as_i64().unwrap();
    let body = json!({
        "id": id,
        "task": "should not stick",
        "should_be_completed_by_date": "2024-12-05T00:00:00",
    })
    .to_string();

    let (status, json) = send(&router, Method::Patch, "/api/v1/todos/", Some(&body)).await;
    assert_eq!(status, 400);
    assert!(json["error"].as_str().unwrap().contains("timezone"));

    let (_, stored) = send(&router, Method::Get, &format!("/api/v1/todos/{id}/"), None).await;
    assert_eq!(stored["data"], before);
}

#[tokio::test]
async fn updating_a_missing_record_is_not_found() {
    let router = router();
    let (status, json) =
        send(&router, Method::Patch, "/api/v1/todos/", Some(r#"{"id": 404, "is_completed": true}"#)).await;
    assert_eq!(status, 404);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn malformed_json_update_is_a_bad_request_with_json_error() {
    let router = router();
    let (status, json) = send(&router, Method::Patch, "/api/v1/todos/", Some("{\"id\": 1,")).await;
    assert_eq!(status, 400);
    assert!(json["error"].as_str().unwrap().starts_with("Invalid JSON"));
}

#[tokio::test]
async fn update_without_id_is_a_bad_request() {
    let router = router();
    let (status, json) =
        send(&router, Method::Patch, "/api/v1/todos/", Some(r#"{"task": "orphan"}"#)).await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "Missing required field: id");
}

#[rstest]
#[case(r#"{"id": "abc", "is_completed": true}"#)]
#[case(r#"{"id": 1.5, "is_completed": true}"#)]
#[case(r#"{"id": [1], "is_completed": true}"#)]
#[tokio::test]
async fn update_with_non_integer_id_is_a_bad_request(#[case] body: &str) {
    let router = router();
    create(&router, "keep me", "2024-12-01T00:00:00+00:00").await;

    let (status, json) = send(&router, Method::Patch, "/api/v1/todos/", Some(body)).await;
    assert_eq!(status, 400);
    assert_eq!(json["error"], "Field 'id' must be an integer");
}

#[tokio::test]
async fn update_accepts_a_numeric_string_id() {
    let router = router();
    let id = create(&router, "coerced", "2024-12-01T00:00:00+00:00").await["id"].as_i64().unwrap();

    let body = json!({ "id": id.to_string(), "is_completed": true }).to_string();
    let (status, json) = send(&router, Method::Patch, "/api/v1/todos/", Some(&body)).await;
    assert_eq!(status, 200);
    assert_eq!(json["data"]["is_completed"], true);
}

// ── Retrieve ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn retrieve_by_id() {
    let router = router();
    let created = create(&router, "buy milk", "2024-12-01T00:00:00Z").await;
    let id = created["id"].as_i64().unwrap();

    let (status, json) = send(&router, Method::Get, &format!("/api/v1/todos/{id}/"), None).await;
    assert_eq!(status, 200);
    assert_eq!(json["data"], created);

    let (status, _) = send(&router, Method::Get, "/api/v1/todos/999/", None).await;
    assert_eq!(status, 404);

    let (status, _) = send(&router, Method::Get, "/api/v1/todos/abc/", None).await;
    assert_eq!(status, 400);
}

// ── Counter, pages, routing ───────────────────────────────────────────────────

#[tokio::test]
async fn counter_endpoint_and_page_share_a_total() {
    let router = router();
    let (_, json) = send(&router, Method::Get, "/api/v1/add", None).await;
    assert_eq!(json, json!({ "count": 1 }));
    let (_, json) = send(&router, Method::Get, "/api/v1/add", None).await;
    assert_eq!(json, json!({ "count": 2 }));

    let res = router.dispatch(Request::new(Method::Get, "/count")).await;
    assert_eq!(res.status_code(), 200);
    assert!(String::from_utf8_lossy(res.body()).contains("Number of page loads: 3"));
}

#[tokio::test]
async fn index_page_lists_tasks() {
    let router = router();
    let res = router.dispatch(Request::new(Method::Get, "/")).await;
    assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    assert!(String::from_utf8_lossy(res.body()).contains("There are no todos"));

    create(&router, "walk <the> dog", "2024-12-01T00:00:00Z").await;
    let res = router.dispatch(Request::new(Method::Get, "/")).await;
    assert!(String::from_utf8_lossy(res.body()).contains("walk &lt;the&gt; dog"));
}

#[tokio::test]
async fn about_page_is_static_html() {
    let res = router().dispatch(Request::new(Method::Get, "/about")).await;
    assert_eq!(res.status_code(), 200);
    assert!(String::from_utf8_lossy(res.body()).contains("<h1>About</h1>"));
}

#[tokio::test(start_paused = true)]
async fn slow_page_answers_after_its_delay() {
    let router = App::new(config(&["--slow-delay-secs", "10"]), Store::open_in_memory().unwrap()).router();
    let started = tokio::time::Instant::now();

    let res = router.dispatch(Request::new(Method::Get, "/slow/")).await;

    assert_eq!(res.status_code(), 200);
    assert!(started.elapsed() >= std::time::Duration::from_secs(10));
    assert!(String::from_utf8_lossy(res.body()).contains("Async views supported"));
}

#[tokio::test]
async fn health_checks_answer() {
    let router = router();
    let res = router.dispatch(Request::new(Method::Get, "/healthz")).await;
    assert_eq!(res.body(), b"ok");
    let res = router.dispatch(Request::new(Method::Get, "/readyz")).await;
    assert_eq!(res.body(), b"ready");
}

#[tokio::test]
async fn head_on_a_page_has_no_body() {
    let router = router();
    let res = router.dispatch(Request::new(Method::Head, "/about")).await;
    assert_eq!(res.status_code(), 200);
    assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    assert!(res.body().is_empty());
}

#[tokio::test]
async fn unsupported_method_on_todos_is_405() {
    let res = router().dispatch(Request::new(Method::Delete, "/api/v1/todos/")).await;
    assert_eq!(res.status_code(), 405);
    assert_eq!(res.header("allow"), Some("GET, HEAD, PATCH, POST"));
}
