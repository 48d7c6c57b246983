use cucumber::{given, then, when};
use serde_json::Value;

use crate::FlowsWorld;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Start an in-process axum test server using the world's temp database.
/// Binds to a random free port (port 0) and stores the port and task handle
/// in the world.
pub async fn start_test_server(world: &mut FlowsWorld) -> u16 {
    let db_path = world
        .db_path
        .as_ref()
        .expect("db_path not set, did you forget 'Given a flows database is initialized'?")
        .clone();

    let db = flows::db::Database::open(&db_path).expect("failed to open database for web server");
    db.migrate().expect("failed to migrate database");
    let app = flows::web::create_router(flows::web::AppState::new(db));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind to ephemeral port");
    let port = listener
        .local_addr()
        .expect("failed to get local addr")
        .port();

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("web server error in test");
    });

    world.server_port = Some(port);
    world.server_handle = Some(handle);

    // Poll until the server accepts connections (at most ~100 ms).
    for _ in 0..20 {
        if world
            .http_client
            .get(format!("http://127.0.0.1:{port}/health"))
            .send()
            .await
            .is_ok()
        {
            break;
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(5)).await;
    }

    port
}

pub fn url(world: &FlowsWorld, path: &str) -> String {
    let port = world
        .server_port
        .expect("server not started, add 'Given the web server is running'");
    format!("http://127.0.0.1:{port}{path}")
}

/// Send a prepared request, recording status and body on the world.
pub async fn record(world: &mut FlowsWorld, req: reqwest::RequestBuilder) -> (u16, String) {
    let resp = req
        .send()
        .await
        .unwrap_or_else(|e| panic!("request failed: {e}"));
    let status = resp.status().as_u16();
    let body = resp
        .text()
        .await
        .unwrap_or_else(|e| panic!("failed to read response body: {e}"));
    world.last_response_status = Some(status);
    world.last_response_body = Some(body.clone());
    (status, body)
}

pub async fn http_get(world: &mut FlowsWorld, path: &str) -> (u16, String) {
    let req = world.http_client.get(url(world, path));
    record(world, req).await
}

pub async fn http_post(world: &mut FlowsWorld, path: &str, body: Value) -> (u16, String) {
    let req = world.http_client.post(url(world, path)).json(&body);
    record(world, req).await
}

pub async fn http_put(world: &mut FlowsWorld, path: &str, body: Value) -> (u16, String) {
    let req = world.http_client.put(url(world, path)).json(&body);
    record(world, req).await
}

pub async fn http_delete(world: &mut FlowsWorld, path: &str) -> (u16, String) {
    let req = world.http_client.delete(url(world, path));
    record(world, req).await
}

/// Parse a JSON step argument, panicking with the offending text.
pub fn parse_step_json(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| panic!("step body {raw:?} is not valid JSON: {e}"))
}

/// Parse the last response body as JSON.
pub fn last_json(world: &FlowsWorld) -> Value {
    let body = world
        .last_response_body
        .as_deref()
        .expect("no HTTP response body recorded");
    serde_json::from_str(body)
        .unwrap_or_else(|e| panic!("response body is not valid JSON: {e}\nbody: {body}"))
}

/// Render a JSON value for comparison with a step string: strings bare,
/// everything else in its JSON form.
pub fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("the web server is running")]
async fn the_web_server_is_running(world: &mut FlowsWorld) {
    start_test_server(world).await;
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when(expr = "I GET {string}")]
async fn i_get_path(world: &mut FlowsWorld, path: String) {
    http_get(world, &path).await;
}

#[when(expr = "I POST {string} with body {string}")]
async fn i_post_path_with_body(world: &mut FlowsWorld, path: String, raw_body: String) {
    http_post(world, &path, parse_step_json(&raw_body)).await;
}

#[when(expr = "I POST {string} with raw JSON {string}")]
async fn i_post_path_with_raw_json(world: &mut FlowsWorld, path: String, raw_body: String) {
    let req = world
        .http_client
        .post(url(world, &path))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(raw_body);
    record(world, req).await;
}

#[when(expr = "I POST {string} as plain text {string}")]
async fn i_post_path_as_plain_text(world: &mut FlowsWorld, path: String, raw_body: String) {
    let req = world
        .http_client
        .post(url(world, &path))
        .header(reqwest::header::CONTENT_TYPE, "text/plain")
        .body(raw_body);
    record(world, req).await;
}

#[when(expr = "I PUT {string} with body {string}")]
async fn i_put_path_with_body(world: &mut FlowsWorld, path: String, raw_body: String) {
    http_put(world, &path, parse_step_json(&raw_body)).await;
}

#[when(expr = "I DELETE {string}")]
async fn i_delete_path(world: &mut FlowsWorld, path: String) {
    http_delete(world, &path).await;
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then(expr = "the response status is {int}")]
async fn the_response_status_is(world: &mut FlowsWorld, expected: u16) {
    let actual = world
        .last_response_status
        .expect("no HTTP response recorded, did you make a request?");
    assert_eq!(
        actual,
        expected,
        "expected HTTP status {expected} but got {actual}, body: {}",
        world.last_response_body.as_deref().unwrap_or("")
    );
}

#[then(expr = "the response body contains {string}")]
async fn the_response_body_contains(world: &mut FlowsWorld, expected: String) {
    let body = world
        .last_response_body
        .as_deref()
        .expect("no HTTP response body recorded, did you make a request?");
    assert!(
        body.contains(&expected),
        "expected response body to contain {expected:?}, but body was:\n{body}"
    );
}

#[then(expr = "the response body does not contain {string}")]
async fn the_response_body_does_not_contain(world: &mut FlowsWorld, unexpected: String) {
    let body = world
        .last_response_body
        .as_deref()
        .expect("no HTTP response body recorded, did you make a request?");
    assert!(
        !body.contains(&unexpected),
        "expected response body not to contain {unexpected:?}, but body was:\n{body}"
    );
}

#[then(expr = "the response JSON field {string} is {string}")]
async fn the_response_json_field_is(world: &mut FlowsWorld, field: String, expected: String) {
    let json = last_json(world);
    let actual = json
        .get(&field)
        .unwrap_or_else(|| panic!("response has no field {field:?}: {json}"));
    assert_eq!(as_text(actual), expected, "field {field:?} in {json}");
}

#[then(expr = "the response JSON field {string} contains {string}")]
async fn the_response_json_field_contains(world: &mut FlowsWorld, field: String, expected: String) {
    let json = last_json(world);
    let actual = json
        .get(&field)
        .unwrap_or_else(|| panic!("response has no field {field:?}: {json}"));
    assert!(
        as_text(actual).contains(&expected),
        "expected field {field:?} to contain {expected:?} in {json}"
    );
}

#[then(expr = "the response JSON field {string} is null")]
async fn the_response_json_field_is_null(world: &mut FlowsWorld, field: String) {
    let json = last_json(world);
    assert_eq!(json.get(&field), Some(&Value::Null), "field {field:?} in {json}");
}

#[then(expr = "the response JSON has a field {string}")]
async fn the_response_json_has_field(world: &mut FlowsWorld, field: String) {
    let json = last_json(world);
    assert!(json.get(&field).is_some(), "response has no field {field:?}: {json}");
}

#[then(expr = "the response is a JSON array of length {int}")]
async fn the_response_is_a_json_array_of_length(world: &mut FlowsWorld, expected: usize) {
    let json = last_json(world);
    let items = json
        .as_array()
        .unwrap_or_else(|| panic!("response is not a JSON array: {json}"));
    assert_eq!(items.len(), expected, "array was: {json}");
}

#[then(expr = "item {int} of the response has {string} equal to {string}")]
async fn item_of_the_response_has(
    world: &mut FlowsWorld,
    index: usize,
    field: String,
    expected: String,
) {
    let json = last_json(world);
    let item = json
        .get(index)
        .unwrap_or_else(|| panic!("response has no item {index}: {json}"));
    let actual = item
        .get(&field)
        .unwrap_or_else(|| panic!("item {index} has no field {field:?}: {item}"));
    assert_eq!(as_text(actual), expected);
}
