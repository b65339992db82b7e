use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

const GENDER_OID: &str = "1.2.643.5.1.13.13.11.1040";
const GENDER_ID: &str = "1b7c9a4e-0000-4000-8000-000000000001";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get_request(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(http::header::AUTHORIZATION, "N3 test-issuer")
        .body(String::new())
        .unwrap()
}

fn parameters_request(uri: &str, params: Value) -> Request<String> {
    let body = json!({ "resourceType": "Parameters", "parameter": params });
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::AUTHORIZATION, "N3 test-issuer")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn system() -> Value {
    json!({ "name": "system", "valueString": format!("urn:oid:{GENDER_OID}") })
}

fn param<'a>(body: &'a Value, name: &str) -> &'a Value {
    body["parameter"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == name)
        .unwrap_or_else(|| panic!("no parameter {name}"))
}

// --- auth ---

#[tokio::test]
async fn missing_authorization_is_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri(format!("/ValueSet?url=urn:oid:{GENDER_OID}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_scheme_is_401_on_post() {
    let mut req = parameters_request("/ValueSet/$expand", json!([system()]));
    req.headers_mut()
        .insert(http::header::AUTHORIZATION, "Bearer x".parse().unwrap());
    let resp = app().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- info ---

#[tokio::test]
async fn info_returns_current_version() {
    let resp = app()
        .oneshot(get_request(&format!(
            "/ValueSet?_format=json&url=urn%3Aoid%3A{GENDER_OID}"
        )))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["resourceType"], "ValueSet");
    assert_eq!(body["id"], GENDER_ID);
    assert_eq!(body["version"], "2");
    assert_eq!(body["url"], format!("urn:oid:{GENDER_OID}"));
}

#[tokio::test]
async fn info_without_url_is_400() {
    let resp = app()
        .oneshot(get_request("/ValueSet?_format=json"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn info_unknown_oid_is_404() {
    let resp = app()
        .oneshot(get_request("/ValueSet?url=urn:oid:9.9.9"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- expand ---

#[tokio::test]
async fn expand_current_version() {
    let resp = app()
        .oneshot(parameters_request("/ValueSet/$expand", json!([system()])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["expansion"]["total"], 3);
    assert_eq!(body["expansion"]["contains"][2]["code"], "3");
    assert_eq!(
        body["expansion"]["contains"][0]["system"],
        format!("urn:oid:{GENDER_OID}")
    );
}

#[tokio::test]
async fn expand_pinned_version() {
    let resp = app()
        .oneshot(parameters_request(
            "/ValueSet/$expand",
            json!([system(), { "name": "version", "valueString": "1" }]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["version"], "1");
    assert_eq!(body["expansion"]["total"], 2);
}

#[tokio::test]
async fn expand_unknown_version_is_404() {
    let resp = app()
        .oneshot(parameters_request(
            "/ValueSet/$expand",
            json!([system(), { "name": "version", "valueString": "42" }]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expand_without_system_is_400() {
    let resp = app()
        .oneshot(parameters_request("/ValueSet/$expand", json!([])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- lookup ---

#[tokio::test]
async fn lookup_known_code() {
    let resp = app()
        .oneshot(parameters_request(
            "/ValueSet/$lookup",
            json!([system(), { "name": "code", "valueString": "2" }]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["resourceType"], "Parameters");
    assert_eq!(param(&body, "display")["valueString"], "Female");
    assert_eq!(param(&body, "name")["valueString"], "Gender");
}

#[tokio::test]
async fn lookup_unknown_code_is_404() {
    let resp = app()
        .oneshot(parameters_request(
            "/ValueSet/$lookup",
            json!([system(), { "name": "code", "valueString": "X" }]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lookup_code_missing_from_old_version_is_404() {
    let resp = app()
        .oneshot(parameters_request(
            "/ValueSet/$lookup",
            json!([
                system(),
                { "name": "code", "valueString": "3" },
                { "name": "version", "valueString": "1" }
            ]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- validate-code ---

#[tokio::test]
async fn validate_member_and_non_member() {
    let resp = app()
        .oneshot(parameters_request(
            "/ValueSet/$validate-code",
            json!([system(), { "name": "code", "valueString": "1" }]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(param(&body, "result")["valueBoolean"], true);

    let resp = app()
        .oneshot(parameters_request(
            "/ValueSet/$validate-code",
            json!([system(), { "name": "code", "valueString": "Z" }]),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(param(&body, "result")["valueBoolean"], false);
    assert!(param(&body, "message")["valueString"]
        .as_str()
        .unwrap()
        .contains("'Z'"));
}

#[tokio::test]
async fn validate_without_code_is_400() {
    let resp = app()
        .oneshot(parameters_request("/ValueSet/$validate-code", json!([system()])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- history ---

#[tokio::test]
async fn history_lists_newest_first() {
    let resp = app()
        .oneshot(get_request(&format!("/ValueSet/{GENDER_ID}/_history")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["type"], "history");
    assert_eq!(body["total"], 2);
    assert_eq!(body["entry"][0]["resource"]["version"], "2");
    assert_eq!(body["entry"][1]["resource"]["version"], "1");
}

#[tokio::test]
async fn history_unknown_id_is_404() {
    let resp = app()
        .oneshot(get_request(
            "/ValueSet/00000000-0000-0000-0000-000000000000/_history",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_bad_id_is_400() {
    let resp = app()
        .oneshot(get_request("/ValueSet/not-a-guid/_history"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
