use anyhow::Result as AnyResult;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use food_explorer::api::{self, AppState};
use food_explorer::config::AppConfig;
use food_explorer::providers::traits::CompletionProvider;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FORM: &str = "application/x-www-form-urlencoded";

/// Replies with recipe ideas or a markdown recipe depending on the prompt.
struct KitchenProvider;

#[async_trait]
impl CompletionProvider for KitchenProvider {
    async fn complete(&self, prompt: &str) -> AnyResult<String> {
        if prompt.contains("recipe ideas") {
            return Ok(r#"Here you go: {"recipes": [
                {"recipe_name": "Rösti", "recipe_description": "Crisp potato cake", "calories": 310, "protein": 6, "carbohydrate": 40, "fat": 14},
                {"recipe_name": "Tortilla Española", "calories": "420"}
            ]}"#
            .to_string());
        }
        if prompt.contains("nutritional") || prompt.contains("Nutrition") {
            return Ok("## Balance\nMostly carbohydrate.".to_string());
        }
        Ok("## Rösti\n### Ingredients\n- 2 potatoes, grated".to_string())
    }
}

fn config_for(fda: Option<&MockServer>) -> AppConfig {
    let mut config = AppConfig::default();
    if let Some(server) = fda {
        config.fda_api_url = Url::parse(&format!("{}/food/event.json", server.uri())).unwrap();
    }
    config
}

fn spawn_fda(fda: Option<&MockServer>) -> Router {
    api::fda_router(AppState::new(config_for(fda)))
}

fn spawn_chef() -> Router {
    let state = AppState::new(AppConfig::default()).with_provider(Arc::new(KitchenProvider));
    api::chef_router(state)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post(uri: &str, form: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, FORM);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(form.to_string())).unwrap()
}

fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie issued")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn events_body() -> Value {
    json!({
        "meta": {"results": {"skip": 0, "limit": 3, "total": 812}},
        "results": [
            {
                "report_number": "2024-CFS-000101",
                "date_created": "20240115",
                "outcomes": ["Visited a Health Care Provider"],
                "reactions": ["RASH", "ITCHING"],
                "products": [{"name_brand": "GLOW CREAM", "industry_name": "Cosmetics", "role": "SUSPECT"}]
            },
            {
                "report_number": "2024-CFS-000202",
                "date_created": "20240203",
                "outcomes": ["Other Outcome"],
                "reactions": ["NAUSEA"],
                "products": [{"name_brand": "SUN BLOCK"}]
            },
            {
                "report_number": "2024-CFS-000303",
                "date_created": "20240130",
                "outcomes": [],
                "reactions": ["HIVES"],
                "products": []
            }
        ]
    })
}

#[tokio::test]
async fn test_health_check() {
    let response = spawn_fda(None).oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "Server is running and healthy");
}

#[tokio::test]
async fn test_index_issues_session_and_shows_hint() {
    let response = spawn_fda(None).oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    assert!(cookie.starts_with("food_explorer_session="));

    let body = body_text(response).await;
    assert!(body.contains("Click Run query to fetch adverse event reports."));
    assert!(body.contains(r#"value="Cosmetics""#));
    assert!(body.contains("Leave blank to use .env or no key"));
}

#[tokio::test]
async fn test_query_then_filter_without_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/food/event.json"))
        .and(query_param("search", r#"products.industry_name:"Cosmetics""#))
        .and(query_param("sort", "date_created:desc"))
        .and(query_param("limit", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .expect(1)
        .mount(&server)
        .await;

    let app = spawn_fda(Some(&server));
    let response = app
        .clone()
        .oneshot(post(
            "/query",
            "industry=Cosmetics&limit=20&sort=date_created%3Adesc&api_key=",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);
    let body = body_text(response).await;
    assert!(body.contains("Total matching (API): 812  ·  Returned: 3"));
    assert!(body.contains("2024-CFS-000202"));

    let response = app
        .clone()
        .oneshot(get("/?date=202401", Some(&cookie)))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Showing 2 of 3 records."));
    assert!(body.contains("2024-CFS-000101"));
    assert!(body.contains("2024-CFS-000303"));
    assert!(!body.contains("2024-CFS-000202"));

    let response = app
        .oneshot(get("/?text=zzz", Some(&cookie)))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("No rows match the current filters."));
}

#[tokio::test]
async fn test_invalid_limit_is_reported_inline() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .expect(0)
        .mount(&server)
        .await;

    let app = spawn_fda(Some(&server));
    let response = app
        .clone()
        .oneshot(post("/query", "industry=Cosmetics&limit=5000", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Max records must be between 1 and 1000."));

    let response = app
        .oneshot(post("/query", "industry=+++&limit=10", None))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Please enter an industry name"));
}

#[tokio::test]
async fn test_events_json_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/food/event.json"))
        .and(query_param("sort", "date_created:asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .mount(&server)
        .await;

    let app = spawn_fda(Some(&server));
    let response = app
        .clone()
        .oneshot(get(
            "/api/events?industry=Cosmetics&limit=3&sort=date_created%3Aasc",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["summary"]["total"], 812);
    assert_eq!(body["rows"].as_array().unwrap().len(), 3);
    assert_eq!(body["rows"][2]["outcomes"], "—");

    let response = app
        .oneshot(get("/api/events?industry=Cosmetics&limit=0", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upstream_error_replaces_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": "NOT_FOUND", "message": "No matches found!"}
        })))
        .mount(&server)
        .await;

    let response = spawn_fda(Some(&server))
        .oneshot(post("/query", "industry=Nothing&limit=10", None))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("No matches found!"));
    assert!(!body.contains("<table>"));
}

#[tokio::test]
async fn test_chef_rejects_empty_and_unsafe_ingredients() {
    let app = spawn_chef();
    let response = app
        .clone()
        .oneshot(post("/recipes", "ingredients=+%2C+%3B", None))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Please enter at least one ingredient."));

    let response = app
        .oneshot(post("/recipes", "ingredients=rice%2C+bleach", None))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("inappropriate or dangerous: bleach."));
}

#[tokio::test]
async fn test_chef_recipe_flow() {
    let app = spawn_chef();

    let response = app
        .clone()
        .oneshot(post("/recipes", "ingredients=potato%2C+egg", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);
    let body = body_text(response).await;
    assert!(body.contains("Rösti"));
    assert!(body.contains("Tortilla Española"));
    assert!(body.contains(r#"name="index" value="1""#));

    let response = app
        .clone()
        .oneshot(get("/recipe.md", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(post("/recipes/generate", "index=0", Some(&cookie)))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("2 potatoes, grated"));
    assert!(body.contains("Download recipe.md"));

    let response = app
        .clone()
        .oneshot(get("/recipe.md", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"recipe.md\""
    );
    assert!(body_text(response).await.starts_with("## Rösti"));

    let response = app
        .clone()
        .oneshot(post("/back", "", Some(&cookie)))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Tortilla Española"));
    assert!(body.contains(r#"action="/report""#));
}

#[tokio::test]
async fn test_chef_without_key_shows_config_error() {
    let app = api::chef_router(AppState::new(AppConfig::default()));
    let response = app
        .oneshot(post("/recipes", "ingredients=potato", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("OLLAMA_API_KEY not set."));
}

#[tokio::test]
async fn test_nutrition_json_requires_key() {
    let response = spawn_chef()
        .oneshot(get("/api/nutrition?food=rice", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert!(body["status"].as_str().unwrap().contains("FDC_API_KEY"));
}

#[tokio::test]
async fn test_rejected_limit_keeps_previous_sidebar() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/food/event.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_body()))
        .expect(1)
        .mount(&server)
        .await;

    let app = spawn_fda(Some(&server));
    let response = app
        .clone()
        .oneshot(post("/query", "industry=Cosmetics&limit=20", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let response = app
        .oneshot(post("/query", "industry=Cosmetics&limit=5000", Some(&cookie)))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Max records must be between 1 and 1000."));
    assert!(body.contains(r#"name="limit" type="number" min="1" max="1000" value="20""#));
    assert!(!body.contains(r#"value="5000""#));
}

#[tokio::test]
async fn test_events_json_reports_bad_params_as_json() {
    let app = spawn_fda(None);
    let cases = [
        ("/api/events?industry=Cosmetics&limit=abc", "Max records must be a whole number"),
        ("/api/events?limit=10", "Please enter an industry name"),
        ("/api/events?industry=Cosmetics&sort=sideways", "unknown variant"),
    ];
    for (uri, expected) in cases {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert!(body["status"].as_str().unwrap().contains(expected), "{}: {}", uri, body);
    }
}

#[tokio::test]
async fn test_nutrition_report_renders_markdown() {
    let app = spawn_chef();
    let response = app
        .clone()
        .oneshot(post("/recipes", "ingredients=potato%2C+egg", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let response = app
        .oneshot(post("/report", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("<pre class=\"markdown\">## Balance\nMostly carbohydrate.</pre>"));
    assert!(body.contains("Rösti"));
}

#[tokio::test]
async fn test_nutrition_report_needs_recipes() {
    let response = spawn_chef()
        .oneshot(post("/report", "", None))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Find recipes first."));
    assert!(!body.contains("<pre class=\"markdown\">"));
}
