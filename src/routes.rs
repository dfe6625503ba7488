// src/routes.rs

use axum::{
    body::Body,
    extract::{Request, State},
    handler::Handler,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use std::path::Path;
use tower::ServiceExt;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // --- Auth ---
    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .merge(
            Router::new()
                .route("/me", get(handlers::auth::get_me))
                .route("/profile", put(handlers::auth::update_profile))
                .route_layer(from_fn_with_state(app_state.clone(), auth_guard)),
        );

    // --- Shops ---
    // GET /{id} is public, PUT /{id} needs a token, so the guard sits on the handler
    let shop_routes = Router::new()
        .route("/open-now", get(handlers::shops::list_open_shops))
        .route(
            "/{id}",
            get(handlers::shops::get_shop).put(
                handlers::shops::update_shop
                    .layer(from_fn_with_state(app_state.clone(), auth_guard)),
            ),
        )
        .merge(
            Router::new()
                .route("/", post(handlers::shops::create_shop))
                .route("/my-shops", get(handlers::shops::list_my_shops))
                .route_layer(from_fn_with_state(app_state.clone(), auth_guard)),
        );

    // --- Reports ---
    let report_routes = Router::new()
        .route(
            "/",
            post(handlers::reports::create_report).get(handlers::reports::list_reports),
        )
        .route("/my-reports", get(handlers::reports::list_my_reports))
        .route("/{id}/status", put(handlers::reports::update_report_status))
        .route_layer(from_fn_with_state(app_state.clone(), auth_guard));

    // --- Admin ---
    let admin_routes = Router::new()
        .route("/shops", get(handlers::admin::list_shops))
        .route("/shops/{id}", delete(handlers::admin::delete_shop))
        .route("/shops/{id}/toggle", put(handlers::admin::toggle_shop))
        .route("/users", get(handlers::admin::list_users))
        .route("/users/{id}/toggle-status", put(handlers::admin::toggle_user_status))
        .route("/dashboard", get(handlers::admin::dashboard))
        .route_layer(from_fn_with_state(app_state.clone(), auth_guard));

    // --- Theme ---
    let theme_routes = Router::new()
        .route(
            "/guest-preference",
            post(handlers::theme::get_guest_preference).put(handlers::theme::update_guest_preference),
        )
        .merge(
            Router::new()
                .route(
                    "/preference",
                    get(handlers::theme::get_preference).put(handlers::theme::update_preference),
                )
                .route_layer(from_fn_with_state(app_state.clone(), auth_guard)),
        );

    let cors = cors_layer(&app_state.config.cors_origins);

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/shops", shop_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/theme", theme_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(fallback)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

// Unknown /api routes get the JSON 404; everything else is the SPA when one is configured
async fn fallback(State(app_state): State<AppState>, request: Request) -> Response {
    let is_api = request.uri().path().starts_with("/api");

    match &app_state.config.frontend_dist {
        Some(dist) if !is_api => serve_frontend(dist, request).await,
        _ => handlers::health::route_not_found().await.into_response(),
    }
}

async fn serve_frontend(dist: &Path, request: Request) -> Response {
    let index = ServeFile::new(dist.join("index.html"));
    let Ok(response) = ServeDir::new(dist).fallback(index).oneshot(request).await;
    response.map(Body::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_config;
    use axum::http::StatusCode;
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;

    // Requests in these tests are rejected (or answered) before the database is touched
    fn app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://nightmate@localhost/nightmate")
            .unwrap();
        build_router(AppState::from_pool(pool, test_config()))
    }

    async fn send(app: Router, request: Request) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_request(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_reports_environment() {
        let (status, body) = send(app(), get_request("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["environment"], "test");
    }

    #[tokio::test]
    async fn unknown_api_route_is_json_404() {
        let (status, body) = send(app(), get_request("/api/does-not-exist")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "success": false, "message": "Route not found" }));
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        for (method, uri) in [
            (Method::POST, "/api/shops"),
            (Method::GET, "/api/shops/my-shops"),
            (Method::GET, "/api/reports"),
            (Method::GET, "/api/admin/dashboard"),
            (Method::GET, "/api/theme/preference"),
        ] {
            let request = json_request(method.clone(), uri, serde_json::json!({}));
            let (status, body) = send(app(), request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["success"], false);
        }
    }

    #[tokio::test]
    async fn shop_update_requires_a_token() {
        let id = uuid::Uuid::new_v4();
        let request = json_request(Method::PUT, &format!("/api/shops/{id}"), serde_json::json!({}));
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_token_is_rejected() {
        let request = Request::builder()
            .uri("/api/auth/me")
            .header(header::AUTHORIZATION, "Bearer not-a-real-token")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Not authorized, token missing or invalid");
    }

    #[tokio::test]
    async fn signup_validation_errors_are_listed_per_field() {
        let request = json_request(
            Method::POST,
            "/api/auth/signup",
            serde_json::json!({
                "name": "Eve",
                "email": "eve@nightmate.com",
                "password": "123",
                "role": "admin"
            }),
        );
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Validation failed");

        let fields: Vec<&str> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap())
            .collect();
        assert_eq!(fields, vec!["password", "role"]);
    }

    #[tokio::test]
    async fn malformed_json_body_uses_error_envelope() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn directory_rejects_bad_paging_and_unknown_category() {
        let (status, body) = send(app(), get_request("/api/shops/open-now?page=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "page must be 1 or greater");

        let (status, body) = send(app(), get_request("/api/shops/open-now?limit=0")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "limit must be 1 or greater");

        let (status, body) = send(app(), get_request("/api/shops/open-now?category=bar")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn shop_id_must_be_a_uuid() {
        let (status, body) = send(app(), get_request("/api/shops/not-a-uuid")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn blank_guest_session_gets_a_fresh_id() {
        let request = json_request(
            Method::POST,
            "/api/theme/guest-preference",
            serde_json::json!({ "sessionId": "" }),
        );
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["sessionId"].as_str().map(str::len), Some(64));
        assert_eq!(body["data"]["themePreference"], "dark");
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = send(app(), get_request("/api-docs/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/api/shops/open-now"].is_object());
    }

    async fn token_for(app_state: &AppState, role: crate::models::auth::Role) -> String {
        let (token, _) = app_state
            .auth_service
            .register_user("Test Account", &format!("{role:?}@nightmate.com"), "secret1", role)
            .await
            .unwrap();
        token
    }

    fn with_token(mut request: Request, token: &str) -> Request {
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
        request
    }

    fn shop_body() -> Value {
        serde_json::json!({
            "name": "Night Owl Pharmacy",
            "category": "medical",
            "location": {
                "address": "1 Elm Street",
                "city": "Boston",
                "coordinates": { "lat": 42.36, "lng": -71.06 }
            },
            "openTime": "00:00",
            "closeTime": "23:59"
        })
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn plain_users_cannot_create_shops(pool: sqlx::PgPool) {
        let app_state = AppState::from_pool(pool, test_config());
        let token = token_for(&app_state, crate::models::auth::Role::User).await;

        let request = with_token(json_request(Method::POST, "/api/shops", shop_body()), &token);
        let (status, body) = send(build_router(app_state), request).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore = "Requires a PostgreSQL DATABASE_URL"]
    async fn poster_creates_shop_and_it_is_listed_as_open(pool: sqlx::PgPool) {
        let app_state = AppState::from_pool(pool, test_config());
        let token = token_for(&app_state, crate::models::auth::Role::Poster).await;
        let app = build_router(app_state);

        let request = with_token(json_request(Method::POST, "/api/shops", shop_body()), &token);
        let (status, body) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["shop"]["isApproved"], true);
        assert_eq!(body["data"]["shop"]["openTime"], "00:00");

        let (status, body) = send(app, get_request("/api/shops/open-now?city=bost")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["shops"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"]["shops"][0]["isOpenNow"], true);
        assert_eq!(body["data"]["pagination"]["current"], 1);
    }
}
