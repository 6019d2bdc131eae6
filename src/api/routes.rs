//! Route definitions for the API.

use axum::{middleware, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers;
use crate::auth::{require_auth, GateState};
use crate::AppState;

/// Security scheme modifier for OpenAPI.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
            );
        }
    }
}

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::status,
        handlers::stats,
        handlers::unauthorized,
        handlers::forbidden,
        handlers::list_users,
        handlers::get_current_user,
        handlers::get_user,
        handlers::create_user,
        handlers::update_user,
        handlers::delete_user,
    ),
    components(schemas(
        crate::api::types::StatusResponse,
        crate::api::types::StatsResponse,
        crate::api::types::CurrentUserResponse,
        crate::api::types::CreateUserRequest,
        crate::api::types::UpdateUserRequest,
        crate::domain::User,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "status", description = "Status endpoints"),
        (name = "users", description = "User management")
    ),
    info(
        title = "Basic Gate API",
        version = "0.1.0",
        description = "User API guarded by HTTP Basic authentication",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Build the API router, gated when `gate` is set.
///
/// Trailing slashes are trimmed before API routing, so `/api/v1/users/` and
/// `/api/v1/users` reach the same handler.
pub fn build_router(state: AppState, gate: Option<GateState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        // Status
        .route("/api/v1/status", get(handlers::status))
        .route("/api/v1/stats", get(handlers::stats))
        .route("/api/v1/unauthorized", get(handlers::unauthorized))
        .route("/api/v1/forbidden", get(handlers::forbidden))
        // Users
        .route(
            "/api/v1/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route("/api/v1/users/me", get(handlers::get_current_user))
        .route(
            "/api/v1/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .fallback(handlers::not_found)
        .with_state(state);

    // Swagger UI redirects `/swagger-ui` to `/swagger-ui/`, so it stays outside the trim
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback_service(NormalizePath::trim_trailing_slash(api));

    // The gate wraps every route, the fallback included
    let router = match gate {
        Some(gate) => router.layer(middleware::from_fn_with_state(gate, require_auth)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, HeaderValue, Method, Request, StatusCode},
    };
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::auth::{password::hash_password, AuthStrategy, BasicAuth};
    use crate::domain::User;
    use crate::storage::setup_test_db;

    const ADMIN_EMAIL: &str = "admin@x.com";
    const ADMIN_PASSWORD: &str = "correct";

    async fn app_state() -> AppState {
        let repository = setup_test_db().await;
        let admin = User::new(
            ADMIN_EMAIL.to_string(),
            hash_password(ADMIN_PASSWORD, 4).unwrap(),
        );
        repository.create_user(&admin).await.unwrap();

        AppState {
            repository,
            bcrypt_cost: 4,
        }
    }

    async fn basic_app() -> Router {
        let state = app_state().await;
        let strategy = AuthStrategy::Basic(BasicAuth::new(Arc::new(state.repository.clone())));
        let gate = GateState::new(strategy, vec!["/api/v1/status/".to_string()]);
        build_router(state, Some(gate))
    }

    fn basic(identifier: &str, secret: &str) -> String {
        format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", identifier, secret))
        )
    }

    fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_exempt_path_passes_without_credentials() {
        let app = basic_app().await;

        let response = app.oneshot(get("/api/v1/status", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "OK");
    }

    #[tokio::test]
    async fn test_trailing_slash_paths_are_routed() {
        let app = basic_app().await;

        let response = app
            .clone()
            .oneshot(get("/api/v1/status/", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "OK");

        let response = app
            .clone()
            .oneshot(get("/api/v1/users/", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let header = basic(ADMIN_EMAIL, ADMIN_PASSWORD);
        let response = app
            .clone()
            .oneshot(get("/api/v1/users/", Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(get("/api/v1/users/me/", Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["email"], ADMIN_EMAIL);
    }

    #[tokio::test]
    async fn test_swagger_ui_is_not_trimmed() {
        let state = app_state().await;
        let gate = GateState::new(AuthStrategy::Null, vec!["/swagger-ui*".to_string()]);
        let app = build_router(state, Some(gate));

        let response = app
            .clone()
            .oneshot(get("/swagger-ui", None))
            .await
            .unwrap();
        assert!(response.status().is_redirection());

        let response = app.oneshot(get("/swagger-ui/", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unreadable_header_is_forbidden() {
        let app = basic_app().await;

        let request = Request::builder()
            .uri("/api/v1/users")
            .header(AUTHORIZATION, HeaderValue::from_bytes(b"Basic \xff").unwrap())
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_missing_credentials_is_unauthorized() {
        let app = basic_app().await;

        let response = app.oneshot(get("/api/v1/users", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_invalid_credentials_are_forbidden() {
        let app = basic_app().await;

        for header in [
            basic(ADMIN_EMAIL, "wrongpw"),
            basic("nobody@x.com", ADMIN_PASSWORD),
            "Bearer xyz".to_string(),
            "Basic not-base64!!".to_string(),
            format!("Basic {}", STANDARD.encode("noseparator")),
        ] {
            let response = app
                .clone()
                .oneshot(get("/api/v1/users", Some(&header)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "header: {}", header);
        }
    }

    #[tokio::test]
    async fn test_valid_credentials_proceed() {
        let app = basic_app().await;
        let header = basic(ADMIN_EMAIL, ADMIN_PASSWORD);

        let response = app
            .clone()
            .oneshot(get("/api/v1/users", Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 1);

        let response = app
            .oneshot(get("/api/v1/users/me", Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let me = body_json(response).await;
        assert_eq!(me["email"], ADMIN_EMAIL);
        assert_eq!(me["display_name"], ADMIN_EMAIL);
        assert!(me.get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_unknown_route_is_gated() {
        let app = basic_app().await;

        let response = app
            .clone()
            .oneshot(get("/api/v1/nope", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let header = basic(ADMIN_EMAIL, ADMIN_PASSWORD);
        let response = app
            .oneshot(get("/api/v1/nope", Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "Not found");
    }

    #[tokio::test]
    async fn test_null_strategy_forbids_any_credentials() {
        let state = app_state().await;
        let gate = GateState::new(AuthStrategy::Null, vec!["/api/v1/status/".to_string()]);
        let app = build_router(state, Some(gate));

        for uri in ["/api/v1/status", "/api/v1/status/"] {
            let response = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "uri: {}", uri);
        }

        let header = basic(ADMIN_EMAIL, ADMIN_PASSWORD);
        let response = app
            .oneshot(get("/api/v1/users", Some(&header)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_disabled_gate() {
        let app = build_router(app_state().await, None);

        let response = app
            .clone()
            .oneshot(get("/api/v1/users", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(get("/api/v1/users/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get("/api/v1/unauthorized", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_user_lifecycle() {
        let app = basic_app().await;
        let header = basic(ADMIN_EMAIL, ADMIN_PASSWORD);

        let create = |body: &str| {
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/users")
                .header(AUTHORIZATION, &header)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        };

        let response = app
            .clone()
            .oneshot(create(r#"{"password":"pw"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "email missing");

        let response = app
            .clone()
            .oneshot(create(r#"{"email":"bob@x.com"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "password missing");

        let response = app
            .clone()
            .oneshot(create(
                r#"{"email":"bob@x.com","password":"pw","first_name":"Bob"}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = body_json(response).await;
        assert_eq!(created["first_name"], "Bob");
        assert!(created.get("password_hash").is_none());

        // The new user can authenticate
        let response = app
            .clone()
            .oneshot(get("/api/v1/users/me", Some(&basic("bob@x.com", "pw"))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["display_name"], "Bob");

        let uri = format!("/api/v1/users/{}", created["id"].as_str().unwrap());
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(&uri)
                    .header(AUTHORIZATION, &header)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(get(&uri, Some(&header))).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
