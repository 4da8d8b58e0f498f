use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::timeout::TimeoutLayer;

use crate::catalog::ordering::sort_entries;
use crate::catalog::resolver::CatalogResolver;
use crate::cli::{open_resolver, ServeArgs};
use crate::config::Settings;
use crate::core::types::ValidationMode;
use crate::resolve::ResolveError;

/// Shared application state
pub struct AppState {
    pub resolver: CatalogResolver,
}

/// Error body returned by every endpoint
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_type: String,
}

/// Create a safe error response that keeps transport details out of the
/// response body while logging them server-side
pub fn create_safe_error_response(
    error_type: &str,
    user_message: &str,
    internal_error: Option<&str>,
) -> ErrorResponse {
    if let Some(internal_msg) = internal_error {
        tracing::error!("Internal error ({}): {}", error_type, internal_msg);
    }

    ErrorResponse {
        error: user_message.to_string(),
        error_type: error_type.to_string(),
    }
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(create_safe_error_response("bad_request", message, None)),
    )
        .into_response()
}

/// Map a resolution failure onto an HTTP status and error body
fn resolve_error_response(err: &ResolveError) -> Response {
    let (status, body) = match err {
        ResolveError::NotFound(_)
        | ResolveError::ManifestInvalid(_)
        | ResolveError::TableEmpty(_)
        | ResolveError::ImageUnavailable(_) => (
            StatusCode::NOT_FOUND,
            create_safe_error_response(err.kind(), &err.to_string(), None),
        ),
        ResolveError::Transport(_) | ResolveError::IndexInvalid(_) => (
            StatusCode::BAD_GATEWAY,
            create_safe_error_response(
                err.kind(),
                "The diagram source could not be read",
                Some(&err.to_string()),
            ),
        ),
    };
    (status, Json(body)).into_response()
}

/// Run the web server
///
/// # Errors
///
/// Returns an error if no source is configured, the tokio runtime cannot be
/// created, or the server fails to start.
pub fn run(args: ServeArgs, settings: Settings) -> anyhow::Result<()> {
    let resolver = open_resolver(&settings)?;
    let state = Arc::new(AppState { resolver });

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move { run_server(args, state).await })
}

/// Create the application router with all routes and middleware configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/catalog", get(catalog_handler))
        .route("/api/diagrams/{*folder}", get(diagram_handler))
        .route("/api/markers/{*folder}", get(markers_handler))
        .route("/api/cache/clear", post(clear_cache_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("x-frame-options"),
                    HeaderValue::from_static("DENY"),
                ))
                .layer(SetResponseHeaderLayer::if_not_present(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                // Bounds requests stuck on a hung source
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    Duration::from_secs(30),
                ))
                .layer(ConcurrencyLimitLayer::new(100)),
        )
}

async fn run_server(args: ServeArgs, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", args.address, args.port);
    println!("Starting diagram-catalog web server at http://{addr}");

    if args.open {
        let _ = open::that(format!("http://{addr}/api/catalog"));
    }

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Deserialize)]
struct CatalogParams {
    /// Overrides the configured validation mode
    strict: Option<bool>,
    /// Apply numeric-prefix ordering
    #[serde(default)]
    sort: bool,
}

async fn catalog_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CatalogParams>,
) -> Response {
    let mode = params
        .strict
        .map_or_else(|| state.resolver.options().mode(), ValidationMode::from_strict);

    match state.resolver.list_discovered(mode).await {
        Ok(mut entries) => {
            if params.sort {
                sort_entries(&mut entries);
            }
            Json(serde_json::json!({
                "count": entries.len(),
                "mode": mode,
                "entries": entries,
            }))
            .into_response()
        }
        Err(e) => resolve_error_response(&e),
    }
}

async fn diagram_handler(
    State(state): State<Arc<AppState>>,
    Path(folder): Path<String>,
) -> Response {
    match state
        .resolver
        .load_diagram(&folder, ValidationMode::Lenient)
        .await
    {
        Ok(diagram) => Json(diagram.detail()).into_response(),
        Err(e) => resolve_error_response(&e),
    }
}

#[derive(Deserialize)]
struct MarkerParams {
    width: Option<f64>,
    viewport: Option<f64>,
}

async fn markers_handler(
    State(state): State<Arc<AppState>>,
    Path(folder): Path<String>,
    Query(params): Query<MarkerParams>,
) -> Response {
    let Some(width) = params.width.filter(|w| w.is_finite() && *w > 0.0) else {
        return bad_request("Query parameter 'width' must be a positive number");
    };

    match state
        .resolver
        .project_markers(&folder, width, params.viewport)
        .await
    {
        Ok(layout) => Json(layout).into_response(),
        Err(e) => resolve_error_response(&e),
    }
}

async fn clear_cache_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.resolver.clear_caches();
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::transport::memory::MemoryTransport;

    fn app() -> (Router, Arc<MemoryTransport>) {
        let transport = Arc::new(
            MemoryTransport::new()
                .with_file("folders.json", r#"{"folders":["Wiring","2. Cooling","10. Oil System"]}"#)
                .with_file(
                    "10. Oil System/10. Oil System.json",
                    r#"{"imageName":"Oil","coordinates":[{"number":"1","x":50,"y":50}]}"#,
                )
                .with_file("10. Oil System/10. Oil System.csv", "Number,Description\n1,Oil Pump\n")
                .with_file(
                    "2. Cooling/data.json",
                    r#"{"imageName":"Cooling","coordinates":[{"number":"4","x":1,"y":2}]}"#,
                )
                .with_file("Wiring/data.json", r#"{"imageName":"Wiring","coordinates":[]}"#),
        );
        let resolver = CatalogResolver::new(transport.clone(), &Settings::default());
        (create_router(Arc::new(AppState { resolver })), transport)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        // extractor rejections answer in plain text
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health_and_security_headers() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
    }

    #[tokio::test]
    async fn test_catalog_modes_and_sorting() {
        let (app, _) = app();

        let (status, body) = get_json(app.clone(), "/api/catalog").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 3);
        assert_eq!(body["mode"], "lenient");
        assert_eq!(body["entries"][0]["name"], "Wiring");

        let (_, body) = get_json(app, "/api/catalog?strict=true&sort=true").await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["entries"][0]["name"], "2. Cooling");
        assert_eq!(body["entries"][1]["markerCount"], 1);
    }

    #[tokio::test]
    async fn test_diagram_detail_and_not_found() {
        let (app, _) = app();

        let (status, body) = get_json(app.clone(), "/api/diagrams/10.%20Oil%20System").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["imageName"], "Oil");
        assert_eq!(body["markers"][0]["row"]["description"], "Oil Pump");

        let (status, body) = get_json(app, "/api/diagrams/Engine/Missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_type"], "not_found");
    }

    #[tokio::test]
    async fn test_markers_require_width() {
        let (app, _) = app();

        let (status, body) = get_json(app.clone(), "/api/markers/2.%20Cooling").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error_type"], "bad_request");

        let (status, _) = get_json(app.clone(), "/api/markers/2.%20Cooling?width=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // no image in the folder
        let (status, body) = get_json(app, "/api/markers/2.%20Cooling?width=400").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error_type"], "image_unavailable");
    }

    #[tokio::test]
    async fn test_cache_clear_forces_refetch() {
        let (app, transport) = app();

        get_json(app.clone(), "/api/catalog").await;
        let fetches = transport.fetch_count();
        get_json(app.clone(), "/api/catalog").await;
        assert_eq!(transport.fetch_count(), fetches);

        let response = app
            .clone()
            .oneshot(Request::post("/api/cache/clear").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        get_json(app, "/api/catalog").await;
        assert!(transport.fetch_count() > fetches);
    }

    #[tokio::test]
    async fn test_missing_index_is_bad_gateway() {
        let transport = Arc::new(MemoryTransport::new());
        let resolver = CatalogResolver::new(transport, &Settings::default());
        let app = create_router(Arc::new(AppState { resolver }));

        let (status, body) = get_json(app, "/api/catalog").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error_type"], "transport_error");
        assert_eq!(body["error"], "The diagram source could not be read");
    }
}
