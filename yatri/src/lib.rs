//! # yatri: Karnataka tourism and map locator backend
//!
//! `yatri` serves two products from one HTTP service: a **map locator** where users place and
//! annotate dustbins, hospitals, hotels and restaurants on a map, and the backend of a **tourism
//! site** with a static travel catalog, a template-based trip planner and temple identification
//! from photographs.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum). Handlers share an
//! [`AppState`] holding:
//!
//! - a [`db::MarkerStore`], backed by PostgreSQL or by a process-local map ([`db`])
//! - the embedded travel [`catalog::Catalog`]
//! - the [`itinerary::TripPlanner`]
//! - the [`classifier::Classifier`], which runs an external image classification program
//!
//! ### Temple identification
//!
//! `POST /api/v1/temple-info` accepts a multipart upload. The image is written to a scratch file
//! that only this request uses, the classifier program is run against it with a timeout, and the
//! JSON object it prints is returned. Any failure past input validation answers with a fixed
//! fallback description plus an `error` field, and the scratch file is removed on every path. See
//! [`classifier`] for the full failure table.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use yatri::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = yatri::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     yatri::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod db;
pub mod errors;
pub mod itinerary;
mod openapi;
mod static_assets;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    catalog::Catalog, classifier::Classifier, config::CorsOrigin, db::MarkerStore, itinerary::TripPlanner, openapi::ApiDoc,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{self, HeaderValue},
    routing::{get, post},
};
use bon::Builder;
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Multipart framing overhead allowed on top of the image size limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .markers(store)
///     .catalog(Arc::new(Catalog::load()?))
///     .planner(Arc::new(TripPlanner::new()?))
///     .classifier(Arc::new(Classifier::new(config.classifier.clone())))
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub markers: MarkerStore,
    pub catalog: Arc<Catalog>,
    pub planner: Arc<TripPlanner>,
    pub classifier: Arc<Classifier>,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    // A literal "*" in an origin list is rejected by tower-http, so wildcard switches to any()
    let allow_origin = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            http::Method::GET,
            http::Method::POST,
            http::Method::PATCH,
            http::Method::DELETE,
        ])
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Request body limit for image uploads, saturating for limits beyond the address space
fn upload_body_limit(max_image_size: u64) -> usize {
    usize::try_from(max_image_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD)
}

/// Build the main application router with all endpoints and middleware.
///
/// - `/api/v1/*`: markers, catalog, trips and temple identification
/// - `/api/dustbins`, `/api/generate-trip`, `/api/temple-info`: paths used by existing frontends
/// - `/healthz`, `/docs` and `/api-docs/openapi.json`
///
/// CORS and request tracing wrap every route.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let upload_limit = DefaultBodyLimit::max(upload_body_limit(state.config.classifier.max_image_size));

    let temple_routes = Router::new()
        .route("/api/v1/temple-info", post(api::handlers::temples::temple_info))
        .route("/api/temple-info", post(api::handlers::temples::temple_info))
        .layer(upload_limit);

    let api_routes = Router::new()
        // Map locator markers
        .route(
            "/{collection}",
            get(api::handlers::markers::list_markers).post(api::handlers::markers::create_marker),
        )
        .route(
            "/{collection}/{id}",
            get(api::handlers::markers::get_marker)
                .patch(api::handlers::markers::update_marker)
                .delete(api::handlers::markers::delete_marker),
        )
        // Travel catalog
        .route("/categories", get(api::handlers::catalog::list_categories))
        .route("/categories/{id}", get(api::handlers::catalog::get_category))
        .route("/places/{category}/{slug}", get(api::handlers::catalog::get_place))
        .route("/places/{category}/{slug}/ar", get(api::handlers::catalog::get_ar_model))
        // Trip planner
        .route("/trips", post(api::handlers::trips::generate_trip));

    let legacy_routes = Router::new()
        .route(
            "/api/dustbins",
            get(api::handlers::dustbins::list_dustbins).post(api::handlers::dustbins::create_dustbin),
        )
        .route("/api/generate-trip", post(api::handlers::trips::generate_trip));

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/v1", api_routes)
        .merge(legacy_routes)
        .merge(temple_routes)
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .route("/api-docs/openapi.json", get(|| async { axum::Json(ApiDoc::openapi()) }));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and the HTTP router.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] opens the marker store (running migrations for
///    PostgreSQL), loads the catalog and templates, and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal resolves, in-flight requests finish, the pool is
///    closed and telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting yatri with configuration: {:#?}", config);

        let (markers, pool) = db::connect_marker_store(&config.markers.store).await?;
        let state = AppState::builder()
            .config(config.clone())
            .markers(markers)
            .catalog(Arc::new(Catalog::load()?))
            .planner(Arc::new(TripPlanner::new()?))
            .classifier(Arc::new(Classifier::new(config.classifier.clone())))
            .build();

        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "yatri listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        // Shutdown telemetry
        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::config::CorsOrigin;
    use crate::test_utils::*;
    use axum::http::{HeaderName, HeaderValue, StatusCode};

    #[tokio::test]
    async fn test_application_integration() {
        let server = crate::Application::new(create_test_config())
            .await
            .expect("Failed to create application")
            .into_test_server();

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");

        let categories = server.get("/api/v1/categories").await;
        categories.assert_status_ok();
    }

    #[test]
    fn test_upload_body_limit_saturates() {
        assert_eq!(crate::upload_body_limit(1024), 1024 + crate::MULTIPART_OVERHEAD);
        assert_eq!(crate::upload_body_limit(u64::MAX), usize::MAX);
    }

    #[tokio::test]
    async fn test_huge_image_limit_builds_router() {
        let mut config = create_test_config();
        config.classifier.max_image_size = u64::MAX;
        let server = create_test_server(config);

        server.get("/healthz").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_openapi_json_endpoint() {
        let server = create_test_server(create_test_config());

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();

        let doc: serde_json::Value = response.json();
        assert!(doc["paths"]["/api/v1/temple-info"].is_object());
        assert!(doc["paths"]["/api/v1/{collection}"].is_object());
    }

    #[tokio::test]
    async fn test_cors_allows_configured_origin() {
        let server = create_test_server(create_test_config());

        let response = server
            .get("/healthz")
            .add_header(HeaderName::from_static("origin"), HeaderValue::from_static("http://localhost:5173"))
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(
            response.header("access-control-allow-origin"),
            HeaderValue::from_static("http://localhost:5173")
        );
    }

    #[tokio::test]
    async fn test_cors_wildcard_origin() {
        let mut config = create_test_config();
        config.cors.allowed_origins = vec![CorsOrigin::Wildcard];
        let server = create_test_server(config);

        let response = server
            .get("/healthz")
            .add_header(HeaderName::from_static("origin"), HeaderValue::from_static("https://example.org"))
            .await;

        assert_eq!(response.header("access-control-allow-origin"), HeaderValue::from_static("*"));
    }
}
