//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Markers** (`/api/v1/{collection}`): dustbins, hospitals, hotels and restaurants on the map
//! - **Catalog** (`/api/v1/categories`, `/api/v1/places/*`): static travel pages and AR models
//! - **Trips** (`/api/v1/trips`): template itineraries from a free-text prompt
//! - **Temples** (`/api/v1/temple-info`): temple identification from an uploaded photo
//! - **Legacy** (`/api/dustbins`, `/api/generate-trip`, `/api/temple-info`): unversioned paths
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. Interactive documentation is served at
//! `/docs` and the raw document at `/api-docs/openapi.json`.

pub mod handlers;
pub mod models;
