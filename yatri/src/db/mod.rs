//! Storage layer for map locator markers.
//!
//! This module follows the Repository pattern: handlers talk to a [`MarkerStore`], a shared trait
//! object that is either backed by PostgreSQL (through SQLx) or by a process-local map.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ MarkerStore │  (db::handlers - Repository implementations)
//! └──────┬──────┘
//!        │
//!   ┌────┴─────┐
//!   ↓          ↓
//! ┌──────────┐ ┌────────┐
//! │PostgreSQL│ │DashMap │
//! └──────────┘ └────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Stored record structures
//! - [`errors`]: Storage error types
//!
//! # Migrations
//!
//! Migrations live in the `migrations/` directory and are applied by [`connect_marker_store`]
//! whenever the PostgreSQL store is configured.

pub mod errors;
pub mod handlers;
pub mod models;

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::config::{MarkerStoreConfig, PoolSettings};
use crate::types::MarkerId;
use handlers::markers::MarkerFilter;
use handlers::{InMemoryMarkers, PostgresMarkers, Repository};
use models::markers::{MarkerCreateDBRequest, MarkerDBResponse, MarkerUpdateDBRequest};

/// Shared handle to whichever marker repository is configured.
pub type MarkerStore = Arc<
    dyn Repository<
            CreateRequest = MarkerCreateDBRequest,
            UpdateRequest = MarkerUpdateDBRequest,
            Response = MarkerDBResponse,
            Id = MarkerId,
            Filter = MarkerFilter,
        >,
>;

/// Get the marker database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the configured marker store. Returns the pool as well when PostgreSQL backs the store, so
/// the caller can close it on shutdown.
pub async fn connect_marker_store(config: &MarkerStoreConfig) -> anyhow::Result<(MarkerStore, Option<PgPool>)> {
    match config {
        MarkerStoreConfig::Memory => {
            info!("Using in-memory marker store; markers are lost on restart");
            Ok((Arc::new(InMemoryMarkers::new()), None))
        }
        MarkerStoreConfig::Postgres { url, pool } => {
            info!("Using PostgreSQL marker store");
            let pool = pool_options(pool).connect(url).await?;
            migrator().run(&pool).await?;
            Ok((Arc::new(PostgresMarkers::new(pool.clone())), Some(pool)))
        }
    }
}

fn pool_options(settings: &PoolSettings) -> PgPoolOptions {
    let mut options = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs));

    // 0 disables the timeout
    if settings.idle_timeout_secs > 0 {
        options = options.idle_timeout(Duration::from_secs(settings.idle_timeout_secs));
    }
    if settings.max_lifetime_secs > 0 {
        options = options.max_lifetime(Duration::from_secs(settings.max_lifetime_secs));
    }
    options
}
