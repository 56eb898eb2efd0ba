//! Repository implementations for storage access.
//!
//! Repositories implement the [`Repository`] trait and return domain models from
//! [`crate::db::models`]. Handlers receive a [`MarkerStore`](crate::db::MarkerStore) and never
//! know which implementation backs it.
//!
//! # Available Repositories
//!
//! - [`PostgresMarkers`]: markers in the `markers` table
//! - [`InMemoryMarkers`]: markers in a process-local map
//!
//! # Common Pattern
//!
//! ```ignore
//! use yatri::db::handlers::{markers::MarkerFilter, Repository};
//! use yatri::types::MarkerKind;
//!
//! async fn example(store: yatri::db::MarkerStore) -> Result<(), Box<dyn std::error::Error>> {
//!     let dustbins = store.list(&MarkerFilter::new(Some(MarkerKind::Dustbin), 0, 100)).await?;
//!     println!("{} dustbins", dustbins.len());
//!     Ok(())
//! }
//! ```

pub mod markers;
pub mod repository;

pub use markers::{InMemoryMarkers, PostgresMarkers};
pub use repository::Repository;
