//! HTTP request handlers for all API endpoints.
//!
//! Handlers validate input, call into the marker store, catalog, trip planner or classifier held
//! in [`crate::AppState`], and map failures to [`crate::errors::Error`].

pub mod catalog;
pub mod dustbins;
pub mod markers;
pub mod temples;
pub mod trips;
