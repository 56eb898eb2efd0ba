//! API request and response data models.
//!
//! These structures define the public wire contract. They are kept apart from the storage models in
//! [`crate::db::models`] and converted with `From`, and they carry `utoipa` annotations for the
//! generated API docs.
//!
//! - [`markers`]: map locator markers, including the legacy dustbin payloads
//! - [`catalog`]: category summaries, place pages and AR descriptors
//! - [`trips`]: trip planner prompt and result
//! - [`temples`]: temple identification response
//! - [`pagination`]: `skip`/`limit` query parameters

pub mod catalog;
pub mod markers;
pub mod pagination;
pub mod temples;
pub mod trips;
