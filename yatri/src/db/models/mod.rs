//! Storage record models.
//!
//! These are distinct from the API models in [`crate::api::models`] so that the wire format and
//! the stored representation can evolve independently. API models convert from them with `From`.

pub mod markers;
