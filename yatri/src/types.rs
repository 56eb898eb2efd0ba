//! Common type definitions shared by the API, storage and classifier layers.
//!
//! # ID Types
//!
//! Marker IDs are UUIDs behind a type alias, like every other persisted entity:
//!
//! - [`MarkerId`]: Map locator marker identifier
//!
//! # Marker kinds
//!
//! The map locator tracks four kinds of points of interest. Each kind lives in its own
//! collection on the wire (`/api/v1/dustbins`, `/api/v1/hospitals`, ...) but shares one
//! storage table keyed by [`MarkerKind`].

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;
use uuid::Uuid;

pub type MarkerId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

/// Kind of point of interest a marker represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Dustbin,
    Hospital,
    Hotel,
    Restaurant,
}

impl MarkerKind {
    pub const ALL: [MarkerKind; 4] = [MarkerKind::Dustbin, MarkerKind::Hospital, MarkerKind::Hotel, MarkerKind::Restaurant];

    /// Storage representation, also used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::Dustbin => "dustbin",
            MarkerKind::Hospital => "hospital",
            MarkerKind::Hotel => "hotel",
            MarkerKind::Restaurant => "restaurant",
        }
    }

    /// Collection name used in URL paths.
    pub fn collection(&self) -> &'static str {
        match self {
            MarkerKind::Dustbin => "dustbins",
            MarkerKind::Hospital => "hospitals",
            MarkerKind::Hotel => "hotels",
            MarkerKind::Restaurant => "restaurants",
        }
    }

    pub fn from_collection(collection: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.collection() == collection)
    }

    /// Hospitals and hotels are classified with a free-text type ("Govt", "5-Star", ...)
    pub fn requires_type(&self) -> bool {
        matches!(self, MarkerKind::Hospital | MarkerKind::Hotel)
    }
}

impl fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown marker kind '{s}'"))
    }
}

/// Fill level reported for a dustbin marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum DustbinStatus {
    #[default]
    Available,
    #[serde(rename = "Almost Full")]
    AlmostFull,
    Full,
}

impl DustbinStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DustbinStatus::Available => "Available",
            DustbinStatus::AlmostFull => "Almost Full",
            DustbinStatus::Full => "Full",
        }
    }
}

impl fmt::Display for DustbinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DustbinStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(DustbinStatus::Available),
            "Almost Full" => Ok(DustbinStatus::AlmostFull),
            "Full" => Ok(DustbinStatus::Full),
            other => Err(format!("unknown dustbin status '{other}'")),
        }
    }
}
