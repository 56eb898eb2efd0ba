use crate::types::{DustbinStatus, MarkerId, MarkerKind};
use chrono::{DateTime, Utc};

/// Database request for creating a new marker
#[derive(Debug, Clone)]
pub struct MarkerCreateDBRequest {
    pub kind: MarkerKind,
    pub latitude: f64,
    pub longitude: f64,
    pub status: Option<DustbinStatus>,
    pub marker_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Database request for updating a marker. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct MarkerUpdateDBRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<DustbinStatus>,
    pub marker_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Database response for a marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerDBResponse {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub latitude: f64,
    pub longitude: f64,
    pub status: Option<DustbinStatus>,
    pub marker_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
