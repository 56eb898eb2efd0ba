use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TripRequest {
    /// Free-text description of the trip, e.g. "3-day trip to Coorg"
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TripResponse {
    /// Itinerary as an HTML fragment
    pub result: String,
}
