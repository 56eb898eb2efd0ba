//! `/api/dustbins`, the dustbin endpoints kept for map frontends that predate `/api/v1`.

use crate::api::models::markers::{LegacyDustbin, LegacyMessage, MarkerCreate};
use crate::api::models::pagination::MAX_LIMIT;
use crate::db::handlers::{markers::MarkerFilter, Repository};
use crate::errors::Result;
use crate::types::MarkerKind;
use crate::AppState;
use axum::{extract::State, Json};

#[utoipa::path(
    get,
    path = "/api/dustbins",
    tag = "markers",
    summary = "List dustbins (legacy)",
    responses(
        (status = 200, description = "All dustbins as lat/lng pairs", body = Vec<LegacyDustbin>),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_dustbins(State(state): State<AppState>) -> Result<Json<Vec<LegacyDustbin>>> {
    let dustbins = state
        .markers
        .list(&MarkerFilter::new(Some(MarkerKind::Dustbin), 0, MAX_LIMIT))
        .await?;

    Ok(Json(dustbins.into_iter().map(LegacyDustbin::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/dustbins",
    tag = "markers",
    summary = "Save dustbin (legacy)",
    request_body = LegacyDustbin,
    responses(
        (status = 200, description = "Dustbin saved", body = LegacyMessage),
        (status = 400, description = "Invalid coordinates"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_dustbin(
    State(state): State<AppState>,
    Json(body): Json<LegacyDustbin>,
) -> Result<Json<LegacyMessage>> {
    let request = MarkerCreate {
        latitude: body.lat,
        longitude: body.lng,
        status: None,
        marker_type: None,
        name: None,
        description: body.description,
    }
    .into_db_request(MarkerKind::Dustbin)?;

    let marker = state.markers.create(&request).await?;
    tracing::info!(marker_id = %marker.id, "Saved dustbin via legacy endpoint");

    Ok(Json(LegacyMessage {
        message: "Dustbin saved successfully".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use crate::api::models::markers::{LegacyDustbin, MarkerResponse};
    use crate::test_utils::*;
    use crate::types::DustbinStatus;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_legacy_round_trip() {
        let server = create_test_server(create_test_config());

        let response = server
            .post("/api/dustbins")
            .json(&json!({"lat": 12.9716, "lng": 77.5946, "description": "Near Cubbon Park gate"}))
            .await;
        response.assert_status(StatusCode::OK);
        response.assert_json(&json!({"message": "Dustbin saved successfully"}));

        let dustbins: Vec<LegacyDustbin> = server.get("/api/dustbins").await.json();
        assert_eq!(dustbins.len(), 1);
        assert_eq!(dustbins[0].lat, 12.9716);
        assert_eq!(dustbins[0].lng, 77.5946);
        assert_eq!(dustbins[0].description.as_deref(), Some("Near Cubbon Park gate"));

        // Visible through the versioned collection too
        let markers: Vec<MarkerResponse> = server.get("/api/v1/dustbins").await.json();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].status, Some(DustbinStatus::Available));
    }

    #[tokio::test]
    async fn test_legacy_list_excludes_other_kinds() {
        let server = create_test_server(create_test_config());
        server
            .post("/api/v1/hotels")
            .json(&json!({"latitude": 12.0, "longitude": 77.0, "type": "Budget"}))
            .await
            .assert_status(StatusCode::CREATED);

        let dustbins: Vec<LegacyDustbin> = server.get("/api/dustbins").await.json();
        assert!(dustbins.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_rejects_bad_coordinates() {
        let server = create_test_server(create_test_config());

        server
            .post("/api/dustbins")
            .json(&json!({"lat": 12.0, "lng": 200.0}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
