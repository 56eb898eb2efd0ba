use crate::api::models::trips::{TripRequest, TripResponse};
use crate::errors::{Error, Result};
use crate::AppState;
use axum::{extract::State, Json};

#[utoipa::path(
    post,
    path = "/api/v1/trips",
    tag = "trips",
    summary = "Generate itinerary",
    description = "Build an HTML itinerary from a free-text prompt such as \"3-day trip to Coorg\". Also served at `/api/generate-trip`.",
    request_body = TripRequest,
    responses(
        (status = 200, description = "Rendered itinerary", body = TripResponse),
        (status = 400, description = "Prompt is missing or blank"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn generate_trip(State(state): State<AppState>, Json(body): Json<TripRequest>) -> Result<Json<TripResponse>> {
    let prompt = body
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| Error::BadRequest {
            message: "Prompt is required".to_string(),
        })?;

    let result = state.planner.plan(prompt).map_err(|e| {
        tracing::error!(error = %e, "Itinerary rendering failed");
        Error::Internal {
            operation: "generate itinerary".to_string(),
        }
    })?;

    let latency = state.config.trips.simulated_latency;
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }

    Ok(Json(TripResponse { result }))
}

#[cfg(test)]
mod tests {
    use crate::api::models::trips::TripResponse;
    use crate::test_utils::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_generate_trip() {
        let server = create_test_server(create_test_config());

        let response = server.post("/api/v1/trips").json(&json!({"prompt": "Plan a 3-day trip to Coorg"})).await;
        response.assert_status_ok();
        let trip: TripResponse = response.json();
        assert!(trip.result.contains("Your 3-Day Coorg Adventure"));
        assert!(trip.result.contains("Day 1: Arrival & Relaxation"));
    }

    #[tokio::test]
    async fn test_legacy_path() {
        let server = create_test_server(create_test_config());

        let trip: TripResponse = server
            .post("/api/generate-trip")
            .json(&json!({"prompt": "hampi"}))
            .await
            .json();
        assert!(trip.result.contains("Hampi Cultural Tour"));
    }

    #[tokio::test]
    async fn test_prompt_required() {
        let server = create_test_server(create_test_config());

        for body in [json!({}), json!({"prompt": ""}), json!({"prompt": "   "})] {
            let response = server.post("/api/v1/trips").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            response.assert_json(&json!({"error": "Prompt is required"}));
        }
    }

    #[tokio::test]
    async fn test_simulated_latency() {
        let mut config = create_test_config();
        config.trips.simulated_latency = Duration::from_millis(150);
        let server = create_test_server(config);

        let started = Instant::now();
        server
            .post("/api/v1/trips")
            .json(&json!({"prompt": "Mysore"}))
            .await
            .assert_status_ok();
        assert!(started.elapsed() >= Duration::from_millis(150));
    }
}
