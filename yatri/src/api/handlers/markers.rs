use crate::api::models::markers::{MarkerCreate, MarkerResponse, MarkerUpdate};
use crate::api::models::pagination::Pagination;
use crate::db::handlers::{markers::MarkerFilter, Repository};
use crate::db::models::markers::MarkerDBResponse;
use crate::errors::{Error, Result};
use crate::types::{MarkerId, MarkerKind};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

fn kind_for(collection: &str) -> Result<MarkerKind> {
    MarkerKind::from_collection(collection).ok_or_else(|| Error::NotFound {
        resource: "Collection".to_string(),
        id: collection.to_string(),
    })
}

/// Fetch a marker, treating a marker of another kind as missing.
async fn find_marker(state: &AppState, kind: MarkerKind, id: MarkerId) -> Result<MarkerDBResponse> {
    state
        .markers
        .get_by_id(id)
        .await?
        .filter(|marker| marker.kind == kind)
        .ok_or_else(|| Error::NotFound {
            resource: "Marker".to_string(),
            id: id.to_string(),
        })
}

#[utoipa::path(
    get,
    path = "/api/v1/{collection}",
    tag = "markers",
    summary = "List markers",
    description = "List the markers of one collection in creation order.",
    params(
        ("collection" = String, Path, description = "One of dustbins, hospitals, hotels, restaurants"),
        Pagination,
    ),
    responses(
        (status = 200, description = "Markers in the collection", body = Vec<MarkerResponse>),
        (status = 404, description = "Unknown collection"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_markers(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<Vec<MarkerResponse>>> {
    let kind = kind_for(&collection)?;

    let markers = state
        .markers
        .list(&MarkerFilter::new(Some(kind), pagination.skip(), pagination.limit()))
        .await?;

    Ok(Json(markers.into_iter().map(MarkerResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/{collection}",
    tag = "markers",
    summary = "Create marker",
    params(("collection" = String, Path, description = "One of dustbins, hospitals, hotels, restaurants")),
    request_body = MarkerCreate,
    responses(
        (status = 201, description = "Marker created", body = MarkerResponse),
        (status = 400, description = "Invalid coordinates or missing kind-specific field"),
        (status = 404, description = "Unknown collection"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_marker(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Json(body): Json<MarkerCreate>,
) -> Result<(StatusCode, Json<MarkerResponse>)> {
    let kind = kind_for(&collection)?;
    let request = body.into_db_request(kind)?;

    let marker = state.markers.create(&request).await?;
    tracing::info!(marker_id = %marker.id, kind = %kind, "Created marker");

    Ok((StatusCode::CREATED, Json(marker.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/{collection}/{id}",
    tag = "markers",
    summary = "Get marker",
    params(
        ("collection" = String, Path, description = "One of dustbins, hospitals, hotels, restaurants"),
        ("id" = uuid::Uuid, Path, description = "Marker ID"),
    ),
    responses(
        (status = 200, description = "Marker", body = MarkerResponse),
        (status = 404, description = "Marker not found in this collection"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_marker(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, MarkerId)>,
) -> Result<Json<MarkerResponse>> {
    let kind = kind_for(&collection)?;
    let marker = find_marker(&state, kind, id).await?;
    Ok(Json(marker.into()))
}

#[utoipa::path(
    patch,
    path = "/api/v1/{collection}/{id}",
    tag = "markers",
    summary = "Update marker",
    description = "Partially update a marker. Only dustbins accept `status`.",
    params(
        ("collection" = String, Path, description = "One of dustbins, hospitals, hotels, restaurants"),
        ("id" = uuid::Uuid, Path, description = "Marker ID"),
    ),
    request_body = MarkerUpdate,
    responses(
        (status = 200, description = "Updated marker", body = MarkerResponse),
        (status = 400, description = "Invalid update"),
        (status = 404, description = "Marker not found in this collection"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_marker(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, MarkerId)>,
    Json(body): Json<MarkerUpdate>,
) -> Result<Json<MarkerResponse>> {
    let kind = kind_for(&collection)?;
    let request = body.into_db_request(kind)?;
    find_marker(&state, kind, id).await?;

    let marker = state.markers.update(id, &request).await?;
    Ok(Json(marker.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/{collection}/{id}",
    tag = "markers",
    summary = "Delete marker",
    params(
        ("collection" = String, Path, description = "One of dustbins, hospitals, hotels, restaurants"),
        ("id" = uuid::Uuid, Path, description = "Marker ID"),
    ),
    responses(
        (status = 204, description = "Marker deleted"),
        (status = 404, description = "Marker not found in this collection"),
        (status = 500, description = "Internal server error")
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_marker(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, MarkerId)>,
) -> Result<StatusCode> {
    let kind = kind_for(&collection)?;
    find_marker(&state, kind, id).await?;

    if state.markers.delete(id).await? {
        tracing::info!(marker_id = %id, kind = %kind, "Deleted marker");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(Error::NotFound {
            resource: "Marker".to_string(),
            id: id.to_string(),
        })
    }
}
