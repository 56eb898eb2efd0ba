use crate::api::models::catalog::{ArModelResponse, CategorySummary, PlaceResponse};
use crate::catalog::Category;
use crate::errors::{Error, Result};
use crate::AppState;
use axum::{
    extract::{Path, State},
    Json,
};

#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "catalog",
    summary = "List categories",
    responses((status = 200, description = "Catalog categories without their items", body = Vec<CategorySummary>))
)]
#[tracing::instrument(skip_all)]
pub async fn list_categories(State(state): State<AppState>) -> Json<Vec<CategorySummary>> {
    Json(state.catalog.categories().iter().map(CategorySummary::from).collect())
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    tag = "catalog",
    summary = "Get category",
    params(("id" = String, Path, description = "Category ID, e.g. temples")),
    responses(
        (status = 200, description = "Category with its items", body = Category),
        (status = 404, description = "Unknown category")
    )
)]
#[tracing::instrument(skip_all, fields(category = %id))]
pub async fn get_category(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Category>> {
    state.catalog.category(&id).cloned().map(Json).ok_or_else(|| Error::NotFound {
        resource: "Category".to_string(),
        id,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/places/{category}/{slug}",
    tag = "catalog",
    summary = "Get place",
    params(
        ("category" = String, Path, description = "Category ID"),
        ("slug" = String, Path, description = "Place slug"),
    ),
    responses(
        (status = 200, description = "Place page", body = PlaceResponse),
        (status = 404, description = "Unknown place")
    )
)]
#[tracing::instrument(skip_all, fields(category = %category, slug = %slug))]
pub async fn get_place(
    State(state): State<AppState>,
    Path((category, slug)): Path<(String, String)>,
) -> Result<Json<PlaceResponse>> {
    let place = state.catalog.place(&category, &slug).ok_or_else(|| Error::NotFound {
        resource: "Place".to_string(),
        id: format!("{category}/{slug}"),
    })?;

    Ok(Json(PlaceResponse {
        place: place.clone(),
        has_ar_model: state.catalog.has_ar_model(&category, &slug),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/places/{category}/{slug}/ar",
    tag = "catalog",
    summary = "Get AR model",
    description = "AR viewer assets for a place. Places without a model get a placeholder with `available: false`.",
    params(
        ("category" = String, Path, description = "Category ID"),
        ("slug" = String, Path, description = "Place slug"),
    ),
    responses((status = 200, description = "AR model descriptor", body = ArModelResponse))
)]
#[tracing::instrument(skip_all, fields(category = %category, slug = %slug))]
pub async fn get_ar_model(
    State(state): State<AppState>,
    Path((category, slug)): Path<(String, String)>,
) -> Json<ArModelResponse> {
    let model = state
        .catalog
        .ar_model(&category, &slug)
        .map(ArModelResponse::from)
        .unwrap_or_else(ArModelResponse::unavailable);
    Json(model)
}
