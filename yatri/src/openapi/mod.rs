//! OpenAPI document for every route the service exposes.
//!
//! Served as JSON at `/api-docs/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::markers::list_markers,
        api::handlers::markers::create_marker,
        api::handlers::markers::get_marker,
        api::handlers::markers::update_marker,
        api::handlers::markers::delete_marker,
        api::handlers::dustbins::list_dustbins,
        api::handlers::dustbins::create_dustbin,
        api::handlers::catalog::list_categories,
        api::handlers::catalog::get_category,
        api::handlers::catalog::get_place,
        api::handlers::catalog::get_ar_model,
        api::handlers::trips::generate_trip,
        api::handlers::temples::temple_info,
    ),
    components(
        schemas(
            api::models::markers::MarkerCreate,
            api::models::markers::MarkerUpdate,
            api::models::markers::MarkerResponse,
            api::models::markers::LegacyDustbin,
            api::models::markers::LegacyMessage,
            api::models::catalog::CategorySummary,
            api::models::catalog::PlaceResponse,
            api::models::catalog::ArModelResponse,
            api::models::trips::TripRequest,
            api::models::trips::TripResponse,
            crate::catalog::Category,
            crate::catalog::CatalogItem,
            crate::catalog::Place,
            crate::catalog::PlaceSection,
            crate::types::MarkerKind,
            crate::types::DustbinStatus,
        )
    ),
    tags(
        (name = "markers", description = "Dustbins, hospitals, hotels and restaurants placed on the map"),
        (name = "catalog", description = "Static travel categories, place pages and AR model descriptors"),
        (name = "trips", description = "Template itineraries generated from a free-text prompt"),
        (name = "temples", description = "Temple identification from a photograph"),
    ),
    info(
        title = "yatri API",
        description = "Map locator and Karnataka tourism backend.",
    )
)]
pub struct ApiDoc;
