use crate::catalog::{ArModel, Category, Place};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const DEFAULT_MODEL_SRC: &str = "/models/default.glb";
const DEFAULT_IOS_SRC: &str = "/models/default.usdz";
const DEFAULT_POSTER: &str = "/placeholder.svg?height=600&width=800";

/// Category without its item list, for index pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub item_count: usize,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.clone(),
            title: category.title.clone(),
            description: category.description.clone(),
            item_count: category.items.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlaceResponse {
    #[serde(flatten)]
    pub place: Place,
    /// Whether `/places/{category}/{slug}/ar` has a model for this place
    pub has_ar_model: bool,
}

/// AR viewer descriptor. Places without a model get a placeholder with `available: false`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ArModelResponse {
    pub available: bool,
    pub name: String,
    pub model_src: String,
    pub ios_src: String,
    pub poster: String,
    pub description: String,
}

impl ArModelResponse {
    pub fn unavailable() -> Self {
        Self {
            available: false,
            name: "Model Not Available".to_string(),
            model_src: DEFAULT_MODEL_SRC.to_string(),
            ios_src: DEFAULT_IOS_SRC.to_string(),
            poster: DEFAULT_POSTER.to_string(),
            description: "3D model not available for this location yet.".to_string(),
        }
    }
}

impl From<&ArModel> for ArModelResponse {
    fn from(model: &ArModel) -> Self {
        Self {
            available: true,
            name: model.name.clone(),
            model_src: model.model_src.clone(),
            ios_src: model.ios_src.clone(),
            poster: model.poster.clone(),
            description: model.description.clone(),
        }
    }
}
