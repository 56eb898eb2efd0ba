//! Static travel catalog: categories, place pages and AR model descriptors.
//!
//! The catalog is an embedded JSON document (`assets/catalog.json`) parsed once at startup and
//! shared read-only between handlers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::info;
use utoipa::ToSchema;

use crate::static_assets;

const CATALOG_PATH: &str = "catalog.json";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("embedded asset {0} is missing or not UTF-8")]
    Missing(&'static str),

    #[error("catalog is not valid: {0}")]
    Invalid(#[from] serde_json::Error),

    #[error("catalog defines category '{0}' more than once")]
    DuplicateCategory(String),
}

/// One entry listed on a category page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CatalogItem {
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: String,
    pub title: String,
    pub description: String,
    pub items: Vec<CatalogItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlaceSection {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// Detailed page for a single place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Place {
    pub category: String,
    pub slug: String,
    pub name: String,
    pub title: String,
    pub hero_image: String,
    pub description: String,
    #[serde(default)]
    pub sections: Vec<PlaceSection>,
    #[serde(default)]
    pub facts: Vec<String>,
    #[serde(default)]
    pub tips: Vec<String>,
}

/// Assets for viewing a place as a 3D model in AR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ArModel {
    pub category: String,
    pub slug: String,
    pub name: String,
    pub model_src: String,
    pub ios_src: String,
    pub poster: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    places: Vec<Place>,
    #[serde(default)]
    ar_models: Vec<ArModel>,
}

impl Catalog {
    /// Parse the catalog compiled into the binary.
    pub fn load() -> Result<Self, CatalogError> {
        let json = static_assets::text(CATALOG_PATH).ok_or(CatalogError::Missing(CATALOG_PATH))?;
        let catalog = Self::from_json(&json)?;
        info!(
            categories = catalog.categories.len(),
            places = catalog.places.len(),
            ar_models = catalog.ar_models.len(),
            "Loaded travel catalog"
        );
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;

        let mut seen = HashSet::new();
        for category in &catalog.categories {
            if !seen.insert(category.id.as_str()) {
                return Err(CatalogError::DuplicateCategory(category.id.clone()));
            }
        }
        Ok(catalog)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn place(&self, category: &str, slug: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.category == category && p.slug == slug)
    }

    pub fn ar_model(&self, category: &str, slug: &str) -> Option<&ArModel> {
        self.ar_models.iter().find(|m| m.category == category && m.slug == slug)
    }

    pub fn has_ar_model(&self, category: &str, slug: &str) -> bool {
        self.ar_model(category, slug).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = Catalog::load().unwrap();

        let ids: Vec<&str> = catalog.categories().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["temples", "waterfalls", "forts", "mountains", "food", "dance-art", "clothes"]
        );
        assert!(catalog.categories().iter().all(|c| !c.items.is_empty()));
    }

    #[test]
    fn test_lookups() {
        let catalog = Catalog::load().unwrap();

        let temples = catalog.category("temples").unwrap();
        assert!(temples.items.iter().any(|i| i.slug == "virupaksha-temple"));
        assert!(catalog.category("beaches").is_none());

        let jog = catalog.place("waterfalls", "jog-falls").unwrap();
        assert_eq!(jog.name, "Jog Falls");
        assert!(!jog.sections.is_empty());
        assert!(catalog.place("temples", "jog-falls").is_none());

        assert!(catalog.has_ar_model("waterfalls", "jog-falls"));
        assert!(catalog.has_ar_model("temples", "virupaksha-temple"));
        assert!(!catalog.has_ar_model("forts", "bidar-fort"));
        assert_eq!(
            catalog.ar_model("waterfalls", "jog-falls").unwrap().model_src,
            "/models/jog-falls.glb"
        );
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let json = r#"{"categories": [
            {"id": "forts", "title": "A", "description": "", "items": []},
            {"id": "forts", "title": "B", "description": "", "items": []}
        ]}"#;

        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateCategory(id) if id == "forts"));
    }

    #[test]
    fn test_section_image_is_optional() {
        let json = r#"{"places": [{
            "category": "forts", "slug": "bidar-fort", "name": "Bidar Fort", "title": "Bidar Fort",
            "hero_image": "/bidar.jpg", "description": "Bahmani citadel",
            "sections": [{"title": "History", "content": "Built in 1428"}]
        }]}"#;

        let catalog = Catalog::from_json(json).unwrap();
        let place = catalog.place("forts", "bidar-fort").unwrap();
        assert_eq!(place.sections[0].image, None);
        assert!(place.facts.is_empty());
    }
}
