use crate::db::models::markers::{MarkerCreateDBRequest, MarkerDBResponse, MarkerUpdateDBRequest};
use crate::errors::{Error, Result};
use crate::types::{DustbinStatus, MarkerId, MarkerKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn check_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<()> {
    if let Some(lat) = latitude.filter(|lat| !(-90.0..=90.0).contains(lat)) {
        return Err(Error::BadRequest {
            message: format!("latitude must be between -90 and 90, got {lat}"),
        });
    }
    if let Some(lng) = longitude.filter(|lng| !(-180.0..=180.0).contains(lng)) {
        return Err(Error::BadRequest {
            message: format!("longitude must be between -180 and 180, got {lng}"),
        });
    }
    Ok(())
}

/// Trim a free-text field, treating blank input as absent
fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// Request models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkerCreate {
    pub latitude: f64,
    pub longitude: f64,
    /// Dustbins only; defaults to `Available`
    pub status: Option<DustbinStatus>,
    /// Required for hospitals (Govt, Private, Clinic) and hotels (Budget, 3-Star, 5-Star)
    #[serde(rename = "type")]
    pub marker_type: Option<String>,
    /// Required for restaurants
    pub name: Option<String>,
    pub description: Option<String>,
}

impl MarkerCreate {
    /// Validate against the rules for `kind` and build the storage request.
    pub fn into_db_request(self, kind: MarkerKind) -> Result<MarkerCreateDBRequest> {
        check_coordinates(Some(self.latitude), Some(self.longitude))?;

        let status = match (kind, self.status) {
            (MarkerKind::Dustbin, status) => Some(status.unwrap_or_default()),
            (_, None) => None,
            (_, Some(_)) => {
                return Err(Error::BadRequest {
                    message: format!("status is only supported for dustbins, not {}", kind.collection()),
                });
            }
        };

        let marker_type = non_blank(self.marker_type);
        if kind.requires_type() && marker_type.is_none() {
            return Err(Error::BadRequest {
                message: format!("type is required for {}", kind.collection()),
            });
        }

        let name = non_blank(self.name);
        if kind == MarkerKind::Restaurant && name.is_none() {
            return Err(Error::BadRequest {
                message: "name is required for restaurants".to_string(),
            });
        }

        Ok(MarkerCreateDBRequest {
            kind,
            latitude: self.latitude,
            longitude: self.longitude,
            status,
            marker_type,
            name,
            description: non_blank(self.description),
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct MarkerUpdate {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<DustbinStatus>,
    #[serde(rename = "type")]
    pub marker_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl MarkerUpdate {
    pub fn into_db_request(self, kind: MarkerKind) -> Result<MarkerUpdateDBRequest> {
        check_coordinates(self.latitude, self.longitude)?;

        if self.status.is_some() && kind != MarkerKind::Dustbin {
            return Err(Error::BadRequest {
                message: format!("status is only supported for dustbins, not {}", kind.collection()),
            });
        }

        // An explicitly blank required field would leave the marker invalid
        let marker_type = non_blank(self.marker_type.clone());
        if kind.requires_type() && self.marker_type.is_some() && marker_type.is_none() {
            return Err(Error::BadRequest {
                message: format!("type cannot be empty for {}", kind.collection()),
            });
        }
        let name = non_blank(self.name.clone());
        if kind == MarkerKind::Restaurant && self.name.is_some() && name.is_none() {
            return Err(Error::BadRequest {
                message: "name cannot be empty for restaurants".to_string(),
            });
        }

        Ok(MarkerUpdateDBRequest {
            latitude: self.latitude,
            longitude: self.longitude,
            status: self.status,
            marker_type,
            name,
            description: self.description.map(|d| d.trim().to_string()),
        })
    }
}

// Response models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MarkerResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DustbinStatus>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub marker_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<MarkerDBResponse> for MarkerResponse {
    fn from(db: MarkerDBResponse) -> Self {
        Self {
            id: db.id,
            kind: db.kind,
            latitude: db.latitude,
            longitude: db.longitude,
            status: db.status,
            marker_type: db.marker_type,
            name: db.name,
            description: db.description,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Dustbin payload of the legacy `/api/dustbins` endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LegacyDustbin {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<MarkerDBResponse> for LegacyDustbin {
    fn from(db: MarkerDBResponse) -> Self {
        Self {
            lat: db.latitude,
            lng: db.longitude,
            description: db.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LegacyMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(latitude: f64, longitude: f64) -> MarkerCreate {
        MarkerCreate {
            latitude,
            longitude,
            status: None,
            marker_type: None,
            name: None,
            description: None,
        }
    }

    #[test]
    fn test_dustbin_status_defaults_to_available() {
        let request = create(12.97, 77.59).into_db_request(MarkerKind::Dustbin).unwrap();
        assert_eq!(request.status, Some(DustbinStatus::Available));
    }

    #[test]
    fn test_status_rejected_on_other_kinds() {
        let mut body = create(12.97, 77.59);
        body.status = Some(DustbinStatus::Full);
        body.marker_type = Some("Govt".to_string());

        let err = body.into_db_request(MarkerKind::Hospital).unwrap_err();
        assert!(err.user_message().contains("only supported for dustbins"));
    }

    #[test]
    fn test_type_required_for_hospitals_and_hotels() {
        for kind in [MarkerKind::Hospital, MarkerKind::Hotel] {
            assert!(create(12.97, 77.59).into_db_request(kind).is_err());

            let mut blank = create(12.97, 77.59);
            blank.marker_type = Some("   ".to_string());
            assert!(blank.into_db_request(kind).is_err());
        }

        let mut body = create(12.97, 77.59);
        body.marker_type = Some(" 5-Star ".to_string());
        let request = body.into_db_request(MarkerKind::Hotel).unwrap();
        assert_eq!(request.marker_type.as_deref(), Some("5-Star"));
        assert_eq!(request.status, None);
    }

    #[test]
    fn test_name_required_for_restaurants() {
        assert!(create(12.97, 77.59).into_db_request(MarkerKind::Restaurant).is_err());

        let mut body = create(12.97, 77.59);
        body.name = Some("Mylari Dosa".to_string());
        assert!(body.into_db_request(MarkerKind::Restaurant).is_ok());
    }

    #[test]
    fn test_coordinates_validated() {
        assert!(create(90.5, 0.0).into_db_request(MarkerKind::Dustbin).is_err());
        assert!(create(0.0, -180.5).into_db_request(MarkerKind::Dustbin).is_err());
        assert!(create(-90.0, 180.0).into_db_request(MarkerKind::Dustbin).is_ok());

        let update = MarkerUpdate {
            latitude: Some(100.0),
            ..Default::default()
        };
        assert!(update.into_db_request(MarkerKind::Dustbin).is_err());
    }

    #[test]
    fn test_update_status_only_for_dustbins() {
        let update = MarkerUpdate {
            status: Some(DustbinStatus::Full),
            ..Default::default()
        };
        assert!(update.clone().into_db_request(MarkerKind::Restaurant).is_err());
        assert_eq!(
            update.into_db_request(MarkerKind::Dustbin).unwrap().status,
            Some(DustbinStatus::Full)
        );
    }

    #[test]
    fn test_type_field_wire_name() {
        let body: MarkerCreate = serde_json::from_str(r#"{"latitude": 1.0, "longitude": 2.0, "type": "Clinic"}"#).unwrap();
        assert_eq!(body.marker_type.as_deref(), Some("Clinic"));
    }
}
