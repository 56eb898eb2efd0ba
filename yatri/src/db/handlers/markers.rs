//! Marker repositories: PostgreSQL for deployments, in-memory for development and tests.

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::markers::{MarkerCreateDBRequest, MarkerDBResponse, MarkerUpdateDBRequest};
use crate::types::{abbrev_uuid, DustbinStatus, MarkerId, MarkerKind};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::{FromRow, PgPool};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing markers
#[derive(Debug, Clone)]
pub struct MarkerFilter {
    pub kind: Option<MarkerKind>,
    pub skip: i64,
    pub limit: i64,
}

impl MarkerFilter {
    pub fn new(kind: Option<MarkerKind>, skip: i64, limit: i64) -> Self {
        Self { kind, skip, limit }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Marker {
    pub id: MarkerId,
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: Option<String>,
    pub marker_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Marker> for MarkerDBResponse {
    type Error = anyhow::Error;

    fn try_from(src: Marker) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            id: src.id,
            kind: src.kind.parse().map_err(anyhow::Error::msg)?,
            latitude: src.latitude,
            longitude: src.longitude,
            status: src
                .status
                .map(|s| s.parse::<DustbinStatus>())
                .transpose()
                .map_err(anyhow::Error::msg)?,
            marker_type: src.marker_type,
            name: src.name,
            description: src.description,
            created_at: src.created_at,
            updated_at: src.updated_at,
        })
    }
}

/// Markers stored in the `markers` table.
#[derive(Debug, Clone)]
pub struct PostgresMarkers {
    pool: PgPool,
}

impl PostgresMarkers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Repository for PostgresMarkers {
    type CreateRequest = MarkerCreateDBRequest;
    type UpdateRequest = MarkerUpdateDBRequest;
    type Response = MarkerDBResponse;
    type Id = MarkerId;
    type Filter = MarkerFilter;

    #[instrument(skip(self, request), fields(kind = %request.kind), err)]
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // created_at and updated_at use database DEFAULT NOW() for consistency
        let marker = sqlx::query_as::<_, Marker>(
            r#"
            INSERT INTO markers (kind, latitude, longitude, status, marker_type, name, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.kind.as_str())
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.status.map(|s| s.as_str()))
        .bind(request.marker_type.as_deref())
        .bind(request.name.as_deref())
        .bind(request.description.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(marker.try_into()?)
    }

    #[instrument(skip(self), fields(marker_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>> {
        let marker = sqlx::query_as::<_, Marker>("SELECT * FROM markers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match marker {
            Some(m) => Ok(Some(m.try_into()?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, filter), fields(kind = ?filter.kind, limit = filter.limit, skip = filter.skip), err)]
    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let markers = sqlx::query_as::<_, Marker>(
            r#"
            SELECT * FROM markers
            WHERE ($1::text IS NULL OR kind = $1)
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.kind.map(|k| k.as_str()))
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&self.pool)
        .await?;

        markers.into_iter().map(|m| Ok(m.try_into()?)).collect()
    }

    #[instrument(skip(self), fields(marker_id = %abbrev_uuid(&id)), err)]
    async fn delete(&self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM markers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(marker_id = %abbrev_uuid(&id)), err)]
    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let marker = sqlx::query_as::<_, Marker>(
            r#"
            UPDATE markers SET
                latitude = COALESCE($2, latitude),
                longitude = COALESCE($3, longitude),
                status = COALESCE($4, status),
                marker_type = COALESCE($5, marker_type),
                name = COALESCE($6, name),
                description = COALESCE($7, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.latitude)
        .bind(request.longitude)
        .bind(request.status.map(|s| s.as_str()))
        .bind(request.marker_type.as_deref())
        .bind(request.name.as_deref())
        .bind(request.description.as_deref())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(marker.try_into()?)
    }
}

/// Process-local marker store. Contents are lost on restart.
///
/// Enforces the same constraints as the `markers` table so both stores fail the same way.
#[derive(Debug, Default)]
pub struct InMemoryMarkers {
    markers: DashMap<MarkerId, (u64, MarkerDBResponse)>,
    sequence: AtomicU64,
}

impl InMemoryMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(marker: &MarkerDBResponse) -> Result<()> {
        let violation = |constraint: &str, message: String| DbError::CheckViolation {
            constraint: Some(constraint.to_string()),
            table: Some("markers".to_string()),
            message,
        };

        if !(-90.0..=90.0).contains(&marker.latitude) {
            return Err(violation("markers_latitude_check", format!("latitude {} out of range", marker.latitude)));
        }
        if !(-180.0..=180.0).contains(&marker.longitude) {
            return Err(violation(
                "markers_longitude_check",
                format!("longitude {} out of range", marker.longitude),
            ));
        }
        if marker.status.is_some() && marker.kind != MarkerKind::Dustbin {
            return Err(violation(
                "markers_status_only_on_dustbins",
                format!("status is not allowed on {} markers", marker.kind),
            ));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Repository for InMemoryMarkers {
    type CreateRequest = MarkerCreateDBRequest;
    type UpdateRequest = MarkerUpdateDBRequest;
    type Response = MarkerDBResponse;
    type Id = MarkerId;
    type Filter = MarkerFilter;

    #[instrument(skip(self, request), fields(kind = %request.kind), err)]
    async fn create(&self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let now = Utc::now();
        let marker = MarkerDBResponse {
            id: Uuid::new_v4(),
            kind: request.kind,
            latitude: request.latitude,
            longitude: request.longitude,
            status: request.status,
            marker_type: request.marker_type.clone(),
            name: request.name.clone(),
            description: request.description.clone(),
            created_at: now,
            updated_at: now,
        };
        Self::check(&marker)?;

        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.markers.insert(marker.id, (seq, marker.clone()));
        Ok(marker)
    }

    #[instrument(skip(self), fields(marker_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&self, id: Self::Id) -> Result<Option<Self::Response>> {
        Ok(self.markers.get(&id).map(|entry| entry.value().1.clone()))
    }

    #[instrument(skip(self, filter), fields(kind = ?filter.kind, limit = filter.limit, skip = filter.skip), err)]
    async fn list(&self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut matching: Vec<(u64, MarkerDBResponse)> = self
            .markers
            .iter()
            .filter(|entry| filter.kind.is_none_or(|kind| entry.value().1.kind == kind))
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by_key(|(seq, _)| *seq);

        Ok(matching
            .into_iter()
            .skip(filter.skip.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .map(|(_, marker)| marker)
            .collect())
    }

    #[instrument(skip(self), fields(marker_id = %abbrev_uuid(&id)), err)]
    async fn delete(&self, id: Self::Id) -> Result<bool> {
        Ok(self.markers.remove(&id).is_some())
    }

    #[instrument(skip(self, request), fields(marker_id = %abbrev_uuid(&id)), err)]
    async fn update(&self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let mut entry = self.markers.get_mut(&id).ok_or(DbError::NotFound)?;
        let current = &entry.value().1;

        let updated = MarkerDBResponse {
            latitude: request.latitude.unwrap_or(current.latitude),
            longitude: request.longitude.unwrap_or(current.longitude),
            status: request.status.or(current.status),
            marker_type: request.marker_type.clone().or_else(|| current.marker_type.clone()),
            name: request.name.clone().or_else(|| current.name.clone()),
            description: request.description.clone().or_else(|| current.description.clone()),
            updated_at: Utc::now(),
            ..current.clone()
        };
        Self::check(&updated)?;

        entry.value_mut().1 = updated.clone();
        Ok(updated)
    }
}
