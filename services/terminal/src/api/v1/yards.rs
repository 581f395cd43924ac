//! Yard API endpoints.
//!
//! Yards are the 3D grids containers are stacked in. Besides CRUD this
//! module serves the free-slot search used by the gate and planners.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use quayside_id::{CompanyId, ContainerId, LocationId, YardId};
use quayside_yard::{
    ColumnSpan, ContainerFootprint, ContainerType, OccupiedSlot, Slot, YardDimensions, YardError,
    YardGrid,
};
use serde::{Deserialize, Serialize};

use super::{parse_id, placement_error};
use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::db::{NewYard, YardLocationRow, YardRecord};
use crate::placement::{SlotQuery, YardAvailability};
use crate::state::AppState;

/// Largest accepted row and column count.
const MAX_GROUND_DIMENSION: u32 = 500;
/// Largest accepted stacking height.
const MAX_STACK_HEIGHT: u32 = 20;
const MAX_NAME_LEN: usize = 50;
const DEFAULT_MAX_TIERS: u32 = 10;
const DEFAULT_PAGE_SIZE: i64 = 100;

/// Yard routes.
///
/// /v1/yards
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_yards).post(create_yard))
        .route("/available-places", get(list_available_places))
        .route(
            "/{yard_id}",
            get(get_yard).put(update_yard).delete(delete_yard),
        )
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Body of `POST /v1/yards` and `PUT /v1/yards/{yard_id}`.
#[derive(Debug, Deserialize)]
pub struct YardRequest {
    pub name: String,
    pub max_rows: u32,
    pub max_columns: u32,
    #[serde(default)]
    pub max_tiers: Option<u32>,
    #[serde(default)]
    pub x_coordinate: Option<f64>,
    #[serde(default)]
    pub z_coordinate: Option<f64>,
    #[serde(default)]
    pub rotation_degree: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ListYardsQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailablePlacesQuery {
    pub container_type: String,
    pub yard_id: Option<String>,
    pub customer_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct YardResponse {
    pub id: YardId,
    pub name: String,
    pub max_rows: u32,
    pub max_columns: u32,
    pub max_tiers: u32,
    pub total_capacity: u64,
    pub x_coordinate: Option<f64>,
    pub z_coordinate: Option<f64>,
    pub rotation_degree: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<YardRecord> for YardResponse {
    fn from(yard: YardRecord) -> Self {
        let total_capacity =
            u64::from(yard.max_rows) * u64::from(yard.max_columns) * u64::from(yard.max_tiers);
        Self {
            id: yard.yard_id,
            name: yard.name,
            max_rows: yard.max_rows,
            max_columns: yard.max_columns,
            max_tiers: yard.max_tiers,
            total_capacity,
            x_coordinate: yard.x_coordinate,
            z_coordinate: yard.z_coordinate,
            rotation_degree: yard.rotation_degree,
            created_at: yard.created_at,
            updated_at: yard.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct YardLocationResponse {
    pub location_id: LocationId,
    pub container_id: ContainerId,
    pub container_name: String,
    pub container_type: ContainerType,
    pub company_id: Option<CompanyId>,
    pub row: u32,
    pub column_start: u32,
    pub column_end: u32,
    pub tier: u32,
}

impl From<YardLocationRow> for YardLocationResponse {
    fn from(row: YardLocationRow) -> Self {
        Self {
            location_id: row.location_id,
            container_id: row.container_id,
            container_name: row.container_name,
            container_type: row.container_type,
            company_id: row.company_id,
            row: row.row,
            column_start: row.column_start,
            column_end: row.column_end,
            tier: row.tier,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct YardDetailResponse {
    #[serde(flatten)]
    pub yard: YardResponse,
    pub occupied_cells: u64,
    pub free_cells: u64,
    pub locations: Vec<YardLocationResponse>,
}

#[derive(Debug, Serialize)]
pub struct ListYardsResponse {
    pub items: Vec<YardResponse>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvailablePlacesResponse {
    pub container_type: ContainerType,
    pub footprint: ContainerFootprint,
    pub items: Vec<YardAvailability>,
}

// =============================================================================
// Validation
// =============================================================================

/// Check a yard body and turn it into store input.
fn validate_yard_request(req: YardRequest) -> Result<NewYard, ApiError> {
    let name = req.name.trim();
    let name_len = name.chars().count();
    if name_len == 0 {
        return Err(ApiError::bad_request("invalid_name", "name cannot be empty"));
    }
    if name_len > MAX_NAME_LEN {
        return Err(ApiError::bad_request(
            "invalid_name",
            format!("name cannot exceed {MAX_NAME_LEN} characters"),
        ));
    }

    let max_tiers = req.max_tiers.unwrap_or(DEFAULT_MAX_TIERS);
    for (field, value, limit) in [
        ("max_rows", req.max_rows, MAX_GROUND_DIMENSION),
        ("max_columns", req.max_columns, MAX_GROUND_DIMENSION),
        ("max_tiers", max_tiers, MAX_STACK_HEIGHT),
    ] {
        if value > limit {
            return Err(ApiError::bad_request(
                "invalid_dimensions",
                format!("{field} cannot exceed {limit}"),
            ));
        }
    }

    let dimensions = YardDimensions::new(req.max_rows, req.max_columns, max_tiers)
        .map_err(|e| ApiError::bad_request("invalid_dimensions", e.to_string()))?;

    let rotation_degree = req.rotation_degree.unwrap_or(0.0);
    if !rotation_degree.is_finite() {
        return Err(ApiError::bad_request(
            "invalid_rotation",
            "rotation_degree must be a finite number",
        ));
    }

    Ok(NewYard {
        name: name.to_string(),
        dimensions,
        x_coordinate: req.x_coordinate,
        z_coordinate: req.z_coordinate,
        rotation_degree,
    })
}

fn occupied_slot(row: &YardLocationRow) -> Option<OccupiedSlot> {
    let columns = ColumnSpan::new(row.column_start, row.column_end)?;
    Some(OccupiedSlot::new(
        Slot::new(row.row, columns, row.tier),
        row.container_type.footprint(),
    ))
}

// =============================================================================
// Handlers
// =============================================================================

/// Create a yard.
///
/// POST /v1/yards
async fn create_yard(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<YardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();

    let new_yard =
        validate_yard_request(req).map_err(|e| e.with_request_id(request_id.clone()))?;

    let yard = state
        .db()
        .yard_store()
        .create(&new_yard)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                return ApiError::conflict(
                    "yard_name_taken",
                    format!("yard name already in use: {}", new_yard.name),
                )
                .with_request_id(request_id.clone());
            }
            tracing::error!(error = %e, request_id = %request_id, "Failed to create yard");
            ApiError::internal("internal_error", "Failed to create yard")
                .with_request_id(request_id.clone())
        })?;

    tracing::info!(
        yard_id = %yard.yard_id,
        name = %yard.name,
        max_rows = yard.max_rows,
        max_columns = yard.max_columns,
        max_tiers = yard.max_tiers,
        request_id = %request_id,
        "Yard created"
    );

    Ok((StatusCode::CREATED, Json(YardResponse::from(yard))))
}

/// List yards, ordered by id.
///
/// GET /v1/yards
async fn list_yards(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<ListYardsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, DEFAULT_PAGE_SIZE);
    let cursor: Option<YardId> = query
        .cursor
        .as_deref()
        .map(|c| parse_id(c, "invalid_cursor", "cursor", &request_id))
        .transpose()?;

    let yards = state
        .db()
        .yard_store()
        .list(limit, cursor.as_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, request_id = %request_id, "Failed to list yards");
            ApiError::internal("internal_error", "Failed to list yards")
                .with_request_id(request_id.clone())
        })?;

    let items: Vec<YardResponse> = yards.into_iter().map(YardResponse::from).collect();
    let next_cursor = items
        .last()
        .filter(|_| items.len() as i64 == limit)
        .map(|y| y.id.to_string());

    Ok(Json(ListYardsResponse { items, next_cursor }))
}

/// Get a yard with the containers in it.
///
/// GET /v1/yards/{yard_id}
async fn get_yard(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(yard_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();
    let yard_id: YardId = parse_id(&yard_id, "invalid_yard_id", "yard ID", &request_id)?;

    let yard = state
        .db()
        .yard_store()
        .get(&yard_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, request_id = %request_id, yard_id = %yard_id, "Failed to load yard");
            ApiError::internal("internal_error", "Failed to load yard")
                .with_request_id(request_id.clone())
        })?;

    let Some(yard) = yard else {
        return Err(ApiError::not_found("yard_not_found", "Yard not found").with_request_id(request_id));
    };

    let rows = state
        .db()
        .location_store()
        .in_yard(&yard_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, request_id = %request_id, yard_id = %yard_id, "Failed to load yard locations");
            ApiError::internal("internal_error", "Failed to load yard")
                .with_request_id(request_id.clone())
        })?;

    let dimensions = yard.dimensions().map_err(|e| {
        tracing::error!(error = %e, request_id = %request_id, yard_id = %yard_id, "Stored yard has invalid dimensions");
        ApiError::internal("internal_error", "Failed to load yard").with_request_id(request_id.clone())
    })?;
    let grid = YardGrid::new(dimensions, rows.iter().filter_map(occupied_slot));

    Ok(Json(YardDetailResponse {
        occupied_cells: grid.occupied_cells(),
        free_cells: grid.free_cells(),
        yard: YardResponse::from(yard),
        locations: rows.into_iter().map(YardLocationResponse::from).collect(),
    }))
}

/// Replace a yard's name, dimensions and display coordinates.
///
/// PUT /v1/yards/{yard_id}
async fn update_yard(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(yard_id): Path<String>,
    Json(req): Json<YardRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();
    let yard_id: YardId = parse_id(&yard_id, "invalid_yard_id", "yard ID", &request_id)?;

    let update = validate_yard_request(req).map_err(|e| e.with_request_id(request_id.clone()))?;

    let yard = state
        .placement()
        .update_yard(&yard_id, &update)
        .await
        .map_err(|e| placement_error(e, &request_id, "update yard"))?;

    Ok(Json(YardResponse::from(yard)))
}

/// Delete a yard. Containers in it are kept but are no longer in any yard.
///
/// DELETE /v1/yards/{yard_id}
async fn delete_yard(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(yard_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();
    let yard_id: YardId = parse_id(&yard_id, "invalid_yard_id", "yard ID", &request_id)?;

    let deleted = state
        .db()
        .yard_store()
        .delete(&yard_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, request_id = %request_id, yard_id = %yard_id, "Failed to delete yard");
            ApiError::internal("internal_error", "Failed to delete yard")
                .with_request_id(request_id.clone())
        })?;

    if !deleted {
        return Err(ApiError::not_found("yard_not_found", "Yard not found").with_request_id(request_id));
    }

    tracing::info!(yard_id = %yard_id, request_id = %request_id, "Yard deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Free places per yard for a container type.
///
/// GET /v1/yards/available-places?container_type=40&yard_id=&customer_id=
async fn list_available_places(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<AvailablePlacesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();

    let container_type: ContainerType =
        query.container_type.parse().map_err(|e: YardError| {
            ApiError::bad_request("invalid_container_type", e.to_string())
                .with_request_id(request_id.clone())
        })?;
    let yard_id: Option<YardId> = query
        .yard_id
        .as_deref()
        .map(|id| parse_id(id, "invalid_yard_id", "yard ID", &request_id))
        .transpose()?;
    let customer_id: Option<CompanyId> = query
        .customer_id
        .as_deref()
        .map(|id| parse_id(id, "invalid_customer_id", "customer ID", &request_id))
        .transpose()?;

    let items = state
        .placement()
        .list_available_slots(&SlotQuery {
            container_type,
            yard_id,
            customer_id,
        })
        .await
        .map_err(|e| placement_error(e, &request_id, "list available places"))?;

    Ok(Json(AvailablePlacesResponse {
        container_type,
        footprint: container_type.footprint(),
        items,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn request(name: &str, rows: u32, columns: u32, tiers: Option<u32>) -> YardRequest {
        YardRequest {
            name: name.to_string(),
            max_rows: rows,
            max_columns: columns,
            max_tiers: tiers,
            x_coordinate: None,
            z_coordinate: None,
            rotation_degree: None,
        }
    }

    #[test]
    fn test_yard_request_defaults() {
        let req: YardRequest =
            serde_json::from_str(r#"{"name": "North", "max_rows": 5, "max_columns": 4}"#).unwrap();
        let yard = validate_yard_request(req).unwrap();
        assert_eq!(yard.dimensions.max_tiers(), DEFAULT_MAX_TIERS);
        assert_eq!(yard.rotation_degree, 0.0);
    }

    #[test]
    fn test_largest_yard_is_accepted() {
        let req = request("Big", MAX_GROUND_DIMENSION, MAX_GROUND_DIMENSION, Some(MAX_STACK_HEIGHT));
        let yard = validate_yard_request(req).unwrap();
        assert_eq!(yard.dimensions.max_rows(), MAX_GROUND_DIMENSION);
        assert_eq!(yard.dimensions.max_tiers(), MAX_STACK_HEIGHT);
    }

    #[test]
    fn test_yard_name_is_trimmed() {
        let yard = validate_yard_request(request("  Block A ", 5, 4, Some(3))).unwrap();
        assert_eq!(yard.name, "Block A");
    }

    #[rstest]
    #[case(request("", 5, 4, Some(3)), "invalid_name")]
    #[case(request("   ", 5, 4, Some(3)), "invalid_name")]
    #[case(request(&"y".repeat(51), 5, 4, Some(3)), "invalid_name")]
    #[case(request("A", 0, 4, Some(3)), "invalid_dimensions")]
    #[case(request("A", 5, 4, Some(0)), "invalid_dimensions")]
    #[case(request("A", 5, MAX_GROUND_DIMENSION + 1, Some(3)), "invalid_dimensions")]
    #[case(request("A", MAX_GROUND_DIMENSION + 1, 4, Some(3)), "invalid_dimensions")]
    #[case(request("A", 5, 4, Some(MAX_STACK_HEIGHT + 1)), "invalid_dimensions")]
    fn test_invalid_yard_requests(#[case] req: YardRequest, #[case] code: &str) {
        let err = validate_yard_request(req).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.problem.code, code);
    }

    #[test]
    fn test_yard_response_capacity() {
        let now = Utc::now();
        let response = YardResponse::from(YardRecord {
            yard_id: YardId::new(),
            name: "North".to_string(),
            max_rows: 5,
            max_columns: 4,
            max_tiers: 3,
            x_coordinate: None,
            z_coordinate: None,
            rotation_degree: 0.0,
            created_at: now,
            updated_at: now,
        });
        assert_eq!(response.total_capacity, 60);
    }

    #[test]
    fn test_available_places_response_shape() {
        let yard_id = YardId::new();
        let response = AvailablePlacesResponse {
            container_type: ContainerType::Forty,
            footprint: ContainerFootprint::DoubleColumn,
            items: vec![YardAvailability {
                yard_id,
                yard_name: "North".to_string(),
                max_rows: 5,
                max_columns: 4,
                max_tiers: 3,
                available_places: vec![quayside_yard::AvailablePlace {
                    row: 2,
                    column_start: 1,
                    tier: 2,
                }],
            }],
        };

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["container_type"], "40");
        assert_eq!(body["footprint"], "double_column");
        assert_eq!(body["items"][0]["yard_id"], yard_id.to_string());
        assert_eq!(body["items"][0]["available_places"][0]["column_start"], 1);
    }
}
