//! Container API endpoints.
//!
//! Registration and lookup of containers, and the location write path that
//! places, relocates and removes them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use quayside_id::{CompanyId, ContainerId, LocationId, YardId};
use quayside_yard::{ContainerFootprint, ContainerType, YardError};
use serde::{Deserialize, Serialize};

use super::{parse_id, placement_error};
use crate::api::error::ApiError;
use crate::api::request_context::RequestContext;
use crate::db::{ContainerRecord, LocationRecord, NewContainer};
use crate::placement::PlacementRequest;
use crate::state::AppState;

const MAX_NAME_LEN: usize = 12;

/// Container routes.
///
/// /v1/containers
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_container))
        .route("/{container_id}", get(get_container).delete(delete_container))
        .route(
            "/{container_id}/location",
            put(place_container).delete(remove_container),
        )
}

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateContainerRequest {
    pub name: String,
    pub container_type: String,
    #[serde(default)]
    pub company_id: Option<String>,
}

/// Body of `PUT /v1/containers/{container_id}/location`.
///
/// Omitting `yard_id` records the container as not in any yard. Coordinates
/// sent without a yard are ignored and the stored location has none.
#[derive(Debug, Default, Deserialize)]
pub struct PlaceContainerRequest {
    #[serde(default)]
    pub yard_id: Option<String>,
    #[serde(default)]
    pub row: Option<u32>,
    #[serde(default)]
    pub column_start: Option<u32>,
    #[serde(default)]
    pub column_end: Option<u32>,
    #[serde(default)]
    pub tier: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub id: LocationId,
    pub in_yard: bool,
    pub yard_id: Option<YardId>,
    pub row: Option<u32>,
    pub column_start: Option<u32>,
    pub column_end: Option<u32>,
    pub tier: Option<u32>,
    pub updated_at: DateTime<Utc>,
}

impl From<LocationRecord> for LocationResponse {
    fn from(location: LocationRecord) -> Self {
        Self {
            id: location.location_id,
            in_yard: location.yard_id.is_some(),
            yard_id: location.yard_id,
            row: location.row,
            column_start: location.column_start,
            column_end: location.column_end,
            tier: location.tier,
            updated_at: location.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContainerResponse {
    pub id: ContainerId,
    pub name: String,
    pub container_type: ContainerType,
    pub footprint: ContainerFootprint,
    pub teu: u32,
    pub company_id: Option<CompanyId>,
    pub location: Option<LocationResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContainerResponse {
    fn new(container: ContainerRecord, location: Option<LocationRecord>) -> Self {
        Self {
            id: container.container_id,
            name: container.name,
            container_type: container.container_type,
            footprint: container.container_type.footprint(),
            teu: container.container_type.teu(),
            company_id: container.company_id,
            location: location.map(LocationResponse::from),
            created_at: container.created_at,
            updated_at: container.updated_at,
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Check a registration body. Names are stored upper-cased.
fn validate_container_request(req: CreateContainerRequest) -> Result<NewContainer, ApiError> {
    let name = req.name.trim().to_uppercase();
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

    let container_type: ContainerType = req
        .container_type
        .parse()
        .map_err(|e: YardError| ApiError::bad_request("invalid_container_type", e.to_string()))?;

    let company_id: Option<CompanyId> = req
        .company_id
        .as_deref()
        .map(|id| {
            id.parse()
                .map_err(|_| ApiError::bad_request("invalid_company_id", "Invalid company ID format"))
        })
        .transpose()?;

    Ok(NewContainer {
        name,
        container_type,
        company_id,
    })
}

fn placement_request(
    req: PlaceContainerRequest,
    request_id: &str,
) -> Result<PlacementRequest, ApiError> {
    let yard_id: Option<YardId> = req
        .yard_id
        .as_deref()
        .map(|id| parse_id(id, "invalid_yard_id", "yard ID", request_id))
        .transpose()?;

    Ok(PlacementRequest {
        yard_id,
        row: req.row,
        column_start: req.column_start,
        column_end: req.column_end,
        tier: req.tier,
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a container.
///
/// POST /v1/containers
async fn create_container(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<CreateContainerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();

    let new_container =
        validate_container_request(req).map_err(|e| e.with_request_id(request_id.clone()))?;

    let container = state
        .db()
        .container_store()
        .create(&new_container)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                return ApiError::conflict(
                    "container_name_taken",
                    format!("container name already in use: {}", new_container.name),
                )
                .with_request_id(request_id.clone());
            }
            tracing::error!(error = %e, request_id = %request_id, "Failed to create container");
            ApiError::internal("internal_error", "Failed to create container")
                .with_request_id(request_id.clone())
        })?;

    tracing::info!(
        container_id = %container.container_id,
        name = %container.name,
        container_type = %container.container_type,
        request_id = %request_id,
        "Container registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(ContainerResponse::new(container, None)),
    ))
}

/// Get a container and its current location.
///
/// GET /v1/containers/{container_id}
async fn get_container(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(container_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();
    let container_id: ContainerId =
        parse_id(&container_id, "invalid_container_id", "container ID", &request_id)?;

    let load_failed = |e: crate::db::DbError| {
        tracing::error!(error = %e, request_id = %request_id, container_id = %container_id, "Failed to load container");
        ApiError::internal("internal_error", "Failed to load container")
            .with_request_id(request_id.clone())
    };

    let container = state
        .db()
        .container_store()
        .get(&container_id)
        .await
        .map_err(load_failed)?;

    let Some(container) = container else {
        return Err(ApiError::not_found("container_not_found", "Container not found")
            .with_request_id(request_id.clone()));
    };

    let location = state
        .db()
        .location_store()
        .for_container(&container_id)
        .await
        .map_err(load_failed)?;

    Ok(Json(ContainerResponse::new(container, location)))
}

/// Delete a container together with its location.
///
/// DELETE /v1/containers/{container_id}
async fn delete_container(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(container_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();
    let container_id: ContainerId =
        parse_id(&container_id, "invalid_container_id", "container ID", &request_id)?;

    let deleted = state
        .db()
        .container_store()
        .delete(&container_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, request_id = %request_id, container_id = %container_id, "Failed to delete container");
            ApiError::internal("internal_error", "Failed to delete container")
                .with_request_id(request_id.clone())
        })?;

    if !deleted {
        return Err(ApiError::not_found("container_not_found", "Container not found")
            .with_request_id(request_id));
    }

    tracing::info!(container_id = %container_id, request_id = %request_id, "Container deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Place, relocate or take a container out of the yard.
///
/// PUT /v1/containers/{container_id}/location
async fn place_container(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(container_id): Path<String>,
    Json(req): Json<PlaceContainerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();
    let container_id: ContainerId =
        parse_id(&container_id, "invalid_container_id", "container ID", &request_id)?;

    let request = placement_request(req, &request_id)?;

    let location = state
        .placement()
        .place_container(&container_id, &request)
        .await
        .map_err(|e| placement_error(e, &request_id, "place container"))?;

    Ok(Json(LocationResponse::from(location)))
}

/// Remove a container's location.
///
/// DELETE /v1/containers/{container_id}/location
async fn remove_container(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(container_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let request_id = ctx.request_id.clone();
    let container_id: ContainerId =
        parse_id(&container_id, "invalid_container_id", "container ID", &request_id)?;

    state
        .placement()
        .remove_container(&container_id)
        .await
        .map_err(|e| placement_error(e, &request_id, "remove container"))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn create(name: &str, container_type: &str) -> CreateContainerRequest {
        CreateContainerRequest {
            name: name.to_string(),
            container_type: container_type.to_string(),
            company_id: None,
        }
    }

    #[test]
    fn test_container_name_is_upper_cased() {
        let container = validate_container_request(create(" msku1234565 ", "40hc")).unwrap();
        assert_eq!(container.name, "MSKU1234565");
        assert_eq!(container.container_type, ContainerType::FortyHighCube);
    }

    #[rstest]
    #[case(create("", "20"), "invalid_name")]
    #[case(create("ABCDEFGHIJKLM", "20"), "invalid_name")]
    #[case(create("ABCU1234567", "53"), "invalid_container_type")]
    fn test_invalid_container_requests(#[case] req: CreateContainerRequest, #[case] code: &str) {
        let err = validate_container_request(req).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.problem.code, code);
    }

    #[test]
    fn test_company_id_must_be_prefixed() {
        let mut req = create("ABCU1234567", "20");
        req.company_id = Some("yard_01HV4Z2WQXKJNM8GPQY6VBKC3D".to_string());
        let err = validate_container_request(req).unwrap_err();
        assert_eq!(err.problem.code, "invalid_company_id");
    }

    #[test]
    fn test_place_request_without_yard_is_not_in_yard() {
        let req: PlaceContainerRequest = serde_json::from_str(r#"{"row": 1}"#).unwrap();
        let request = placement_request(req, "req_test").unwrap();
        assert!(request.yard_id.is_none());
        assert_eq!(request.row, Some(1));
        assert_eq!(request.column_end, None);
    }

    #[test]
    fn test_place_request_rejects_bad_yard_id() {
        let req = PlaceContainerRequest {
            yard_id: Some("not-a-yard".to_string()),
            ..Default::default()
        };
        let err = placement_request(req, "req_test").unwrap_err();
        assert_eq!(err.problem.code, "invalid_yard_id");
        assert_eq!(err.problem.request_id, "req_test");
    }

    #[test]
    fn test_location_response_marks_not_in_yard() {
        let now = Utc::now();
        let response = LocationResponse::from(LocationRecord {
            location_id: LocationId::new(),
            container_id: ContainerId::new(),
            yard_id: None,
            row: None,
            column_start: None,
            column_end: None,
            tier: None,
            created_at: now,
            updated_at: now,
        });
        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["in_yard"], false);
        assert!(body["yard_id"].is_null());
    }
}
