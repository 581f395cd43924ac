//! API v1 routes.

mod containers;
mod yards;

use axum::Router;
use quayside_yard::PlacementError;

use crate::api::error::{ApiError, FieldError};
use crate::placement::PlacementServiceError;
use crate::state::AppState;

/// Create API v1 routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/yards", yards::routes())
        .nest("/containers", containers::routes())
}

/// Parse a prefixed id from a path or query parameter.
fn parse_id<T: std::str::FromStr>(
    raw: &str,
    code: &'static str,
    what: &str,
    request_id: &str,
) -> Result<T, ApiError> {
    raw.parse().map_err(|_| {
        ApiError::bad_request(code, format!("Invalid {what} format"))
            .with_request_id(request_id.to_string())
    })
}

/// The request field a placement failure is about.
fn placement_field(err: &PlacementError) -> &'static str {
    match err {
        PlacementError::NonPositiveCoordinate { field } => *field,
        PlacementError::RowOutOfBounds { .. } => "row",
        PlacementError::ColumnOutOfBounds { .. } => "column_start",
        PlacementError::TierOutOfBounds { .. } => "tier",
        PlacementError::InvertedColumns { .. } | PlacementError::SpanMismatch { .. } => {
            "column_end"
        }
        PlacementError::MissingCoordinates
        | PlacementError::Overlap { .. }
        | PlacementError::Unsupported { .. } => "location",
    }
}

/// Map a placement service failure to a problem response.
///
/// Database failures are logged here; everything else is the caller's fault
/// and is only returned.
fn placement_error(err: PlacementServiceError, request_id: &str, action: &str) -> ApiError {
    let api_error = match err {
        PlacementServiceError::InvalidPlacement(e) => {
            ApiError::unprocessable("invalid_placement", e.to_string()).with_details(vec![
                FieldError {
                    field: placement_field(&e).to_string(),
                    code: e.code().to_string(),
                    message: e.to_string(),
                },
            ])
        }
        PlacementServiceError::UnknownYard(_) => {
            ApiError::not_found("yard_not_found", "Yard not found")
        }
        PlacementServiceError::UnknownContainer(_) => {
            ApiError::not_found("container_not_found", "Container not found")
        }
        e @ PlacementServiceError::ResizeWouldStrand { .. } => {
            ApiError::conflict("yard_resize_conflict", e.to_string())
        }
        e @ PlacementServiceError::NameTaken(_) => {
            ApiError::conflict("yard_name_taken", e.to_string())
        }
        PlacementServiceError::Conflict => ApiError::conflict(
            "concurrent_update",
            "Another request changed the yard at the same time; retry",
        )
        .retryable(),
        e @ (PlacementServiceError::Database(_)
        | PlacementServiceError::InvalidYard(_)
        | PlacementServiceError::SearchTask(_)) => {
            tracing::error!(error = %e, request_id = %request_id, "Failed to {action}");
            ApiError::internal("internal_error", format!("Failed to {action}"))
        }
    };

    api_error.with_request_id(request_id.to_string())
}
