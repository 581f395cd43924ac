//! HTTP API handlers and routing.

pub mod error;
mod health;
mod request_context;
mod v1;

use axum::{
    http::{header, HeaderName, HeaderValue, Method, Request},
    Router,
};
use quayside_id::RequestId;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{self, MakeRequestId, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Issues `req_<ulid>` ids for requests that arrive without one.
#[derive(Debug, Clone, Copy, Default)]
struct MakePrefixedRequestId;

impl MakeRequestId for MakePrefixedRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<request_id::RequestId> {
        HeaderValue::from_str(&RequestId::new().to_string())
            .ok()
            .map(request_id::RequestId::new)
    }
}

/// Create the main API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(request_context::REQUEST_ID_HEADER),
        ])
        .allow_origin(Any);

    Router::new()
        .merge(health::routes())
        .nest("/v1", v1::routes())
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakePrefixedRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_generated_request_ids_are_prefixed() {
        let request = Request::new(Body::empty());
        let id = MakePrefixedRequestId
            .make_request_id(&request)
            .expect("ulid ids are valid header values");
        let value = id.header_value().to_str().unwrap();
        assert!(value.parse::<RequestId>().is_ok());
    }
}
