//! HTTP API for the grocery daemon.
//!
//! Provides:
//! - `GET /graphql` - GraphiQL for browsers, otherwise a query from the query string
//! - `POST /graphql` - query via JSON or `application/graphql` body
//! - `GET /health` - health check
//!
//! All responses allow any origin. Mutations are only accepted over POST.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{
        header::{ACCEPT, ALLOW, CONTENT_TYPE, ORIGIN},
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
    },
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use async_graphql::http::{parse_query_string, receive_body, GraphiQLSource, MultipartOptions};
use async_graphql::parser::{parse_query, types::OperationType};
use async_graphql::{PathSegment, Request, ServerError};

use crate::schema::GrocerySchema;

/// Path the GraphQL endpoint and GraphiQL page are served at.
pub const GRAPHQL_PATH: &str = "/graphql";

const MISSING_QUERY: &str = "Must provide query string.";
const MUTATION_OVER_GET: &str = "Can only perform a mutation operation from a POST request.";

// =============================================================================
// API State
// =============================================================================

/// Shared state for API handlers.
pub struct ApiState {
    pub schema: GrocerySchema,
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Response envelope: `{ data, errors? }`.
#[derive(Debug, Serialize)]
pub struct GraphQlResponse {
    pub data: serde_json::Value,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FormattedError>,
}

/// One entry of the `errors` array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormattedError {
    pub message: String,
    pub locations: Vec<ErrorLocation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<serde_json::Value>,
    /// Debug trace of the error
    pub stack: String,
}

/// Position of an error in the query document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    pub line: usize,
    pub column: usize,
}

impl From<&ServerError> for FormattedError {
    fn from(error: &ServerError) -> Self {
        let locations: Vec<ErrorLocation> = error
            .locations
            .iter()
            .map(|pos| ErrorLocation {
                line: pos.line,
                column: pos.column,
            })
            .collect();

        let path: Vec<serde_json::Value> = error
            .path
            .iter()
            .map(|segment| match segment {
                PathSegment::Field(name) => serde_json::Value::from(name.as_str()),
                PathSegment::Index(index) => serde_json::Value::from(*index),
            })
            .collect();

        let mut stack = format!("GraphQLError: {}", error.message);
        for location in &locations {
            stack.push_str(&format!("\n    at line {}, column {}", location.line, location.column));
        }
        if !path.is_empty() {
            let joined: Vec<String> = path
                .iter()
                .map(|segment| match segment {
                    serde_json::Value::String(name) => name.clone(),
                    other => other.to_string(),
                })
                .collect();
            stack.push_str(&format!("\n    at path {}", joined.join(".")));
        }

        Self {
            message: error.message.clone(),
            locations,
            path,
            stack,
        }
    }
}

impl FormattedError {
    /// Error for a request that never reached the executor.
    pub fn request(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            stack: format!("BadRequestError: {}", message),
            message,
            locations: Vec::new(),
            path: Vec::new(),
        }
    }
}

// =============================================================================
// Router
// =============================================================================

/// Create the API router.
pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(GRAPHQL_PATH, get(graphql_get_handler).post(graphql_post_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            ORIGIN,
            HeaderName::from_static("x-requested-with"),
            CONTENT_TYPE,
            ACCEPT,
        ])
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Serve GraphiQL to browsers, otherwise execute the query-string request.
async fn graphql_get_handler(
    State(state): State<Arc<ApiState>>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    if accepts_html(&headers) {
        return Html(GraphiQLSource::build().endpoint(GRAPHQL_PATH).finish()).into_response();
    }

    let request = match parse_query_string(raw_query.as_deref().unwrap_or_default()) {
        Ok(request) => request,
        Err(e) => return bad_request(e.to_string()),
    };
    if request.query.is_empty() {
        return bad_request(MISSING_QUERY);
    }
    if selects_mutation(&request) {
        let mut response = error_response(
            StatusCode::METHOD_NOT_ALLOWED,
            FormattedError::request(MUTATION_OVER_GET),
        );
        response.headers_mut().insert(ALLOW, HeaderValue::from_static("POST"));
        return response;
    }

    execute(&state.schema, request).await
}

/// Execute a query from the request body, falling back to the query string.
async fn graphql_post_handler(
    State(state): State<Arc<ApiState>>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok());

    let mut request = if body.is_empty() {
        Request::new("")
    } else if content_type.is_some_and(is_graphql_document) {
        match std::str::from_utf8(&body) {
            Ok(query) => Request::new(query),
            Err(_) => return bad_request("Body is not valid UTF-8"),
        }
    } else {
        match receive_body(content_type, &body[..], MultipartOptions::default()).await {
            Ok(request) => request,
            Err(e) => return bad_request(format!("POST body sent invalid JSON: {}", e)),
        }
    };

    if request.query.is_empty() {
        let fallback = raw_query.as_deref().and_then(|raw| parse_query_string(raw).ok());
        if let Some(fallback) = fallback {
            request.query = fallback.query;
            request.operation_name = request.operation_name.or(fallback.operation_name);
        }
    }
    if request.query.is_empty() {
        return bad_request(MISSING_QUERY);
    }

    execute(&state.schema, request).await
}

// =============================================================================
// Helpers
// =============================================================================

async fn execute(schema: &GrocerySchema, request: Request) -> Response {
    let response = schema.execute(request).await;

    // Parse and validation errors carry no path and leave no data.
    let rejected = response.data == async_graphql::Value::Null
        && !response.errors.is_empty()
        && response.errors.iter().all(|e| e.path.is_empty());
    let status = if rejected {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };

    for error in &response.errors {
        warn!(message = %error.message, "GraphQL error");
    }

    let errors = response.errors.iter().map(FormattedError::from).collect();
    let data = match response.data.into_json() {
        Ok(data) => data,
        Err(e) => {
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                FormattedError::request(e.to_string()),
            )
        },
    };

    json_response(status, &GraphQlResponse { data, errors })
}

/// Browsers asking for a page get GraphiQL instead of a JSON result.
fn accepts_html(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// `application/graphql`, but not the `application/graphql-response+json` JSON type.
fn is_graphql_document(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/graphql"))
}

/// Whether the operation the request would run is a mutation.
///
/// Unparseable or ambiguous documents are left to the executor to reject.
fn selects_mutation(request: &Request) -> bool {
    let Ok(document) = parse_query(&request.query) else {
        return false;
    };
    let wanted = request.operation_name.as_deref();
    let mut candidates = document
        .operations
        .iter()
        .filter(|(name, _)| wanted.is_none() || name.map(|n| n.as_str()) == wanted);

    match (candidates.next(), candidates.next()) {
        (Some((_, operation)), None) => operation.node.ty == OperationType::Mutation,
        _ => false,
    }
}

fn bad_request(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, FormattedError::request(message))
}

fn error_response(status: StatusCode, error: FormattedError) -> Response {
    json_response(
        status,
        &GraphQlResponse {
            data: serde_json::Value::Null,
            errors: vec![error],
        },
    )
}

/// Pretty-printed JSON response.
fn json_response(status: StatusCode, body: &GraphQlResponse) -> Response {
    match serde_json::to_string_pretty(body) {
        Ok(text) => (
            status,
            [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            text,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// =============================================================================
// Tests
// =============================================================================
