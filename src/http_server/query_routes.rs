//! Query execution endpoint.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::control::ControlPlane;
use crate::executor::ShardResult;

use super::errors::ApiError;

/// Request body for `POST /api/query/execute`.
#[derive(Debug, Deserialize)]
pub struct ExecuteQueryRequest {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub sql: Option<String>,
}

/// Response body: one entry per target shard, in plan order.
#[derive(Debug, Serialize)]
pub struct ExecuteQueryResponse {
    pub results: Vec<ShardResult>,
}

/// Routes for the query endpoint.
pub fn query_routes(plane: Arc<ControlPlane>) -> Router {
    Router::new()
        .route("/query/execute", post(execute_query))
        .with_state(plane)
}

async fn execute_query(
    State(plane): State<Arc<ControlPlane>>,
    Json(request): Json<ExecuteQueryRequest>,
) -> Result<Json<ExecuteQueryResponse>, ApiError> {
    let project_id = match request.project_id.as_deref() {
        Some(raw) if !raw.is_empty() => {
            Uuid::parse_str(raw).map_err(|_| ApiError::InvalidField("project_id"))?
        }
        _ => return Err(ApiError::MissingField("project_id")),
    };

    let sql = match request.sql.as_deref() {
        Some(sql) if !sql.is_empty() => sql,
        _ => return Err(ApiError::MissingField("sql")),
    };

    let results = plane
        .execute_sql(project_id, sql)
        .await
        .map_err(|err| ApiError::Query(err.to_string()))?;

    Ok(Json(ExecuteQueryResponse { results }))
}
