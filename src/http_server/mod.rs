//! HTTP surface.
//!
//! The query endpoint used by hosts and external callers:
//! `POST /api/query/execute`.

mod config;
mod errors;
mod query_routes;
mod server;

pub use config::HttpServerConfig;
pub use errors::ApiError;
pub use query_routes::{query_routes, ExecuteQueryRequest, ExecuteQueryResponse};
pub use server::HttpServer;
