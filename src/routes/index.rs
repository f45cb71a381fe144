/**
 * API Index
 * Lists the endpoint groups served by this backend
 */
use axum::{response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiIndex {
    pub name: String,
    pub version: String,
    pub endpoints: BTreeMap<String, String>,
}

/// GET /
pub async fn api_index() -> impl IntoResponse {
    let endpoints = [
        ("health", "/health"),
        ("users", "/api/users"),
        ("projects", "/api/projects"),
        ("blog", "/api/blog"),
        ("contact", "/api/contact"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    Json(ApiIndex {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{json, send};
    use axum::{http::StatusCode, routing::get, Router};

    #[tokio::test]
    async fn test_index_lists_endpoint_groups() {
        let app = Router::new().route("/", get(api_index));
        let (status, bytes) = send(app, "GET", "/", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&bytes);
        assert_eq!(body["endpoints"]["blog"], "/api/blog");
        assert_eq!(body["endpoints"]["contact"], "/api/contact");
    }
}
