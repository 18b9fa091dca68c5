//! OpenAPI document assembly and the route serving it.

use axum::{Json, response::IntoResponse};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::federate::federate,
        crate::api::handlers::callback::callback,
    ),
    tags(
        (name = "federation", description = "Federated authentication ceremonies"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_federation_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<_> = doc.paths.paths.keys().cloned().collect();
        assert!(paths.contains(&"/federate".to_string()));
        assert!(paths.contains(&"/callback/{hostname}".to_string()));
        assert!(paths.contains(&"/health".to_string()));
    }
}
