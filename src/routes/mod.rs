//! HTTP route handlers and the registered operation table.

pub mod items;
pub mod users;

use axum::Json;
use serde_json::{Value, json};

/// Resolve the logical operation name for a registered route.
///
/// Metric labels must stay bounded, so only names from this table ever
/// reach the registry; anything else (unmatched paths, stray methods)
/// collapses into `"other"` instead of leaking raw request paths.
pub fn operation_name(method: &str, route: &str) -> &'static str {
    match (method, route) {
        ("GET", "/") => "root",
        ("GET", "/items") => "item_list",
        ("POST", "/items") => "item_create",
        ("GET", "/items/{id}") => "item_detail",
        ("PUT", "/items/{id}") => "item_update",
        ("DELETE", "/items/{id}") => "item_delete",
        ("GET", "/users") => "user_list",
        ("POST", "/users") => "user_create",
        ("GET", "/metrics") => "metrics",
        ("GET", "/health") | ("GET", "/health/ready") => "health",
        _ => "other",
    }
}

pub async fn root() -> Json<Value> {
    tracing::info!("Root endpoint accessed");
    Json(json!({ "Hello": "World" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registered_operations_resolve() {
        assert_eq!(operation_name("GET", "/"), "root");
        assert_eq!(operation_name("POST", "/items"), "item_create");
        assert_eq!(operation_name("GET", "/items/{id}"), "item_detail");
        assert_eq!(operation_name("PUT", "/items/{id}"), "item_update");
        assert_eq!(operation_name("DELETE", "/items/{id}"), "item_delete");
        assert_eq!(operation_name("GET", "/users"), "user_list");
        assert_eq!(operation_name("POST", "/users"), "user_create");
    }

    #[test]
    fn test_unregistered_routes_collapse_to_other() {
        assert_eq!(operation_name("GET", "/items/{id}/reviews"), "other");
        assert_eq!(operation_name("PATCH", "/items/{id}"), "other");
        assert_eq!(operation_name("GET", "/admin/secret-path-12345"), "other");
    }
}
