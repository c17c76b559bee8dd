//! REST endpoint paths and wire request/response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::types::Entity;

// ============================================================================
// Endpoint Paths
// ============================================================================

/// Authentication endpoint, relative to the server base URL.
pub const AUTH_PATH: &str = "/api/v1/App/user/auth";

/// Collection path for an entity type: `/api/v1/{entity}`.
pub fn entity_path(entity: &Entity) -> String {
    format!("/api/v1/{}", entity.as_str())
}

/// Instance path for a single record: `/api/v1/{entity}/{id}`.
pub fn record_path(entity: &Entity, id: &str) -> String {
    format!("/api/v1/{}/{}", entity.as_str(), id)
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for the auth endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest<'a> {
    pub user_name: &'a str,
    pub password: &'a str,
}

/// Response from the auth endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expire_at: Option<DateTime<Utc>>,
}

/// Query parameters for list endpoints.
///
/// All fields are optional; [`ListParams::default`] is the empty query.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    /// Attribute names to fetch; joined with commas on the wire.
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "join_select")]
    pub select: Option<Vec<String>>,
}

/// Sort direction for [`ListParams::order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    Desc,
}

/// Generic envelope returned by list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse<T> {
    /// Total number of matching records reported by the server, if known.
    ///
    /// The server may report a total larger than the page contents.
    #[serde(default)]
    pub total: Option<u64>,

    /// The records in this page.
    pub list: Vec<T>,
}

fn join_select<S>(select: &Option<Vec<String>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match select {
        Some(fields) => serializer.serialize_str(&fields.join(",")),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_request_uses_wire_field_names() {
        let body = serde_json::to_value(&AuthRequest {
            user_name: "u",
            password: "p",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"userName": "u", "password": "p"}));
    }

    #[test]
    fn auth_response_optionals_default_to_none() {
        let auth: AuthResponse = serde_json::from_str(r#"{"token": "t1"}"#).unwrap();
        assert_eq!(auth.token, "t1");
        assert!(auth.refresh_token.is_none());
        assert!(auth.expire_at.is_none());
    }

    #[test]
    fn auth_response_parses_iso8601_expiry() {
        let auth: AuthResponse =
            serde_json::from_str(r#"{"token": "t1", "expireAt": "2026-01-01T12:00:00Z"}"#).unwrap();
        assert_eq!(
            auth.expire_at,
            Some("2026-01-01T12:00:00Z".parse().unwrap())
        );
    }

    #[test]
    fn list_params_skips_absent_fields() {
        let params = serde_json::to_value(ListParams::default()).unwrap();
        assert_eq!(params, serde_json::json!({}));
    }

    #[test]
    fn list_params_serializes_camel_case_and_joined_select() {
        let params = serde_json::to_value(ListParams {
            offset: Some(10),
            max_size: Some(20),
            order_by: Some("name".to_string()),
            order: Some(Order::Desc),
            select: Some(vec!["name".to_string(), "industry".to_string()]),
        })
        .unwrap();
        assert_eq!(
            params,
            serde_json::json!({
                "offset": 10,
                "maxSize": 20,
                "orderBy": "name",
                "order": "desc",
                "select": "name,industry"
            })
        );
    }

    #[test]
    fn list_response_total_is_optional() {
        let response: ListResponse<serde_json::Value> =
            serde_json::from_str(r#"{"list": []}"#).unwrap();
        assert!(response.total.is_none());
        assert!(response.list.is_empty());
    }
}
