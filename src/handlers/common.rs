use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(data)).into_response()
}

/// Query parameters shared by every list endpoint. The wire names follow
/// the public API contract (`pageNo`/`perPage`, 1-indexed).
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct ListParams {
    /// Case-insensitive substring to match against names
    pub search: Option<String>,
    /// Scope the listing to one city (area listing only, required there)
    pub city_id: Option<Uuid>,
    /// 1-indexed page number
    #[serde(rename = "pageNo")]
    pub page_no: Option<u64>,
    /// Page size; capped by the server-side maximum
    #[serde(rename = "perPage")]
    pub per_page: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_use_the_public_wire_names() {
        let params: ListParams =
            serde_json::from_str(r#"{"search":"spr","pageNo":3,"perPage":2}"#).unwrap();
        assert_eq!(params.search.as_deref(), Some("spr"));
        assert_eq!(params.page_no, Some(3));
        assert_eq!(params.per_page, Some(2));
        assert!(params.city_id.is_none());
    }
}
