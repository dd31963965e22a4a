use axum::{
    extract::{Path, Query, State},
    routing::{delete, get},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{area, city};
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, ListParams};
use crate::services::locations::{
    AreaListParams, CityListParams, CreateAreaInput, CreateCityInput, UpdateAreaInput,
};
use crate::AppState;

/// Creates the router for city and area endpoints
pub fn locations_routes() -> Router<AppState> {
    Router::new()
        .route("/cities", get(list_cities).post(add_city))
        .route("/cities/:id", delete(delete_city))
        .route("/areas", get(list_areas).post(add_area))
        .route("/areas/:id", axum::routing::put(update_area).delete(delete_area))
}

/// City listing with the total count of matches
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CityListResponse {
    pub cities: Vec<city::Model>,
    #[serde(rename = "totalCityCount")]
    pub total_city_count: u64,
}

/// Area listing with the total count of matches. The area array is keyed
/// `city` on the wire, matching the public API contract.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AreaListResponse {
    #[serde(rename = "city")]
    pub areas: Vec<area::Model>,
    #[serde(rename = "totalAreaCount")]
    pub total_area_count: u64,
}

/// List cities
#[utoipa::path(
    get,
    path = "/api/v1/cities",
    params(ListParams),
    responses(
        (status = 200, description = "Cities for the requested page", body = CityListResponse),
        (status = 400, description = "Invalid pagination parameters", body = crate::errors::ErrorResponse)
    ),
    tag = "Locations"
)]
pub async fn list_cities(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let page = state
        .services
        .locations
        .list_cities(CityListParams {
            search: params.search,
            page_no: params.page_no,
            per_page: params.per_page,
        })
        .await?;

    Ok(success_response(CityListResponse {
        cities: page.items,
        total_city_count: page.total,
    }))
}

/// Create a city
#[utoipa::path(
    post,
    path = "/api/v1/cities",
    request_body = CreateCityInput,
    responses(
        (status = 201, description = "City created", body = city::Model),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Locations"
)]
pub async fn add_city(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateCityInput>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let city = state.services.locations.add_city(payload).await?;
    Ok(created_response(city))
}

/// Delete a city without areas
#[utoipa::path(
    delete,
    path = "/api/v1/cities/{id}",
    params(("id" = Uuid, Path, description = "City ID")),
    responses(
        (status = 200, description = "Deleted city", body = city::Model),
        (status = 400, description = "Unknown city", body = crate::errors::ErrorResponse),
        (status = 409, description = "City still has areas", body = crate::errors::ErrorResponse)
    ),
    tag = "Locations"
)]
pub async fn delete_city(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let city = state.services.locations.delete_city(id).await?;
    Ok(success_response(city))
}

/// List the areas of a city
#[utoipa::path(
    get,
    path = "/api/v1/areas",
    params(ListParams),
    responses(
        (status = 200, description = "Areas for the requested page", body = AreaListResponse),
        (status = 400, description = "Missing city_id or invalid pagination", body = crate::errors::ErrorResponse)
    ),
    tag = "Locations"
)]
pub async fn list_areas(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let page = state
        .services
        .locations
        .list_areas(AreaListParams {
            city_id: params.city_id,
            search: params.search,
            page_no: params.page_no,
            per_page: params.per_page,
        })
        .await?;

    Ok(success_response(AreaListResponse {
        areas: page.items,
        total_area_count: page.total,
    }))
}

/// Create an area
#[utoipa::path(
    post,
    path = "/api/v1/areas",
    request_body = CreateAreaInput,
    responses(
        (status = 201, description = "Area created", body = area::Model),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Locations"
)]
pub async fn add_area(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateAreaInput>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let area = state.services.locations.add_area(payload).await?;
    Ok(created_response(area))
}

/// Update an area
#[utoipa::path(
    put,
    path = "/api/v1/areas/{id}",
    params(("id" = Uuid, Path, description = "Area ID")),
    request_body = UpdateAreaInput,
    responses(
        (status = 200, description = "Updated area", body = area::Model),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown area", body = crate::errors::ErrorResponse)
    ),
    tag = "Locations"
)]
pub async fn update_area(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateAreaInput>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let area = state.services.locations.update_area(id, payload).await?;
    Ok(success_response(area))
}

/// Delete an area
#[utoipa::path(
    delete,
    path = "/api/v1/areas/{id}",
    params(("id" = Uuid, Path, description = "Area ID")),
    responses(
        (status = 200, description = "Deleted area", body = area::Model),
        (status = 400, description = "Unknown area", body = crate::errors::ErrorResponse)
    ),
    tag = "Locations"
)]
pub async fn delete_area(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let area = state.services.locations.delete_area(id).await?;
    Ok(success_response(area))
}
