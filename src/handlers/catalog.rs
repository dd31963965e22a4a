use axum::{
    extract::{Multipart, Path, Query, State},
    routing::{delete, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{category, product};
use crate::errors::ServiceError;
use crate::handlers::common::{created_response, success_response, ListParams};
use crate::services::catalog::{
    CategoryListParams, CreateCategoryInput, CreateProductInput, ProductListParams,
    StockDecrement, UpdateProductInput, UploadedFile,
};
use crate::AppState;

/// Creates the router for category and product endpoints
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(add_category))
        .route("/categories/:id", delete(delete_category))
        .route("/products", get(list_products).post(create_product))
        .route(
            "/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route(
            "/products/:id/variants/:index/decrement",
            axum::routing::post(decrement_stock),
        )
}

/// Category listing with the total count of matches
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryListResponse {
    pub categories: Vec<category::Model>,
    #[serde(rename = "totalCategoryCount")]
    pub total_category_count: u64,
}

/// Product listing with the total count of matches
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<product::Model>,
    #[serde(rename = "totalProductCount")]
    pub total_product_count: u64,
}

/// Multipart form for creating a category
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateCategoryForm {
    pub name: String,
    /// Image file; the part must be tagged `picture`
    #[schema(value_type = String, format = Binary)]
    pub picture: String,
}

/// Query parameters specific to the product listing
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams)]
pub struct ProductQueryParams {
    pub search: Option<String>,
    pub store_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// When set, inactive variants are omitted from the response
    #[serde(default)]
    pub storefront: bool,
    #[serde(rename = "pageNo")]
    pub page_no: Option<u64>,
    #[serde(rename = "perPage")]
    pub per_page: Option<u64>,
}

/// Body for a stock decrement
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct DecrementStockRequest {
    pub quantity: i32,
}

/// List categories
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    params(ListParams),
    responses(
        (status = 200, description = "Categories for the requested page", body = CategoryListResponse),
        (status = 400, description = "Invalid pagination parameters", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let page = state
        .services
        .catalog
        .list_categories(CategoryListParams {
            search: params.search,
            page_no: params.page_no,
            per_page: params.per_page,
        })
        .await?;

    Ok(success_response(CategoryListResponse {
        categories: page.items,
        total_category_count: page.total,
    }))
}

/// Create a category from a multipart form
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body(content = CreateCategoryForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Category created", body = category::Model),
        (status = 400, description = "Missing name or picture", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn add_category(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let mut input = CreateCategoryInput::default();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::BadRequest(format!("Malformed multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();

        if let Some(filename) = field.file_name() {
            files.push(UploadedFile {
                field_name,
                filename: filename.to_string(),
            });
            // Bytes are persisted by the upload middleware upstream; here
            // only the metadata matters, but the body must be drained.
            field
                .bytes()
                .await
                .map_err(|e| ServiceError::BadRequest(format!("Malformed file part: {}", e)))?;
            continue;
        }

        if field_name == "name" {
            let value = field
                .text()
                .await
                .map_err(|e| ServiceError::BadRequest(format!("Malformed text part: {}", e)))?;
            input.name = Some(value);
        }
    }

    let cat = state.services.catalog.add_category(input, files).await?;
    Ok(created_response(cat))
}

/// Delete a category without products
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted category", body = category::Model),
        (status = 400, description = "Unknown category", body = crate::errors::ErrorResponse),
        (status = 409, description = "Category still has products", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let cat = state.services.catalog.delete_category(id).await?;
    Ok(success_response(cat))
}

/// List products
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductQueryParams),
    responses(
        (status = 200, description = "Products for the requested page", body = ProductListResponse),
        (status = 400, description = "Invalid pagination parameters", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductQueryParams>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let page = state
        .services
        .catalog
        .list_products(ProductListParams {
            search: params.search,
            store_id: params.store_id,
            category_id: params.category_id,
            storefront: params.storefront,
            page_no: params.page_no,
            per_page: params.per_page,
        })
        .await?;

    Ok(success_response(ProductListResponse {
        products: page.items,
        total_product_count: page.total,
    }))
}

/// Create a product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = product::Model),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductInput>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let prod = state.services.catalog.create_product(payload).await?;
    Ok(created_response(prod))
}

/// Fetch one product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "The product", body = product::Model),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let prod = state.services.catalog.get_product(id).await?;
    Ok(success_response(prod))
}

/// Update a product
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Updated product", body = product::Model),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductInput>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let prod = state.services.catalog.update_product(id, payload).await?;
    Ok(success_response(prod))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Deleted product", body = product::Model),
        (status = 404, description = "Unknown product", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let prod = state.services.catalog.delete_product(id).await?;
    Ok(success_response(prod))
}

/// Take stock off one variant
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/variants/{index}/decrement",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("index" = usize, Path, description = "Zero-based variant index")
    ),
    request_body = DecrementStockRequest,
    responses(
        (status = 200, description = "Stock decremented", body = StockDecrement),
        (status = 400, description = "Invalid quantity or inactive variant", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown product or variant", body = crate::errors::ErrorResponse),
        (status = 409, description = "Lost too many write races", body = crate::errors::ErrorResponse),
        (status = 422, description = "Not enough stock", body = crate::errors::ErrorResponse)
    ),
    tag = "Catalog"
)]
pub async fn decrement_stock(
    State(state): State<AppState>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(payload): Json<DecrementStockRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let outcome = state
        .services
        .catalog
        .decrement_stock(id, index, payload.quantity)
        .await?;
    Ok(success_response(outcome))
}
