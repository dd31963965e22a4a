use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marketplace Catalog API",
        version = "1.0.0",
        description = r#"
# Marketplace Catalog & Inventory API

Catalog and inventory backend for a multi-vendor delivery marketplace:
delivery cities and areas, product categories, and store products with
embedded size/price/stock variants.

## Pagination

List endpoints are 1-indexed and accept the following query parameters:
- `pageNo`: page number (default: 1)
- `perPage`: items per page (default: 20, area listing defaults to 2)
- `search`: case-insensitive substring match on names

## Error Handling

Errors share a single response shape with the HTTP status, the offending
input field (for validation failures), a message, and a timestamp:

```json
{
  "error": "Bad Request",
  "field": "city_id",
  "message": "City id is required.",
  "timestamp": "2024-12-09T10:30:00.000Z"
}
```
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Locations", description = "City and delivery area endpoints"),
        (name = "Catalog", description = "Category, product and stock endpoints")
    ),
    paths(
        // Locations
        crate::handlers::locations::list_cities,
        crate::handlers::locations::add_city,
        crate::handlers::locations::delete_city,
        crate::handlers::locations::list_areas,
        crate::handlers::locations::add_area,
        crate::handlers::locations::update_area,
        crate::handlers::locations::delete_area,

        // Catalog
        crate::handlers::catalog::list_categories,
        crate::handlers::catalog::add_category,
        crate::handlers::catalog::delete_category,
        crate::handlers::catalog::list_products,
        crate::handlers::catalog::create_product,
        crate::handlers::catalog::get_product,
        crate::handlers::catalog::update_product,
        crate::handlers::catalog::delete_product,
        crate::handlers::catalog::decrement_stock,
    ),
    components(
        schemas(
            // Entities
            crate::entities::city::Model,
            crate::entities::area::Model,
            crate::entities::category::Model,
            crate::entities::product::Model,
            crate::entities::product::Variant,
            crate::entities::product::VariantPrice,

            // Location types
            crate::handlers::locations::CityListResponse,
            crate::handlers::locations::AreaListResponse,
            crate::services::locations::CreateCityInput,
            crate::services::locations::CreateAreaInput,
            crate::services::locations::UpdateAreaInput,

            // Catalog types
            crate::handlers::catalog::CategoryListResponse,
            crate::handlers::catalog::ProductListResponse,
            crate::handlers::catalog::CreateCategoryForm,
            crate::handlers::catalog::DecrementStockRequest,
            crate::services::catalog::CreateCategoryInput,
            crate::services::catalog::CreateProductInput,
            crate::services::catalog::UpdateProductInput,
            crate::services::catalog::StockDecrement,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
