use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::PaginationConfig,
    entities::{category, product, Category, Product, Variant},
    errors::{messages, ServiceError},
    events::{Event, EventSender},
    services::pagination::{contains_ci, paginate, Page, PageRequest},
};

/// How many times a stock decrement re-reads and retries after losing a
/// concurrent write race before giving up.
const STOCK_CAS_ATTEMPTS: u32 = 5;

/// Service for categories and products, including variant stock.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    pagination: PaginationConfig,
}

impl CatalogService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            db,
            event_sender,
            pagination,
        }
    }

    /// Create a category from a name plus the uploaded files of a multipart
    /// request. Only files tagged `picture` count; the first one wins.
    /// Nothing is written when validation fails.
    #[instrument(skip(self, files))]
    pub async fn add_category(
        &self,
        input: CreateCategoryInput,
        files: Vec<UploadedFile>,
    ) -> Result<category::Model, ServiceError> {
        let picture = files
            .into_iter()
            .find(|f| f.field_name == "picture")
            .map(|f| f.filename)
            .ok_or_else(|| ServiceError::validation("picture", messages::IMAGE_REQUIRED))?;

        let name = match input.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => {
                return Err(ServiceError::validation(
                    "category_details",
                    messages::NAME_REQUIRED,
                ))
            }
        };

        let now = Utc::now();
        let cat = category::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            picture: Set(picture),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let cat = cat.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryCreated(cat.id))
            .await;

        info!("Created category: {}", cat.id);
        Ok(cat)
    }

    /// List categories in creation order, optionally filtered by name.
    #[instrument(skip(self))]
    pub async fn list_categories(
        &self,
        params: CategoryListParams,
    ) -> Result<Page<category::Model>, ServiceError> {
        let page = PageRequest::resolve(
            params.page_no,
            params.per_page,
            self.pagination.per_page,
            self.pagination.max_per_page,
        )?;

        let mut query = Category::find().order_by_asc(category::Column::CreatedAt);
        if let Some(condition) = contains_ci(
            &[category::Column::Name],
            params.search.as_deref().unwrap_or(""),
        ) {
            query = query.filter(condition);
        }

        paginate(&*self.db, query, page).await
    }

    /// Delete a category. Restricted: fails while any product references it.
    #[instrument(skip(self))]
    pub async fn delete_category(
        &self,
        category_id: Uuid,
    ) -> Result<category::Model, ServiceError> {
        let cat = Category::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::validation("category_id", messages::CATEGORY_ID_INVALID)
            })?;

        let dependents = Product::find()
            .filter(product::Column::CategoryId.eq(category_id))
            .count(&*self.db)
            .await?;
        if dependents > 0 {
            return Err(ServiceError::Conflict(messages::CATEGORY_IN_USE.to_string()));
        }

        let active: category::ActiveModel = cat.clone().into();
        active.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryDeleted(cat.id))
            .await;

        info!("Deleted category: {}", cat.id);
        Ok(cat)
    }

    /// Create a product. The variant list is validated as a whole and written
    /// atomically with the parent row.
    #[instrument(skip(self, input))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let name = match input.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => {
                return Err(ServiceError::validation(
                    "product_details",
                    messages::NAME_REQUIRED,
                ))
            }
        };
        let store_id = input.store_id.ok_or_else(|| {
            ServiceError::validation("product_details", messages::STORE_ID_REQUIRED)
        })?;
        let category_id = input.category_id.ok_or_else(|| {
            ServiceError::validation("product_details", messages::CATEGORY_ID_REQUIRED)
        })?;

        self.ensure_category_exists(category_id).await?;

        validate_pictures(&input.pictures)?;
        validate_variants(&input.variants)?;

        let now = Utc::now();
        let prod = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(input.description),
            store_id: Set(store_id),
            category_id: Set(category_id),
            pictures: Set(serde_json::to_value(&input.pictures)?),
            sku_id: Set(input.sku_id),
            tags: Set(serde_json::to_value(&input.tags)?),
            variants: Set(serde_json::to_value(&input.variants)?),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let prod = prod.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(prod.id))
            .await;

        info!("Created product: {}", prod.id);
        Ok(prod)
    }

    /// Partial update. A provided variant list replaces the stored one in
    /// full and is re-validated entry by entry first.
    #[instrument(skip(self, input))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        let prod = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let mut active: product::ActiveModel = prod.into();

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::validation(
                    "product_details",
                    messages::NAME_REQUIRED,
                ));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(Some(description));
        }
        if let Some(category_id) = input.category_id {
            self.ensure_category_exists(category_id).await?;
            active.category_id = Set(category_id);
        }
        if let Some(pictures) = input.pictures {
            validate_pictures(&pictures)?;
            active.pictures = Set(serde_json::to_value(&pictures)?);
        }
        if let Some(sku_id) = input.sku_id {
            active.sku_id = Set(Some(sku_id));
        }
        if let Some(tags) = input.tags {
            active.tags = Set(serde_json::to_value(&tags)?);
        }
        if let Some(variants) = input.variants {
            validate_variants(&variants)?;
            active.variants = Set(serde_json::to_value(&variants)?);
        }

        active.updated_at = Set(Some(Utc::now()));

        let prod = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(prod.id))
            .await;

        info!("Updated product: {}", prod.id);
        Ok(prod)
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        let prod = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let active: product::ActiveModel = prod.clone().into();
        active.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductDeleted(prod.id))
            .await;

        info!("Deleted product: {}", prod.id);
        Ok(prod)
    }

    /// List products, optionally scoped to a store or category and filtered
    /// by a name search. With `storefront` set, inactive variants are
    /// stripped from the returned records; the stored rows are untouched.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        params: ProductListParams,
    ) -> Result<Page<product::Model>, ServiceError> {
        let page = PageRequest::resolve(
            params.page_no,
            params.per_page,
            self.pagination.per_page,
            self.pagination.max_per_page,
        )?;

        let mut query = Product::find().order_by_asc(product::Column::CreatedAt);
        if let Some(store_id) = params.store_id {
            query = query.filter(product::Column::StoreId.eq(store_id));
        }
        if let Some(category_id) = params.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(condition) = contains_ci(
            &[product::Column::Name],
            params.search.as_deref().unwrap_or(""),
        ) {
            query = query.filter(condition);
        }

        let mut page = paginate(&*self.db, query, page).await?;

        if params.storefront {
            for prod in &mut page.items {
                let variants: Vec<Variant> = prod
                    .variant_list()?
                    .into_iter()
                    .filter(Variant::is_active)
                    .collect();
                prod.variants = serde_json::to_value(&variants)?;
            }
        }

        Ok(page)
    }

    /// Atomically take `quantity` units off one variant's stock.
    ///
    /// Stock lives inside the product's JSON variant column, so the write is
    /// a compare-and-swap keyed on `updated_at`: losing a race against a
    /// concurrent writer re-reads the row and revalidates against the fresh
    /// stock level, which is what turns two racing buyers of the last unit
    /// into one success and one `InsufficientStock`.
    #[instrument(skip(self))]
    pub async fn decrement_stock(
        &self,
        product_id: Uuid,
        variant_index: usize,
        quantity: i32,
    ) -> Result<StockDecrement, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::validation(
                "quantity",
                messages::QUANTITY_POSITIVE,
            ));
        }

        for attempt in 0..STOCK_CAS_ATTEMPTS {
            let prod = Product::find_by_id(product_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", product_id))
                })?;

            let mut variants = prod.variant_list()?;
            let variant = variants.get_mut(variant_index).ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Product {} has no variant at index {}",
                    product_id, variant_index
                ))
            })?;

            if !variant.is_active() {
                return Err(ServiceError::BadRequest(
                    messages::VARIANT_INACTIVE.to_string(),
                ));
            }
            if quantity > variant.order_max {
                return Err(ServiceError::validation(
                    "quantity",
                    messages::ORDER_MAX_EXCEEDED,
                ));
            }
            if variant.stock_quantity < quantity {
                return Err(ServiceError::InsufficientStock(format!(
                    "only {} left in stock",
                    variant.stock_quantity
                )));
            }

            variant.stock_quantity -= quantity;
            let remaining = variant.stock_quantity;
            let new_variants = serde_json::to_value(&variants)?;
            let now = Utc::now();

            let seen_version = match prod.updated_at {
                Some(ts) => product::Column::UpdatedAt.eq(ts),
                None => product::Column::UpdatedAt.is_null(),
            };

            let result = Product::update_many()
                .col_expr(product::Column::Variants, Expr::value(new_variants))
                .col_expr(product::Column::UpdatedAt, Expr::value(now))
                .filter(product::Column::Id.eq(product_id))
                .filter(seen_version)
                .exec(&*self.db)
                .await?;

            if result.rows_affected == 1 {
                self.event_sender
                    .send_or_log(Event::StockDecremented {
                        product_id,
                        variant_index,
                        quantity,
                        remaining,
                    })
                    .await;

                info!(
                    %product_id,
                    variant_index,
                    quantity,
                    remaining,
                    "decremented stock"
                );
                return Ok(StockDecrement {
                    product_id,
                    variant_index,
                    quantity,
                    remaining,
                });
            }

            warn!(
                %product_id,
                variant_index,
                attempt,
                "lost stock write race, retrying"
            );
        }

        Err(ServiceError::Conflict(
            "Stock was modified concurrently, please retry.".to_string(),
        ))
    }

    async fn ensure_category_exists(&self, category_id: Uuid) -> Result<(), ServiceError> {
        Category::find_by_id(category_id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::validation("category_id", messages::CATEGORY_ID_INVALID))
    }
}

/// The list must be non-empty and every entry must name a stored file.
fn validate_pictures(pictures: &[String]) -> Result<(), ServiceError> {
    if pictures.is_empty() || pictures.iter().any(|p| p.trim().is_empty()) {
        return Err(ServiceError::validation(
            "pictures",
            messages::PICTURE_EMPTY,
        ));
    }
    Ok(())
}

fn validate_variants(variants: &[Variant]) -> Result<(), ServiceError> {
    if variants.is_empty() {
        return Err(ServiceError::validation(
            "variants",
            messages::VARIANTS_REQUIRED,
        ));
    }
    for (index, variant) in variants.iter().enumerate() {
        variant.validate(index)?;
    }
    Ok(())
}

/// One file extracted from a multipart upload. Only the form tag and the
/// stored filename matter to the catalog; persistence of the bytes happens
/// upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub field_name: String,
    pub filename: String,
}

/// Result of a successful stock decrement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockDecrement {
    pub product_id: Uuid,
    pub variant_index: usize,
    pub quantity: i32,
    pub remaining: i32,
}

/// Input for creating a category
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateCategoryInput {
    pub name: Option<String>,
}

/// Query parameters for the category listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoryListParams {
    pub search: Option<String>,
    pub page_no: Option<u64>,
    pub per_page: Option<u64>,
}

/// Input for creating a product
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub store_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub pictures: Vec<String>,
    pub sku_id: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

/// Input for partially updating a product
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub pictures: Option<Vec<String>>,
    pub sku_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub variants: Option<Vec<Variant>>,
}

/// Query parameters for the product listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListParams {
    pub search: Option<String>,
    pub store_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub storefront: bool,
    pub page_no: Option<u64>,
    pub per_page: Option<u64>,
}
