use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::EntityStatus;
use crate::errors::{messages, ServiceError};

/// Product entity for the marketplace catalog.
///
/// `pictures`, `tags` and `variants` are JSON columns owned by the product
/// row. Variants in particular have no identity of their own: every write
/// replaces the whole sequence together with its parent, so a partially
/// persisted variant list cannot exist.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "products")]
#[schema(as = Product)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub name: String,

    pub description: Option<String>,

    /// Owning store
    pub store_id: Uuid,

    pub category_id: Uuid,

    #[sea_orm(column_type = "Json")]
    pub pictures: Json,

    pub sku_id: Option<String>,

    #[sea_orm(column_type = "Json")]
    pub tags: Json,

    #[sea_orm(column_type = "Json")]
    pub variants: Json,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn variant_list(&self) -> Result<Vec<Variant>, serde_json::Error> {
        serde_json::from_value(self.variants.clone())
    }

    pub fn picture_list(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_value(self.pictures.clone())
    }

    pub fn tag_list(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_value(self.tags.clone())
    }
}

/// Cost and sale price of a single variant. Both must be strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VariantPrice {
    #[schema(value_type = String, example = "75.00")]
    pub cost_price: Decimal,
    #[schema(value_type = String, example = "99.50")]
    pub sale_price: Decimal,
}

/// A purchasable size/price/stock combination embedded within a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Variant {
    pub size: String,

    pub price: VariantPrice,

    pub stock_quantity: i32,

    /// Inactive variants stay on the record for historical orders but are
    /// hidden from storefront listings.
    #[serde(default)]
    #[schema(value_type = i16, example = 1)]
    pub status: EntityStatus,

    /// Maximum quantity purchasable per order.
    #[serde(default = "default_order_max")]
    pub order_max: i32,

    #[serde(rename = "keyFeature", default, skip_serializing_if = "Option::is_none")]
    pub key_feature: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_order_max() -> i32 {
    20
}

impl Variant {
    pub fn is_active(&self) -> bool {
        self.status == EntityStatus::Active
    }

    /// Checks every invariant of this variant, naming the offending field as
    /// `variants[index].…` so a product write can report which entry failed.
    pub fn validate(&self, index: usize) -> Result<(), ServiceError> {
        if self.size.trim().is_empty() {
            return Err(ServiceError::validation(
                format!("variants[{}].size", index),
                messages::SIZE_REQUIRED,
            ));
        }
        if self.price.cost_price <= Decimal::ZERO {
            return Err(ServiceError::validation(
                format!("variants[{}].price.cost_price", index),
                messages::PRICE_GREATER_THAN_0,
            ));
        }
        if self.price.sale_price <= Decimal::ZERO {
            return Err(ServiceError::validation(
                format!("variants[{}].price.sale_price", index),
                messages::PRICE_GREATER_THAN_0,
            ));
        }
        if self.stock_quantity < 0 {
            return Err(ServiceError::validation(
                format!("variants[{}].stock_quantity", index),
                messages::STOCK_NON_NEGATIVE,
            ));
        }
        if self.order_max < 0 {
            return Err(ServiceError::validation(
                format!("variants[{}].order_max", index),
                messages::ORDER_MAX_NON_NEGATIVE,
            ));
        }
        Ok(())
    }
}
