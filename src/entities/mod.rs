use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub mod area;
pub mod category;
pub mod city;
pub mod product;

pub use area::Entity as Area;
pub use category::Entity as Category;
pub use city::Entity as City;
pub use product::Entity as Product;
pub use product::{Variant, VariantPrice};

/// Shared two-state lifecycle flag.
///
/// Stored and serialized as the integer the admin clients expect:
/// 1 = active, 2 = inactive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i16", db_type = "SmallInteger")]
#[serde(try_from = "i16", into = "i16")]
pub enum EntityStatus {
    #[sea_orm(num_value = 1)]
    Active,
    #[sea_orm(num_value = 2)]
    Inactive,
}

impl Default for EntityStatus {
    fn default() -> Self {
        EntityStatus::Active
    }
}

impl From<EntityStatus> for i16 {
    fn from(status: EntityStatus) -> Self {
        match status {
            EntityStatus::Active => 1,
            EntityStatus::Inactive => 2,
        }
    }
}

impl TryFrom<i16> for EntityStatus {
    type Error = String;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(EntityStatus::Active),
            2 => Ok(EntityStatus::Inactive),
            other => Err(format!("invalid status value: {}", other)),
        }
    }
}
