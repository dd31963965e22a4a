use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    config::PaginationConfig,
    entities::{area, city, Area, City, EntityStatus},
    errors::{messages, ServiceError},
    events::{Event, EventSender},
    services::pagination::{contains_ci, paginate, Page, PageRequest},
};

/// Service for the two-level city/area hierarchy.
#[derive(Clone)]
pub struct LocationService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    pagination: PaginationConfig,
}

impl LocationService {
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

    /// List cities in creation order, optionally filtered by a
    /// case-insensitive substring of the name.
    #[instrument(skip(self))]
    pub async fn list_cities(&self, params: CityListParams) -> Result<Page<city::Model>, ServiceError> {
        let page = PageRequest::resolve(
            params.page_no,
            params.per_page,
            self.pagination.per_page,
            self.pagination.max_per_page,
        )?;

        let mut query = City::find().order_by_asc(city::Column::CreatedAt);
        if let Some(condition) =
            contains_ci(&[city::Column::Name], params.search.as_deref().unwrap_or(""))
        {
            query = query.filter(condition);
        }

        paginate(&*self.db, query, page).await
    }

    /// List the areas of one city. `city_id` is mandatory; the area listing
    /// uses its own, smaller default page size.
    #[instrument(skip(self))]
    pub async fn list_areas(&self, params: AreaListParams) -> Result<Page<area::Model>, ServiceError> {
        let city_id = params
            .city_id
            .ok_or_else(|| ServiceError::validation("city_id", messages::CITY_ID_REQUIRED))?;

        let page = PageRequest::resolve(
            params.page_no,
            params.per_page,
            self.pagination.area_per_page,
            self.pagination.max_per_page,
        )?;

        let mut query = Area::find()
            .filter(area::Column::CityId.eq(city_id))
            .order_by_asc(area::Column::CreatedAt);
        if let Some(condition) =
            contains_ci(&[area::Column::Name], params.search.as_deref().unwrap_or(""))
        {
            query = query.filter(condition);
        }

        paginate(&*self.db, query, page).await
    }

    /// Create a new city.
    #[instrument(skip(self))]
    pub async fn add_city(&self, input: CreateCityInput) -> Result<city::Model, ServiceError> {
        let name = required_name(input.name, "city_details")?;

        let now = Utc::now();
        let city = city::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let city = city.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CityCreated(city.id))
            .await;

        info!("Created city: {}", city.id);
        Ok(city)
    }

    /// Create a new area. Required fields are checked in a fixed order
    /// (name, status, city_id) and the referenced city must exist.
    #[instrument(skip(self))]
    pub async fn add_area(&self, input: CreateAreaInput) -> Result<area::Model, ServiceError> {
        let name = match input.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => return Err(ServiceError::validation("area_details", messages::NAME_REQUIRED)),
        };
        let status = input
            .status
            .ok_or_else(|| ServiceError::validation("area_details", messages::STATUS_REQUIRED))?;
        let status = parse_status(status)?;
        let city_id = input
            .city_id
            .ok_or_else(|| ServiceError::validation("area_details", messages::CITY_ID_REQUIRED))?;

        self.ensure_city_exists(city_id).await?;

        let now = Utc::now();
        let area = area::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            status: Set(status),
            city_id: Set(city_id),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };

        let area = area.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::AreaCreated(area.id))
            .await;

        info!("Created area {} in city {}", area.id, city_id);
        Ok(area)
    }

    /// Partial update: only provided fields replace the stored record.
    #[instrument(skip(self))]
    pub async fn update_area(
        &self,
        area_id: Uuid,
        input: UpdateAreaInput,
    ) -> Result<area::Model, ServiceError> {
        let area = Area::find_by_id(area_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Area {} not found", area_id)))?;

        let mut active: area::ActiveModel = area.into();

        if let Some(name) = input.name {
            if name.trim().is_empty() {
                return Err(ServiceError::validation("area_details", messages::NAME_REQUIRED));
            }
            active.name = Set(name.trim().to_string());
        }
        if let Some(status) = input.status {
            active.status = Set(parse_status(status)?);
        }
        if let Some(city_id) = input.city_id {
            self.ensure_city_exists(city_id).await?;
            active.city_id = Set(city_id);
        }

        active.updated_at = Set(Some(Utc::now()));

        let area = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::AreaUpdated(area.id))
            .await;

        info!("Updated area: {}", area.id);
        Ok(area)
    }

    /// Hard delete. Returns the record as it was before deletion.
    #[instrument(skip(self))]
    pub async fn delete_area(&self, area_id: Uuid) -> Result<area::Model, ServiceError> {
        let area = Area::find_by_id(area_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::validation("area_id", messages::AREA_ID_INVALID))?;

        let active: area::ActiveModel = area.clone().into();
        active.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::AreaDeleted(area.id))
            .await;

        info!("Deleted area: {}", area.id);
        Ok(area)
    }

    /// Delete a city. Restricted: fails while any area still references it.
    #[instrument(skip(self))]
    pub async fn delete_city(&self, city_id: Uuid) -> Result<city::Model, ServiceError> {
        let city = City::find_by_id(city_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::validation("city_id", messages::CITY_ID_INVALID))?;

        let dependents = Area::find()
            .filter(area::Column::CityId.eq(city_id))
            .count(&*self.db)
            .await?;
        if dependents > 0 {
            return Err(ServiceError::Conflict(messages::CITY_IN_USE.to_string()));
        }

        let active: city::ActiveModel = city.clone().into();
        active.delete(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CityDeleted(city.id))
            .await;

        info!("Deleted city: {}", city.id);
        Ok(city)
    }

    async fn ensure_city_exists(&self, city_id: Uuid) -> Result<(), ServiceError> {
        City::find_by_id(city_id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::validation("city_id", messages::CITY_ID_INVALID))
    }
}

fn required_name(name: Option<String>, field: &str) -> Result<String, ServiceError> {
    match name {
        Some(name) if !name.trim().is_empty() => Ok(name.trim().to_string()),
        _ => Err(ServiceError::validation(field, messages::NAME_REQUIRED)),
    }
}

fn parse_status(raw: i16) -> Result<EntityStatus, ServiceError> {
    EntityStatus::try_from(raw)
        .map_err(|_| ServiceError::validation("status", messages::STATUS_INVALID))
}

/// Query parameters for the city listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityListParams {
    pub search: Option<String>,
    pub page_no: Option<u64>,
    pub per_page: Option<u64>,
}

/// Query parameters for the area listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaListParams {
    pub city_id: Option<Uuid>,
    pub search: Option<String>,
    pub page_no: Option<u64>,
    pub per_page: Option<u64>,
}

/// Input for creating a city
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateCityInput {
    pub name: Option<String>,
}

/// Input for creating an area
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct CreateAreaInput {
    pub name: Option<String>,
    pub status: Option<i16>,
    pub city_id: Option<Uuid>,
}

/// Input for partially updating an area
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateAreaInput {
    pub name: Option<String>,
    pub status: Option<i16>,
    pub city_id: Option<Uuid>,
}
