use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::PaginationConfig;
use crate::events::EventSender;
use crate::services::{catalog::CatalogService, locations::LocationService};

pub mod catalog;
pub mod common;
pub mod locations;

/// All service instances, shared by every handler via `AppState`.
#[derive(Clone)]
pub struct AppServices {
    pub locations: Arc<LocationService>,
    pub catalog: Arc<CatalogService>,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            locations: Arc::new(LocationService::new(
                db.clone(),
                event_sender.clone(),
                pagination.clone(),
            )),
            catalog: Arc::new(CatalogService::new(db, event_sender, pagination)),
        }
    }
}
