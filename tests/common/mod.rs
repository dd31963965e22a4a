// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    Router,
};
use http_body_util::BodyExt;
use marketplace_api::{
    config::AppConfig,
    db,
    entities::{area, category, city, product},
    events::{self, EventSender},
    handlers::AppServices,
    services::catalog::{CreateCategoryInput, CreateProductInput, UploadedFile},
    services::locations::{CreateAreaInput, CreateCityInput},
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::prelude::Uuid;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

/// Helper harness for spinning up an application state backed by an
/// in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    ///
    /// The pool is pinned to a single connection so the in-memory database
    /// is shared by every query in the test.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new("sqlite::memory:", "test");
        cfg.auto_migrate = true;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(
            db_arc.clone(),
            Arc::new(event_sender.clone()),
            cfg.pagination.clone(),
        );

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", marketplace_api::api_v1_routes())
            .with_state(state.clone());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    /// Send a JSON request against the router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Send a multipart/form-data request with the given text and file
    /// parts. File parts are `(field_name, filename, bytes)`.
    pub async fn request_multipart(
        &self,
        uri: &str,
        text_parts: &[(&str, &str)],
        file_parts: &[(&str, &str, &[u8])],
    ) -> axum::response::Response {
        let boundary = "test-boundary-7MA4YWxkTrZu0gW";
        let mut body = Vec::new();

        for (name, value) in text_parts {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            );
            body.extend_from_slice(value.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        for (name, filename, bytes) in file_parts {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, filename
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .expect("failed to build multipart request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn seed_city(&self, name: &str) -> city::Model {
        self.state
            .services
            .locations
            .add_city(CreateCityInput {
                name: Some(name.to_string()),
            })
            .await
            .expect("seed city for tests")
    }

    pub async fn seed_area(&self, name: &str, city_id: Uuid) -> area::Model {
        self.state
            .services
            .locations
            .add_area(CreateAreaInput {
                name: Some(name.to_string()),
                status: Some(1),
                city_id: Some(city_id),
            })
            .await
            .expect("seed area for tests")
    }

    pub async fn seed_category(&self, name: &str) -> category::Model {
        self.state
            .services
            .catalog
            .add_category(
                CreateCategoryInput {
                    name: Some(name.to_string()),
                },
                vec![UploadedFile {
                    field_name: "picture".to_string(),
                    filename: format!("{}.png", name.to_lowercase()),
                }],
            )
            .await
            .expect("seed category for tests")
    }

    /// Seed a product with one active variant at the given stock level.
    pub async fn seed_product(
        &self,
        name: &str,
        category_id: Uuid,
        stock: i32,
    ) -> product::Model {
        self.seed_product_with_variants(
            name,
            category_id,
            vec![variant_json("500ml", "10.00", "15.00", stock, 1)],
        )
        .await
    }

    pub async fn seed_product_with_variants(
        &self,
        name: &str,
        category_id: Uuid,
        variants: Vec<Value>,
    ) -> product::Model {
        let input: CreateProductInput = serde_json::from_value(serde_json::json!({
            "name": name,
            "store_id": Uuid::new_v4(),
            "category_id": category_id,
            "pictures": ["front.png"],
            "tags": ["test"],
            "variants": variants,
        }))
        .expect("valid product input");

        self.state
            .services
            .catalog
            .create_product(input)
            .await
            .expect("seed product for tests")
    }
}

/// Build a variant JSON object for seeding and request bodies.
pub fn variant_json(size: &str, cost: &str, sale: &str, stock: i32, status: i16) -> Value {
    serde_json::json!({
        "size": size,
        "price": { "cost_price": cost, "sale_price": sale },
        "stock_quantity": stock,
        "status": status,
    })
}

pub fn decimal(value: &str) -> Decimal {
    value.parse().expect("valid decimal literal")
}

/// Read a response body as JSON.
pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read response body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("response body was not valid json")
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}
