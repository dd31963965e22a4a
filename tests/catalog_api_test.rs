mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, variant_json, TestApp};
use marketplace_api::errors::messages;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn category_is_created_from_a_multipart_form() {
    let app = TestApp::new().await;

    let response = app
        .request_multipart(
            "/api/v1/categories",
            &[("name", "Beverages")],
            &[("picture", "beverages.png", b"fake image bytes")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["name"], "Beverages");
    assert_eq!(body["picture"], "beverages.png");
}

#[tokio::test]
async fn first_picture_part_wins_when_duplicated() {
    let app = TestApp::new().await;

    let response = app
        .request_multipart(
            "/api/v1/categories",
            &[("name", "Beverages")],
            &[
                ("picture", "first.png", b"one"),
                ("picture", "second.png", b"two"),
                ("banner", "ignored.png", b"three"),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    assert_eq!(body["picture"], "first.png");
}

#[tokio::test]
async fn category_without_a_picture_writes_nothing() {
    let app = TestApp::new().await;

    // No file parts at all.
    let response = app
        .request_multipart("/api/v1/categories", &[("name", "Beverages")], &[])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["field"], "picture");
    assert_eq!(body["message"], messages::IMAGE_REQUIRED);

    // Files present, but none tagged `picture`.
    let response = app
        .request_multipart(
            "/api/v1/categories",
            &[("name", "Beverages")],
            &[("banner", "banner.png", b"bytes")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.request(Method::GET, "/api/v1/categories", None).await;
    let body = response_json(response).await;
    assert_eq!(body["totalCategoryCount"], 0);
}

#[tokio::test]
async fn category_requires_a_name() {
    let app = TestApp::new().await;

    let response = app
        .request_multipart(
            "/api/v1/categories",
            &[],
            &[("picture", "beverages.png", b"bytes")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["field"], "category_details");
    assert_eq!(body["message"], messages::NAME_REQUIRED);
}

#[tokio::test]
async fn category_with_products_cannot_be_deleted() {
    let app = TestApp::new().await;
    let cat = app.seed_category("Beverages").await;
    let prod = app.seed_product("Cola", cat.id, 10).await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/categories/{}", cat.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    app.request(Method::DELETE, &format!("/api/v1/products/{}", prod.id), None)
        .await;
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/categories/{}", cat.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn product_with_a_zero_cost_price_is_rejected() {
    let app = TestApp::new().await;
    let cat = app.seed_category("Beverages").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Cola",
                "store_id": Uuid::new_v4(),
                "category_id": cat.id,
                "pictures": ["front.png"],
                "variants": [variant_json("500ml", "0", "15.00", 5, 1)],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["field"], "variants[0].price.cost_price");
    assert_eq!(body["message"], messages::PRICE_GREATER_THAN_0);

    // Nothing was written.
    let response = app.request(Method::GET, "/api/v1/products", None).await;
    let body = response_json(response).await;
    assert_eq!(body["totalProductCount"], 0);
}

#[tokio::test]
async fn blank_picture_entries_are_rejected() {
    let app = TestApp::new().await;
    let cat = app.seed_category("Beverages").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Cola",
                "store_id": Uuid::new_v4(),
                "category_id": cat.id,
                "pictures": [""],
                "variants": [variant_json("500ml", "10.00", "15.00", 5, 1)],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["field"], "pictures");
    assert_eq!(body["message"], messages::PICTURE_EMPTY);

    let response = app.request(Method::GET, "/api/v1/products", None).await;
    let body = response_json(response).await;
    assert_eq!(body["totalProductCount"], 0);

    // The same rule applies when an update replaces the list.
    let prod = app.seed_product("Cola", cat.id, 5).await;
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}", prod.id),
            Some(json!({ "pictures": ["front.png", "  "] })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["field"], "pictures");
}

#[tokio::test]
async fn product_requires_at_least_one_variant() {
    let app = TestApp::new().await;
    let cat = app.seed_category("Beverages").await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Cola",
                "store_id": Uuid::new_v4(),
                "category_id": cat.id,
                "pictures": ["front.png"],
                "variants": [],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["field"], "variants");
    assert_eq!(body["message"], messages::VARIANTS_REQUIRED);
}

#[tokio::test]
async fn product_requires_an_existing_category() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/products",
            Some(json!({
                "name": "Cola",
                "store_id": Uuid::new_v4(),
                "category_id": Uuid::new_v4(),
                "pictures": ["front.png"],
                "variants": [variant_json("500ml", "10.00", "15.00", 5, 1)],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["field"], "category_id");
    assert_eq!(body["message"], messages::CATEGORY_ID_INVALID);
}

#[tokio::test]
async fn product_update_replaces_the_variant_list_whole() {
    let app = TestApp::new().await;
    let cat = app.seed_category("Beverages").await;
    let prod = app
        .seed_product_with_variants(
            "Cola",
            cat.id,
            vec![
                variant_json("500ml", "10.00", "15.00", 5, 1),
                variant_json("1l", "18.00", "25.00", 3, 1),
            ],
        )
        .await;

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}", prod.id),
            Some(json!({
                "variants": [variant_json("2l", "30.00", "45.00", 8, 1)],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let variants = body["variants"].as_array().unwrap();
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0]["size"], "2l");

    // An invalid replacement list leaves the stored record untouched.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}", prod.id),
            Some(json!({
                "variants": [variant_json("3l", "0", "45.00", 8, 1)],
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(Method::GET, &format!("/api/v1/products/{}", prod.id), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["variants"][0]["size"], "2l");
}

#[tokio::test]
async fn storefront_listing_hides_inactive_variants() {
    let app = TestApp::new().await;
    let cat = app.seed_category("Beverages").await;
    app.seed_product_with_variants(
        "Cola",
        cat.id,
        vec![
            variant_json("500ml", "10.00", "15.00", 5, 1),
            variant_json("1l", "18.00", "25.00", 3, 2),
        ],
    )
    .await;

    // Admin view keeps every variant.
    let response = app.request(Method::GET, "/api/v1/products", None).await;
    let body = response_json(response).await;
    assert_eq!(body["products"][0]["variants"].as_array().unwrap().len(), 2);

    // Storefront view drops the inactive one.
    let response = app
        .request(Method::GET, "/api/v1/products?storefront=true", None)
        .await;
    let body = response_json(response).await;
    let variants = body["products"][0]["variants"].as_array().unwrap();
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0]["size"], "500ml");
}

#[tokio::test]
async fn product_listing_filters_by_store_and_search() {
    let app = TestApp::new().await;
    let cat = app.seed_category("Beverages").await;
    let cola = app.seed_product("Cola Zero", cat.id, 5).await;
    app.seed_product("Orange Juice", cat.id, 5).await;

    let response = app
        .request(Method::GET, "/api/v1/products?search=COLA", None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["totalProductCount"], 1);
    assert_eq!(body["products"][0]["name"], "Cola Zero");

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products?store_id={}", cola.store_id),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["totalProductCount"], 1);
    assert_eq!(body["products"][0]["name"], "Cola Zero");
}

#[tokio::test]
async fn fetching_an_unknown_product_is_not_found() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
