//! Cart behavior over the full HTTP surface: find-or-create of the pending
//! order, line merging, total recomputation, removal, and clearing.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use lavanderia_api::entities::user::UserRole;
use serde_json::json;

#[tokio::test]
async fn add_item_creates_pending_order_with_recomputed_total() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": shirts.id, "quantity": 2 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Item added to cart");
    assert_eq!(body["order"]["order"]["status"], "pending");
    assert_eq!(body["order"]["order"]["total_cents"], 2000);
    assert_eq!(body["order"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["order"]["items"][0]["quantity"], 2);
    assert_eq!(body["order"]["items"][0]["unit_price_cents"], 1000);
    assert_eq!(body["order"]["items"][0]["subtotal_cents"], 2000);
}

#[tokio::test]
async fn adding_same_category_twice_merges_into_one_line() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;

    let first = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": shirts.id, "quantity": 2 })),
        )
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    let body = response_json(first).await;
    assert_eq!(body["order"]["order"]["total_cents"], 2000);

    let second = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": shirts.id, "quantity": 1 })),
        )
        .await;
    assert_eq!(second.status(), StatusCode::OK);
    let body = response_json(second).await;

    let items = body["order"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1, "repeated adds must merge, not duplicate");
    assert_eq!(items[0]["quantity"], 3);
    assert_eq!(body["order"]["order"]["total_cents"], 3000);
}

#[tokio::test]
async fn total_spans_multiple_categories() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;
    let coats = app.seed_category("Coats", 2550).await;

    app.request(
        Method::POST,
        "/api/v1/cart",
        Some(&token),
        Some(json!({ "category_id": shirts.id, "quantity": 2 })),
    )
    .await;
    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": coats.id, "quantity": 1 })),
        )
        .await;

    let body = response_json(response).await;
    assert_eq!(body["order"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["order"]["order"]["total_cents"], 4550);
}

#[tokio::test]
async fn removing_the_only_line_zeroes_the_total() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": shirts.id, "quantity": 3 })),
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["order"]["order"]["total_cents"], 3000);
    let item_id = body["order"]["items"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/cart/{item_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["message"], "Item removed from cart");
    assert!(body["order"]["items"].as_array().unwrap().is_empty());
    assert_eq!(body["order"]["order"]["total_cents"], 0);
    // The pending order survives the removal of its last line.
    assert_eq!(body["order"]["order"]["status"], "pending");
}

#[tokio::test]
async fn clearing_the_cart_deletes_lines_and_zeroes_the_total() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;
    let coats = app.seed_category("Coats", 2000).await;

    for category in [&shirts, &coats] {
        app.request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": category.id, "quantity": 1 })),
        )
        .await;
    }

    let response = app
        .request(Method::DELETE, "/api/v1/cart/clear", Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Cart cleared successfully");

    let response = app
        .request(Method::GET, "/api/v1/cart", Some(&token), None)
        .await;
    let body = response_json(response).await;
    assert!(body["cart"]["items"].as_array().unwrap().is_empty());
    assert_eq!(body["cart"]["order"]["total_cents"], 0);
}

#[tokio::test]
async fn clearing_without_a_pending_order_is_still_a_success() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);

    let response = app
        .request(Method::DELETE, "/api/v1/cart/clear", Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn adding_unknown_category_is_not_found() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({
                "category_id": "4f9c24f1-51a8-4e85-9b88-6c2a83c3fa06",
                "quantity": 1
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zero_quantity_is_a_validation_error() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": shirts.id, "quantity": 0 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn cart_requires_authentication() {
    let app = TestApp::new().await;
    let shirts = app.seed_category("Shirts", 1000).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            None,
            Some(json!({ "category_id": shirts.id, "quantity": 1 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn empty_cart_read_is_not_found() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);

    let response = app
        .request(Method::GET, "/api/v1/cart", Some(&token), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn removing_another_users_line_reads_as_not_found() {
    let app = TestApp::new().await;
    let ana = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let ben = app.seed_user("Ben", "ben@example.com", UserRole::User).await;
    let ana_token = app.token_for(&ana);
    let ben_token = app.token_for(&ben);
    let shirts = app.seed_category("Shirts", 1000).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&ana_token),
            Some(json!({ "category_id": shirts.id, "quantity": 2 })),
        )
        .await;
    let body = response_json(response).await;
    let item_id = body["order"]["items"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/cart/{item_id}"),
            Some(&ben_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Ana's cart is untouched.
    let response = app
        .request(Method::GET, "/api/v1/cart", Some(&ana_token), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["cart"]["order"]["total_cents"], 2000);
}
