//! Admin console coverage: role gating, the order and delivery status
//! machines, catalog management, and user administration with cascades.

mod common;

use axum::http::{Method, StatusCode};
use common::{response_json, TestApp};
use lavanderia_api::entities::user::UserRole;
use serde_json::{json, Value};

async fn seed_admin(app: &TestApp) -> String {
    let admin = app
        .seed_user("Root", "root@example.com", UserRole::Admin)
        .await;
    app.token_for(&admin)
}

fn payment_body(amount_cents: i64) -> Value {
    json!({
        "amount_cents": amount_cents,
        "card_number": "4242424242424242",
        "card_holder": "Ana Torres",
        "security_code": "123",
        "payment_method": "credit_card"
    })
}

#[tokio::test]
async fn admin_routes_are_role_gated() {
    let app = TestApp::new().await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let user_token = app.token_for(&user);

    let response = app
        .request(Method::GET, "/api/v1/admin/orders", Some(&user_token), None)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .request(Method::GET, "/api/v1/admin/orders", None, None)
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn order_status_updates_follow_the_transition_table() {
    let app = TestApp::new().await;
    let admin_token = seed_admin(&app).await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": shirts.id, "quantity": 1 })),
        )
        .await;
    let body = response_json(response).await;
    let order_id = body["order"]["order"]["id"].as_str().unwrap().to_string();

    // Skipping processed is rejected outright.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/orders/{order_id}/status"),
            Some(&admin_token),
            Some(json!({ "status": "delivered" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // pending -> processed -> delivered walks the table.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/orders/{order_id}/status"),
            Some(&admin_token),
            Some(json!({ "status": "processed" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/orders/{order_id}/status"),
            Some(&admin_token),
            Some(json!({ "status": "delivered" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["order"]["status"], "delivered");

    // delivered is terminal; backing up is rejected.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/orders/{order_id}/status"),
            Some(&admin_token),
            Some(json!({ "status": "processed" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_status_input_set_excludes_cancelled_and_unknowns() {
    let app = TestApp::new().await;
    let admin_token = seed_admin(&app).await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": shirts.id, "quantity": 1 })),
        )
        .await;
    let body = response_json(response).await;
    let order_id = body["order"]["order"]["id"].as_str().unwrap().to_string();

    for status in ["cancelled", "shipped", ""] {
        let response = app
            .request(
                Method::PUT,
                &format!("/api/v1/admin/orders/{order_id}/status"),
                Some(&admin_token),
                Some(json!({ "status": status })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "status={status}");
    }
}

#[tokio::test]
async fn delivery_status_updates_follow_the_track() {
    let app = TestApp::new().await;
    let admin_token = seed_admin(&app).await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": shirts.id, "quantity": 1 })),
        )
        .await;
    let body = response_json(response).await;
    let order_id = body["order"]["order"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/orders/{order_id}/delivery"),
            Some(&token),
            Some(json!({ "address": "Av. Central 123" })),
        )
        .await;
    let body = response_json(response).await;
    let delivery_id = body["delivery"]["id"].as_str().unwrap().to_string();

    // pending -> delivered skips in_transit: rejected.
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/deliveries/{delivery_id}/status"),
            Some(&admin_token),
            Some(json!({ "status": "delivered" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/deliveries/{delivery_id}/status"),
            Some(&admin_token),
            Some(json!({ "status": "in_transit" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/deliveries/{delivery_id}/status"),
            Some(&admin_token),
            Some(json!({ "status": "delivered" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["delivery"]["status"], "delivered");
}

#[tokio::test]
async fn category_crud_round_trip() {
    let app = TestApp::new().await;
    let admin_token = seed_admin(&app).await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let user_token = app.token_for(&user);

    let response = app
        .request(
            Method::POST,
            "/api/v1/admin/categories",
            Some(&admin_token),
            Some(json!({ "name": "Coats", "price_cents": 2500, "image": "coats.png" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = response_json(response).await;
    let category_id = body["category"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/categories/{category_id}/price"),
            Some(&admin_token),
            Some(json!({ "price_cents": 2700 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["category"]["price_cents"], 2700);

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/admin/categories/{category_id}/image"),
            Some(&admin_token),
            Some(json!({ "image": "coats-v2.png" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Users see the updated catalog.
    let response = app
        .request(Method::GET, "/api/v1/categories", Some(&user_token), None)
        .await;
    let body = response_json(response).await;
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0]["image"], "coats-v2.png");

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/categories/{category_id}"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/categories", Some(&user_token), None)
        .await;
    let body = response_json(response).await;
    assert!(body["categories"].as_array().unwrap().is_empty());

    // Deleting it again is a 404.
    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/categories/{category_id}"),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_category_preserves_existing_cart_lines() {
    let app = TestApp::new().await;
    let admin_token = seed_admin(&app).await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;

    app.request(
        Method::POST,
        "/api/v1/cart",
        Some(&token),
        Some(json!({ "category_id": shirts.id, "quantity": 2 })),
    )
    .await;

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/categories/{}", shirts.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The line keeps its snapshot; only the catalog link is gone.
    let response = app
        .request(Method::GET, "/api/v1/cart", Some(&token), None)
        .await;
    let body = response_json(response).await;
    let items = body["cart"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["category_name"], "Shirts");
    assert_eq!(items[0]["subtotal_cents"], 2000);
    assert!(items[0]["category_id"].is_null());
    assert_eq!(body["cart"]["order"]["total_cents"], 2000);
}

#[tokio::test]
async fn deleting_a_user_cascades_to_their_orders() {
    let app = TestApp::new().await;
    let admin_token = seed_admin(&app).await;
    let user = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let token = app.token_for(&user);
    let shirts = app.seed_category("Shirts", 1000).await;

    // A full order with delivery and payment, then a fresh pending cart.
    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&token),
            Some(json!({ "category_id": shirts.id, "quantity": 2 })),
        )
        .await;
    let body = response_json(response).await;
    let first_order = body["order"]["order"]["id"].as_str().unwrap().to_string();
    app.request(
        Method::POST,
        &format!("/api/v1/orders/{first_order}/delivery"),
        Some(&token),
        Some(json!({ "address": "Av. Central 123" })),
    )
    .await;
    app.request(
        Method::POST,
        &format!("/api/v1/orders/{first_order}/pay"),
        Some(&token),
        Some(payment_body(2000)),
    )
    .await;
    app.request(
        Method::POST,
        "/api/v1/cart",
        Some(&token),
        Some(json!({ "category_id": shirts.id, "quantity": 1 })),
    )
    .await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/admin/users/{}", user.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["orders"].as_array().unwrap().len(), 2);

    let response = app
        .request(
            Method::DELETE,
            &format!("/api/v1/admin/users/{}", user.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/admin/users/{}", user.id),
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // The orders went with the user.
    let response = app
        .request(Method::GET, "/api/v1/admin/orders", Some(&admin_token), None)
        .await;
    let body = response_json(response).await;
    assert!(body["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn pending_orders_listing_shows_only_unpaid_orders() {
    let app = TestApp::new().await;
    let admin_token = seed_admin(&app).await;
    let ana = app.seed_user("Ana", "ana@example.com", UserRole::User).await;
    let ben = app.seed_user("Ben", "ben@example.com", UserRole::User).await;
    let ana_token = app.token_for(&ana);
    let ben_token = app.token_for(&ben);
    let shirts = app.seed_category("Shirts", 1000).await;

    // Ana pays her order; Ben leaves his pending.
    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&ana_token),
            Some(json!({ "category_id": shirts.id, "quantity": 2 })),
        )
        .await;
    let body = response_json(response).await;
    let ana_order = body["order"]["order"]["id"].as_str().unwrap().to_string();
    app.request(
        Method::POST,
        &format!("/api/v1/orders/{ana_order}/delivery"),
        Some(&ana_token),
        Some(json!({ "address": "Av. Central 123" })),
    )
    .await;
    app.request(
        Method::POST,
        &format!("/api/v1/orders/{ana_order}/pay"),
        Some(&ana_token),
        Some(payment_body(2000)),
    )
    .await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/cart",
            Some(&ben_token),
            Some(json!({ "category_id": shirts.id, "quantity": 1 })),
        )
        .await;
    let body = response_json(response).await;
    let ben_order = body["order"]["order"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/orders/pending",
            Some(&admin_token),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["id"], ben_order.as_str());

    // The full admin listing still shows both, filterable by status.
    let response = app
        .request(
            Method::GET,
            "/api/v1/admin/orders?status=processed",
            Some(&admin_token),
            None,
        )
        .await;
    let body = response_json(response).await;
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["order"]["id"], ana_order.as_str());
}
