//! End-to-end storefront flows against a mocked commerce API.
//!
//! Each test drives the full router (sessions, extractors, templates) with a
//! single cookie jar, so guest state and sign-in behave as in a browser.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use common::{
    CART_ID, OTHER_PRODUCT_ID, PRODUCT_ID, TestApp, USER_ID, body_text, cart_populated,
    cart_with_ids, location, product_json, sign_in_json,
};

const BRAND_ID: &str = "64089bbe24b25627a253158b";
const CATEGORY_ID: &str = "6439d5b90049ad0b52b90048";

async fn mock_product(app: &TestApp, id: &str, title: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/products/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": product_json(id, title, 149)
        })))
        .mount(&app.api)
        .await;
}

async fn mock_sign_in(app: &TestApp) {
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sign_in_json()))
        .mount(&app.api)
        .await;
}

async fn mock_missing_product(app: &TestApp, id: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/products/{id}")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "statusMsg": "fail",
            "message": format!("No product for this id {id}")
        })))
        .mount(&app.api)
        .await;
}

/// Remote cart and wishlist reads made right after sign-in.
async fn mock_account_reads(app: &TestApp, cart: serde_json::Value, wishlist: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(wishlist))
        .mount(&app.api)
        .await;
}

/// Value of the first hidden `return_to` field on a page.
fn return_to_field(page: &str) -> &str {
    let marker = r#"name="return_to" value=""#;
    let start = page.find(marker).expect("return_to field") + marker.len();
    let rest = &page[start..];
    &rest[..rest.find('"').expect("closing quote")]
}

async fn sign_in(app: &mut TestApp, return_to: &str) -> String {
    let response = app
        .post_form(
            "/auth/login",
            &[
                ("email", "mona@example.com"),
                ("password", "secret123"),
                ("return_to", return_to),
            ],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    location(&response).to_string()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_is_ok() {
    let mut app = TestApp::spawn().await;
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_pages_carry_security_headers() {
    let mut app = TestApp::spawn().await;
    let response = app.get("/contact").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-frame-options").unwrap(),
        "DENY"
    );
    assert!(response.headers().contains_key("x-request-id"));
}

// =============================================================================
// Guest cart
// =============================================================================

#[tokio::test]
async fn test_guest_add_to_cart_increments_badge_by_one() {
    let mut app = TestApp::spawn().await;
    mock_product(&app, PRODUCT_ID, "Organic Apples").await;
    mock_product(&app, OTHER_PRODUCT_ID, "Greek Yogurt").await;

    assert_eq!(app.cart_badge().await, 0);

    let response = app
        .post_form(
            "/cart/add",
            &[("product_id", PRODUCT_ID), ("return_to", "/products")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/products");
    assert_eq!(app.cart_badge().await, 1);

    // Same product again: one line, higher count.
    app.post_form("/cart/add", &[("product_id", PRODUCT_ID)])
        .await;
    assert_eq!(app.cart_badge().await, 1);

    app.post_form("/cart/add", &[("product_id", OTHER_PRODUCT_ID)])
        .await;
    assert_eq!(app.cart_badge().await, 2);

    let page = body_text(app.get("/cart").await).await;
    assert!(page.contains("Organic Apples"));
    assert!(page.contains("Greek Yogurt"));
}

#[tokio::test]
async fn test_guest_add_unknown_product_leaves_badge() {
    let mut app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path(format!("/products/{PRODUCT_ID}")))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"statusMsg": "fail", "message": "No product for this id"})),
        )
        .mount(&app.api)
        .await;

    let response = app
        .post_form(
            "/cart/add",
            &[("product_id", PRODUCT_ID), ("return_to", "/contact")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.cart_badge().await, 0);

    let page = body_text(app.get("/contact").await).await;
    assert!(page.contains("Failed to add to cart"));
}

#[tokio::test]
async fn test_add_rejects_offsite_return_to() {
    let mut app = TestApp::spawn().await;
    mock_product(&app, PRODUCT_ID, "Organic Apples").await;

    let response = app
        .post_form(
            "/cart/add",
            &[
                ("product_id", PRODUCT_ID),
                ("return_to", "https://evil.example.com/"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/cart");
}

// =============================================================================
// Guest wishlist
// =============================================================================

#[tokio::test]
async fn test_guest_wishlist_toggle() {
    let mut app = TestApp::spawn().await;
    mock_product(&app, PRODUCT_ID, "Organic Apples").await;

    let toggle = [("product_id", PRODUCT_ID), ("return_to", "/contact")];

    app.post_form("/wishlist/toggle", &toggle).await;
    let page = body_text(app.get("/contact").await).await;
    assert!(page.contains("Added to wishlist"));

    let page = body_text(app.get("/wishlist").await).await;
    assert!(page.contains("Organic Apples"));

    app.post_form("/wishlist/toggle", &toggle).await;
    let page = body_text(app.get("/contact").await).await;
    assert!(page.contains("Removed from wishlist"));

    let page = body_text(app.get("/wishlist").await).await;
    assert!(!page.contains("Organic Apples"));
}

// =============================================================================
// Sign-in
// =============================================================================

#[tokio::test]
async fn test_sign_in_merges_guest_cart_and_wishlist() {
    let mut app = TestApp::spawn().await;
    mock_product(&app, PRODUCT_ID, "Organic Apples").await;
    mock_product(&app, OTHER_PRODUCT_ID, "Greek Yogurt").await;

    app.post_form(
        "/cart/add",
        &[("product_id", PRODUCT_ID), ("quantity", "2")],
    )
    .await;
    app.post_form("/wishlist/toggle", &[("product_id", OTHER_PRODUCT_ID)])
        .await;
    assert_eq!(app.cart_badge().await, 1);

    mock_sign_in(&app).await;
    let token = common::customer_token();

    // The API adds one unit; the merge then sets the guest count.
    Mock::given(method("POST"))
        .and(path("/cart"))
        .and(header("token", token.as_str()))
        .and(body_json(json!({"productId": PRODUCT_ID})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_with_ids(&[(PRODUCT_ID, 1)])),
        )
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/cart/{PRODUCT_ID}")))
        .and(body_json(json!({"count": 2})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_populated(&[(
                PRODUCT_ID,
                "Organic Apples",
                2,
            )])),
        )
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("POST"))
        .and(path("/wishlist"))
        .and(body_json(json!({"productId": OTHER_PRODUCT_ID})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Product added successfully to your wishlist",
            "data": [OTHER_PRODUCT_ID]
        })))
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_populated(&[(
            PRODUCT_ID,
            "Organic Apples",
            2,
        )])))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "count": 1,
            "data": [product_json(OTHER_PRODUCT_ID, "Greek Yogurt", 90)]
        })))
        .mount(&app.api)
        .await;

    assert_eq!(sign_in(&mut app, "/cart").await, "/cart");
    assert_eq!(app.cart_badge().await, 1);

    let page = body_text(app.get("/cart").await).await;
    assert!(page.contains("Logged in successfully!"));
    assert!(page.contains("Organic Apples"));
    assert!(page.contains("Mona"));
}

#[tokio::test]
async fn test_sign_in_failure_shows_api_message() {
    let mut app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "statusMsg": "fail",
            "message": "Incorrect email or password"
        })))
        .mount(&app.api)
        .await;

    let response = app
        .post_form(
            "/auth/login",
            &[("email", "mona@example.com"), ("password", "wrong-password")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let page = body_text(response).await;
    assert!(page.contains("Incorrect email or password"));
    assert!(page.contains("mona@example.com"));
}

#[tokio::test]
async fn test_auth_posts_are_rate_limited() {
    let mut app = TestApp::spawn().await;
    mock_sign_in(&app).await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_with_ids(&[])))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&app.api)
        .await;

    // Burst of five, then rejected.
    for _ in 0..5 {
        let response = app
            .post_form("/auth/login", &[("email", "mona@example.com"), ("password", "x")])
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
    let response = app
        .post_form("/auth/login", &[("email", "mona@example.com"), ("password", "x")])
        .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

// =============================================================================
// Signed-in cart
// =============================================================================

#[tokio::test]
async fn test_failed_add_rolls_back_badge_and_surfaces_message() {
    let mut app = TestApp::spawn().await;
    mock_sign_in(&app).await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_with_ids(&[(PRODUCT_ID, 1)])),
        )
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&app.api)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "statusMsg": "error",
            "message": "Product is out of stock"
        })))
        .mount(&app.api)
        .await;

    sign_in(&mut app, "/").await;
    assert_eq!(app.cart_badge().await, 1);

    let response = app
        .post_form(
            "/cart/add",
            &[("product_id", OTHER_PRODUCT_ID), ("return_to", "/contact")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.cart_badge().await, 1);

    let page = body_text(app.get("/contact").await).await;
    assert!(page.contains("Product is out of stock"));
}

#[tokio::test]
async fn test_signed_in_add_uses_api_count() {
    let mut app = TestApp::spawn().await;
    mock_sign_in(&app).await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "statusMsg": "fail",
            "message": format!("No cart exist for this user: {CART_ID}")
        })))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&app.api)
        .await;
    Mock::given(method("POST"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_with_ids(&[
            (PRODUCT_ID, 3),
            (OTHER_PRODUCT_ID, 1),
        ])))
        .mount(&app.api)
        .await;

    sign_in(&mut app, "/").await;
    assert_eq!(app.cart_badge().await, 0);

    app.post_form("/cart/add", &[("product_id", OTHER_PRODUCT_ID)])
        .await;
    assert_eq!(app.cart_badge().await, 2);
}

// =============================================================================
// Checkout and orders
// =============================================================================

#[tokio::test]
async fn test_checkout_requires_sign_in() {
    let mut app = TestApp::spawn().await;

    let response = app.get("/checkout").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login?return_to=%2Fcheckout");

    let response = app
        .post_form(
            "/checkout/cash",
            &[("details", "12 Nile St"), ("phone", "01012345678"), ("city", "Cairo")],
        )
        .await;
    assert_eq!(location(&response), "/auth/login?return_to=%2Fcheckout");

    let response = app.get("/orders").await;
    assert_eq!(location(&response), "/auth/login?return_to=%2Forders");
}

#[tokio::test]
async fn test_cash_checkout_places_order_and_clears_badge() {
    let mut app = TestApp::spawn().await;
    mock_sign_in(&app).await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_populated(&[(
            PRODUCT_ID,
            "Organic Apples",
            2,
        )])))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&app.api)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("/orders/{CART_ID}")))
        .and(body_json(json!({
            "shippingAddress": {"details": "12 Nile St", "phone": "01012345678", "city": "Cairo"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": "success",
            "data": {
                "_id": "6507e4b2a1f0c0d1e2f3a4b5",
                "id": 1024,
                "shippingAddress": {"details": "12 Nile St", "phone": "01012345678", "city": "Cairo"},
                "cartItems": [],
                "totalOrderPrice": 298,
                "paymentMethodType": "cash",
                "isPaid": false,
                "isDelivered": false,
                "createdAt": "2026-10-01T10:00:00.000Z"
            }
        })))
        .expect(1)
        .mount(&app.api)
        .await;

    sign_in(&mut app, "/checkout").await;
    assert_eq!(app.cart_badge().await, 1);

    let page = body_text(app.get("/checkout").await).await;
    assert!(page.contains("Organic Apples"));

    let response = app
        .post_form(
            "/checkout/cash",
            &[("details", "12 Nile St"), ("phone", "01012345678"), ("city", "Cairo")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/orders");
    assert_eq!(app.cart_badge().await, 0);
}

#[tokio::test]
async fn test_checkout_rejects_invalid_phone() {
    let mut app = TestApp::spawn().await;
    mock_sign_in(&app).await;
    Mock::given(method("GET"))
        .and(path("/cart"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_populated(&[(
            PRODUCT_ID,
            "Organic Apples",
            1,
        )])))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&app.api)
        .await;

    sign_in(&mut app, "/checkout").await;
    let response = app
        .post_form(
            "/checkout/cash",
            &[("details", "12 Nile St"), ("phone", "12345"), ("city", "Cairo")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_orders_are_fetched_with_customer_token() {
    let mut app = TestApp::spawn().await;
    mock_sign_in(&app).await;
    mock_account_reads(&app, cart_with_ids(&[]), json!({"data": []})).await;
    let token = common::customer_token();
    Mock::given(method("GET"))
        .and(path(format!("/orders/user/{USER_ID}")))
        .and(header("token", token.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&app.api)
        .await;

    sign_in(&mut app, "/").await;
    let response = app.get("/orders").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("placed any orders yet"));
}

#[tokio::test]
async fn test_expired_token_counts_as_signed_out() {
    let mut app = TestApp::spawn().await;
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "success",
            "user": {"name": "Mona", "email": "mona@example.com", "role": "user"},
            "token": common::customer_token_expiring(1_600_086_400)
        })))
        .mount(&app.api)
        .await;
    mock_account_reads(&app, cart_with_ids(&[]), json!({"data": []})).await;

    sign_in(&mut app, "/").await;

    let response = app.get("/checkout").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/auth/login?return_to=%2Fcheckout");

    let page = body_text(app.get("/contact").await).await;
    assert!(!page.contains("Mona"));
}

// =============================================================================
// Merge failures
// =============================================================================

#[tokio::test]
async fn test_failed_merge_keeps_remaining_units_for_next_sign_in() {
    let mut app = TestApp::spawn().await;
    mock_product(&app, PRODUCT_ID, "Organic Apples").await;
    app.post_form(
        "/cart/add",
        &[("product_id", PRODUCT_ID), ("quantity", "3")],
    )
    .await;

    // First sign-in: the add lands one unit, setting the count fails.
    mock_sign_in(&app).await;
    Mock::given(method("POST"))
        .and(path("/cart"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_with_ids(&[(PRODUCT_ID, 1)])),
        )
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/cart/{PRODUCT_ID}")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "statusMsg": "error",
            "message": "Internal server error"
        })))
        .expect(1)
        .mount(&app.api)
        .await;
    mock_account_reads(&app, cart_with_ids(&[(PRODUCT_ID, 1)]), json!({"data": []})).await;

    assert_eq!(sign_in(&mut app, "/contact").await, "/contact");
    let page = body_text(app.get("/contact").await).await;
    assert!(page.contains("Logged in, but some saved items could not be moved to your account"));

    let response = app.post_form("/auth/logout", &[]).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(app.cart_badge().await, 1);

    // Second sign-in: the remote line holds 2 after this add, and only the
    // two units still owed are pushed.
    app.api.reset().await;
    mock_sign_in(&app).await;
    Mock::given(method("POST"))
        .and(path("/cart"))
        .and(body_json(json!({"productId": PRODUCT_ID})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_with_ids(&[(PRODUCT_ID, 2)])),
        )
        .expect(1)
        .mount(&app.api)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/cart/{PRODUCT_ID}")))
        .and(body_json(json!({"count": 3})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(cart_populated(&[(
                PRODUCT_ID,
                "Organic Apples",
                3,
            )])),
        )
        .expect(1)
        .mount(&app.api)
        .await;
    mock_account_reads(
        &app,
        cart_populated(&[(PRODUCT_ID, "Organic Apples", 3)]),
        json!({"data": []}),
    )
    .await;

    sign_in(&mut app, "/contact").await;
    let page = body_text(app.get("/contact").await).await;
    assert!(page.contains("Logged in successfully!"));
    assert_eq!(app.cart_badge().await, 1);
}

#[tokio::test]
async fn test_failed_wishlist_merge_is_reported() {
    let mut app = TestApp::spawn().await;
    mock_product(&app, OTHER_PRODUCT_ID, "Greek Yogurt").await;
    app.post_form("/wishlist/toggle", &[("product_id", OTHER_PRODUCT_ID)])
        .await;

    mock_sign_in(&app).await;
    Mock::given(method("POST"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "statusMsg": "error",
            "message": "Internal server error"
        })))
        .expect(1)
        .mount(&app.api)
        .await;
    mock_account_reads(&app, cart_with_ids(&[]), json!({"data": []})).await;

    sign_in(&mut app, "/contact").await;
    let page = body_text(app.get("/contact").await).await;
    assert!(page.contains("Logged in, but some saved items could not be moved to your account"));

    // The entry is still saved for the guest after signing out.
    app.post_form("/auth/logout", &[]).await;
    let page = body_text(app.get("/wishlist").await).await;
    assert!(page.contains("Greek Yogurt"));
}

// =============================================================================
// Unavailable products
// =============================================================================

#[tokio::test]
async fn test_guest_cart_drops_unavailable_products() {
    let mut app = TestApp::spawn().await;
    mock_product(&app, PRODUCT_ID, "Organic Apples").await;
    mock_product(&app, OTHER_PRODUCT_ID, "Greek Yogurt").await;
    app.post_form("/cart/add", &[("product_id", PRODUCT_ID)]).await;
    app.post_form("/cart/add", &[("product_id", OTHER_PRODUCT_ID)])
        .await;
    assert_eq!(app.cart_badge().await, 2);

    app.api.reset().await;
    app.clear_catalog_cache().await;
    mock_missing_product(&app, PRODUCT_ID).await;
    mock_product(&app, OTHER_PRODUCT_ID, "Greek Yogurt").await;

    let page = body_text(app.get("/cart").await).await;
    assert!(page.contains("Greek Yogurt"));
    assert!(!page.contains("Organic Apples"));
    assert_eq!(app.cart_badge().await, 1);
}

#[tokio::test]
async fn test_guest_wishlist_drops_unavailable_products() {
    let mut app = TestApp::spawn().await;
    mock_product(&app, PRODUCT_ID, "Organic Apples").await;
    mock_product(&app, OTHER_PRODUCT_ID, "Greek Yogurt").await;
    app.post_form("/wishlist/toggle", &[("product_id", PRODUCT_ID)])
        .await;
    app.post_form("/wishlist/toggle", &[("product_id", OTHER_PRODUCT_ID)])
        .await;

    app.api.reset().await;
    app.clear_catalog_cache().await;
    mock_missing_product(&app, PRODUCT_ID).await;
    mock_product(&app, OTHER_PRODUCT_ID, "Greek Yogurt").await;

    let page = body_text(app.get("/wishlist").await).await;
    assert!(page.contains("Greek Yogurt"));
    assert!(!page.contains("Organic Apples"));

    // The dropped id is no longer looked up.
    app.api.reset().await;
    Mock::given(method("GET"))
        .and(path(format!("/products/{PRODUCT_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": product_json(PRODUCT_ID, "Organic Apples", 149)
        })))
        .expect(0)
        .mount(&app.api)
        .await;
    let page = body_text(app.get("/wishlist").await).await;
    assert!(page.contains("Greek Yogurt"));
}

// =============================================================================
// Signed-in wishlist
// =============================================================================

#[tokio::test]
async fn test_failed_wishlist_add_rolls_back_badge() {
    let mut app = TestApp::spawn().await;
    mock_sign_in(&app).await;
    mock_account_reads(
        &app,
        cart_with_ids(&[]),
        json!({
            "status": "success",
            "count": 1,
            "data": [product_json(PRODUCT_ID, "Organic Apples", 149)]
        }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/wishlist"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "statusMsg": "error",
            "message": "Wishlist is temporarily unavailable"
        })))
        .expect(1)
        .mount(&app.api)
        .await;

    sign_in(&mut app, "/").await;
    let page = body_text(app.get("/contact").await).await;
    assert!(page.contains(r#"<span class="badge">1</span>"#));

    let response = app
        .post_form(
            "/wishlist/add",
            &[("product_id", OTHER_PRODUCT_ID), ("return_to", "/contact")],
        )
        .await;
    assert_eq!(location(&response), "/contact");

    let page = body_text(app.get("/contact").await).await;
    assert!(page.contains("Wishlist is temporarily unavailable"));
    assert!(page.contains(r#"<span class="badge">1</span>"#));
    assert!(!page.contains(r#"<span class="badge">2</span>"#));
}

// =============================================================================
// Forms posted back from nested pages
// =============================================================================

#[tokio::test]
async fn test_wishlist_page_forms_return_to_wishlist() {
    let mut app = TestApp::spawn().await;
    mock_product(&app, PRODUCT_ID, "Organic Apples").await;
    app.post_form("/wishlist/toggle", &[("product_id", PRODUCT_ID)])
        .await;

    let page = body_text(app.get("/wishlist").await).await;
    let return_to = return_to_field(&page).to_string();
    assert_eq!(return_to, "/wishlist");

    let response = app
        .post_form(
            "/wishlist/remove",
            &[("product_id", PRODUCT_ID), ("return_to", &return_to)],
        )
        .await;
    assert_eq!(location(&response), "/wishlist");

    let page = body_text(app.get("/wishlist").await).await;
    assert!(page.contains("Removed from wishlist"));
}

#[tokio::test]
async fn test_brand_page_lists_brand_products() {
    let mut app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path(format!("/brands/{BRAND_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"_id": BRAND_ID, "name": "Fresh Farms", "slug": "fresh-farms"}
        })))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("brand", BRAND_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 1,
            "data": [product_json(PRODUCT_ID, "Organic Apples", 149)]
        })))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app.get(&format!("/brands/{BRAND_ID}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Fresh Farms"));
    assert!(page.contains("Organic Apples"));
    assert_eq!(return_to_field(&page), format!("/brands/{BRAND_ID}"));
}

#[tokio::test]
async fn test_category_page_lists_category_products() {
    let mut app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .and(path(format!("/categories/{CATEGORY_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"_id": CATEGORY_ID, "name": "Groceries", "slug": "groceries"}
        })))
        .mount(&app.api)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("category[in]", CATEGORY_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": 1,
            "data": [product_json(OTHER_PRODUCT_ID, "Greek Yogurt", 90)]
        })))
        .expect(1)
        .mount(&app.api)
        .await;

    let response = app.get(&format!("/categories/{CATEGORY_ID}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Groceries"));
    assert!(page.contains("Greek Yogurt"));
}
