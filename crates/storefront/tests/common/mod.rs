//! Shared harness for driving the storefront router against a mock API.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::MockServer;

use freshcart_storefront::build_app;
use freshcart_storefront::config::{CommerceApiConfig, SentryConfig, StorefrontConfig};
use freshcart_storefront::state::AppState;

pub const PRODUCT_ID: &str = "6428ebc6dc1175abc65ca0b9";
pub const OTHER_PRODUCT_ID: &str = "6428ebc6dc1175abc65ca0ba";
pub const CART_ID: &str = "64c8b1d2e7c7a3b1a1f0c0d1";
pub const USER_ID: &str = "64c8b1d2e7c7a3b1a1f0c0aa";

/// Client address sent on every request so auth posts can be rate limited.
const CLIENT_IP: &str = "203.0.113.7";

/// The storefront router plus a cookie jar holding one session.
pub struct TestApp {
    pub api: MockServer,
    state: AppState,
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let api = MockServer::start().await;
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from(
                "kq3VnZ8pXr2Lw7Yt5Hb1Mc9Dj4Fs6Ga0Ue8Ri2Oy7Tp3Wl5Nx1Qz9Ck4Bv6Jm0HdRf2Sa8Lc".to_string(),
            ),
            api: CommerceApiConfig {
                base_url: api.uri(),
                ..CommerceApiConfig::default()
            },
            sentry: SentryConfig::default(),
        };
        let state = AppState::new(config).expect("state");
        let router = build_app(state.clone()).expect("router");
        Self {
            api,
            state,
            router,
            cookie: None,
        }
    }

    pub async fn get(&mut self, path: &str) -> Response<Body> {
        let request = Request::get(path);
        self.send(request.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&mut self, path: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Request::post(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        let headers = request.headers_mut();
        headers.insert("x-forwarded-for", CLIENT_IP.parse().unwrap());
        if let Some(cookie) = &self.cookie {
            headers.insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.router.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some(pair) = set_cookie.split(';').next()
        {
            self.cookie = Some(pair.trim().to_string());
        }
        response
    }

    /// Drop cached catalog responses, as when the catalog changes upstream.
    pub async fn clear_catalog_cache(&self) {
        self.state.api().invalidate_all().await;
    }

    /// Current cart badge, read from the count fragment.
    pub async fn cart_badge(&mut self) -> u32 {
        let response = self.get("/cart/count").await;
        assert_eq!(response.status(), StatusCode::OK);
        badge_value(&body_text(response).await)
    }
}

/// Read a response body as UTF-8.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Redirect target of a response.
pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Number inside the cart count fragment; an empty fragment means 0.
pub fn badge_value(fragment: &str) -> u32 {
    fragment
        .split('>')
        .nth(1)
        .and_then(|rest| rest.split('<').next())
        .and_then(|n| n.trim().parse().ok())
        .unwrap_or(0)
}

/// An unsigned token whose payload names [`USER_ID`].
pub fn customer_token() -> String {
    unsigned_token(&json!({"id": USER_ID, "name": "Mona", "role": "user", "iat": 1_700_000_000}))
}

/// Like [`customer_token`], but expiring at `exp` (seconds since the epoch).
pub fn customer_token_expiring(exp: i64) -> String {
    unsigned_token(&json!({
        "id": USER_ID,
        "name": "Mona",
        "role": "user",
        "iat": 1_600_000_000,
        "exp": exp
    }))
}

fn unsigned_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header}.{payload}.signature")
}

pub fn product_json(id: &str, title: &str, price: u32) -> Value {
    json!({
        "_id": id,
        "title": title,
        "slug": title.to_lowercase().replace(' ', "-"),
        "description": "Fresh and tasty",
        "quantity": 40,
        "price": price,
        "imageCover": format!("https://cdn.example.com/{id}.jpeg"),
        "images": [],
        "category": {"_id": "6439d5b90049ad0b52b90048", "name": "Groceries", "slug": "groceries"},
        "brand": {"_id": "64089bbe24b25627a253158b", "name": "Fresh Farms", "slug": "fresh-farms"},
        "ratingsAverage": 4.5,
        "ratingsQuantity": 12
    })
}

pub fn sign_in_json() -> Value {
    json!({
        "message": "success",
        "user": {"name": "Mona", "email": "mona@example.com", "role": "user"},
        "token": customer_token()
    })
}

/// Cart response whose lines are bare product ids, as `POST /cart` returns.
pub fn cart_with_ids(lines: &[(&str, u32)]) -> Value {
    let products: Vec<Value> = lines
        .iter()
        .map(|(id, count)| json!({"count": count, "_id": format!("line-{id}"), "product": id, "price": 149}))
        .collect();
    cart_json(products)
}

/// Cart response whose lines carry populated products.
pub fn cart_populated(lines: &[(&str, &str, u32)]) -> Value {
    let products: Vec<Value> = lines
        .iter()
        .map(|(id, title, count)| {
            json!({
                "count": count,
                "_id": format!("line-{id}"),
                "product": {
                    "_id": id,
                    "title": title,
                    "imageCover": format!("https://cdn.example.com/{id}.jpeg"),
                    "category": {"_id": "6439d5b90049ad0b52b90048", "name": "Groceries", "slug": "groceries"},
                    "brand": {"_id": "64089bbe24b25627a253158b", "name": "Fresh Farms", "slug": "fresh-farms"},
                    "quantity": 40
                },
                "price": 149
            })
        })
        .collect();
    cart_json(products)
}

fn cart_json(products: Vec<Value>) -> Value {
    let count = products.len();
    let total: u64 = products
        .iter()
        .map(|line| line["count"].as_u64().unwrap_or(0) * 149)
        .sum();
    json!({
        "status": "success",
        "numOfCartItems": count,
        "cartId": CART_ID,
        "data": {
            "_id": CART_ID,
            "cartOwner": USER_ID,
            "products": products,
            "totalCartPrice": total
        }
    })
}
