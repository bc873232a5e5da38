#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use serde_json::Value;
use storefront_orders_api::{
    config::JwtConfig,
    models::Product,
    repository::{InMemoryAccounts, InMemoryCatalog, InMemoryOrders},
    routes::create_router,
    services::auth_service::TokenKeys,
    state::AppState,
};
use tower::ServiceExt;
use uuid::Uuid;

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".into(),
        issuer: "ecommerce-api".into(),
        audience: "ecommerce-client".into(),
        ttl_hours: 6,
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub catalog: Arc<InMemoryCatalog>,
    pub orders: Arc<InMemoryOrders>,
}

impl TestApp {
    pub fn new() -> Self {
        let catalog = Arc::new(InMemoryCatalog::new());
        let orders = Arc::new(InMemoryOrders::new());
        let state = AppState::new(
            Arc::new(InMemoryAccounts::new()),
            catalog.clone(),
            orders.clone(),
            TokenKeys::new(&jwt_config()),
        );
        Self {
            router: create_router(state.clone()),
            state,
            catalog,
            orders,
        }
    }

    pub async fn add_product(&self, name: &str, price_cents: i64, is_active: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.set_product(id, name, price_cents, is_active).await;
        id
    }

    pub async fn set_product(&self, id: Uuid, name: &str, price_cents: i64, is_active: bool) {
        self.catalog
            .upsert(Product {
                id,
                name: name.into(),
                price_cents,
                is_active,
                category_id: None,
            })
            .await;
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    /// Registers and logs in, returning the account id and access token.
    pub async fn sign_up(&self, email: &str, password: &str) -> (Uuid, String) {
        let credentials = serde_json::json!({ "email": email, "password": password });
        let (status, _) = self
            .send("POST", "/auth/register", None, Some(credentials.clone()))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = self
            .send("POST", "/auth/login", None, Some(credentials))
            .await;
        assert_eq!(status, StatusCode::OK);
        let id = body["user"]["id"].as_str().unwrap().parse().unwrap();
        let token = body["accessToken"].as_str().unwrap().to_string();
        (id, token)
    }
}
