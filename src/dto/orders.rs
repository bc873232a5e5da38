use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{Order, OrderLine, OrderSummary, PaymentMethod},
    services::{cart::CartLine, payment::PaymentInput},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    pub payment_method: Option<String>,
    pub card_brand: Option<String>,
    pub card_last4: Option<String>,
}

impl CreateOrderRequest {
    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.items
            .iter()
            .map(|i| CartLine {
                product_id: i.product_id,
                quantity: i.quantity,
            })
            .collect()
    }

    pub fn payment_input(&self) -> PaymentInput {
        PaymentInput {
            method: self.payment_method.clone(),
            card_brand: self.card_brand.clone(),
            card_last4: self.card_last4.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreatedResponse {
    pub order_id: Uuid,
    pub total_cents: i64,
    pub created_at_utc: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub card_brand: Option<String>,
    pub card_last4: Option<String>,
}

impl From<&Order> for OrderCreatedResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id(),
            total_cents: order.total_cents(),
            created_at_utc: order.created_at(),
            payment_method: order.payment().method,
            card_brand: order.payment().card_brand.clone(),
            card_last4: order.payment().card_last4.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryResponse {
    pub id: Uuid,
    pub total_cents: i64,
    pub created_at_utc: DateTime<Utc>,
    pub item_count: i64,
}

impl From<OrderSummary> for OrderSummaryResponse {
    fn from(summary: OrderSummary) -> Self {
        Self {
            id: summary.id,
            total_cents: summary.total_cents,
            created_at_utc: summary.created_at,
            item_count: summary.item_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
}

impl From<&OrderLine> for OrderLineResponse {
    fn from(line: &OrderLine) -> Self {
        Self {
            product_id: line.product_id(),
            product_name: line.product_name().to_string(),
            unit_price_cents: line.unit_price_cents(),
            quantity: line.quantity(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailResponse {
    pub id: Uuid,
    pub total_cents: i64,
    pub created_at_utc: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub card_brand: Option<String>,
    pub card_last4: Option<String>,
    pub items: Vec<OrderLineResponse>,
}

impl From<&Order> for OrderDetailResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id(),
            total_cents: order.total_cents(),
            created_at_utc: order.created_at(),
            payment_method: order.payment().method,
            card_brand: order.payment().card_brand.clone(),
            card_last4: order.payment().card_last4.clone(),
            items: order.lines().iter().map(OrderLineResponse::from).collect(),
        }
    }
}
