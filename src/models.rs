use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User" => Ok(Role::User),
            "Admin" => Ok(Role::Admin),
            other => Err(format!("unknown role {other:?}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Catalog row as seen by the order core. Read-only here.
#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub is_active: bool,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub name: String,
    pub unit_price_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentMethod {
    Card,
    Cash,
    Mock,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Card",
            PaymentMethod::Cash => "Cash",
            PaymentMethod::Mock => "Mock",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Card" => Ok(PaymentMethod::Card),
            "Cash" => Ok(PaymentMethod::Cash),
            "Mock" => Ok(PaymentMethod::Mock),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub card_brand: Option<String>,
    pub card_last4: Option<String>,
}

/// A priced order line. Name and unit price are copied from the catalog at
/// creation time and never follow later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    product_name: String,
    unit_price_cents: i64,
    quantity: i32,
}

impl OrderLine {
    pub(crate) fn from_parts(
        id: Uuid,
        order_id: Uuid,
        product_id: Uuid,
        product_name: String,
        unit_price_cents: i64,
        quantity: i32,
    ) -> Self {
        Self {
            id,
            order_id,
            product_id,
            product_name,
            unit_price_cents,
            quantity,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn order_id(&self) -> Uuid {
        self.order_id
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn unit_price_cents(&self) -> i64 {
        self.unit_price_cents
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }
}

/// An immutable order. `total_cents` is fixed when the order is priced and
/// is never recomputed from the lines afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    id: Uuid,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    total_cents: i64,
    payment: PaymentDetails,
    lines: Vec<OrderLine>,
}

impl Order {
    pub(crate) fn from_parts(
        id: Uuid,
        owner_id: Uuid,
        created_at: DateTime<Utc>,
        total_cents: i64,
        payment: PaymentDetails,
        lines: Vec<OrderLine>,
    ) -> Self {
        Self {
            id,
            owner_id,
            created_at,
            total_cents,
            payment,
            lines,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn owner_id(&self) -> Uuid {
        self.owner_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn total_cents(&self) -> i64 {
        self.total_cents
    }

    pub fn payment(&self) -> &PaymentDetails {
        &self.payment
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub id: Uuid,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub item_count: i64,
}
