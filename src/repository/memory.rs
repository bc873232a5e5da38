use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    AccountRepository, NewAccount, OrderRepository, ProductCatalog, RepositoryError,
};
use crate::models::{Account, Order, OrderSummary, Product};

#[derive(Debug, Default)]
pub struct InMemoryAccounts {
    accounts: RwLock<Vec<Account>>,
}

impl InMemoryAccounts {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccounts {
    async fn insert(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        // Check and insert under one write guard, same as a unique index.
        let mut accounts = self.accounts.write().await;
        if accounts
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(RepositoryError::Conflict("email already exists".into()));
        }

        let created = Account {
            id: Uuid::new_v4(),
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            created_at: Utc::now().trunc_subsecs(6),
        };
        accounts.push(created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, RepositoryError> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a product, standing in for the admin catalog editor.
    pub async fn upsert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn find_active(&self, ids: &[Uuid]) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| products.get(id))
            .filter(|p| p.is_active)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryOrders {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrders {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.id() == order.id()) {
            return Err(RepositoryError::Conflict(format!(
                "order {} already exists",
                order.id()
            )));
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn find_for_owner(
        &self,
        owner_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, RepositoryError> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .find(|o| o.id() == order_id && o.owner_id() == owner_id)
            .map(|o| {
                let mut lines = o.lines().to_vec();
                lines.sort_by(|a, b| a.product_name().cmp(b.product_name()));
                Order::from_parts(
                    o.id(),
                    o.owner_id(),
                    o.created_at(),
                    o.total_cents(),
                    o.payment().clone(),
                    lines,
                )
            }))
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<OrderSummary>, RepositoryError> {
        let orders = self.orders.read().await;
        let mut summaries: Vec<OrderSummary> = orders
            .iter()
            .filter(|o| o.owner_id() == owner_id)
            .map(|o| OrderSummary {
                id: o.id(),
                total_cents: o.total_cents(),
                created_at: o.created_at(),
                item_count: o.lines().len() as i64,
            })
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }
}
