//! Storage boundary for the order core.
//!
//! Services only see these traits. `postgres` backs them with sqlx and
//! SeaORM; `memory` keeps everything in process for tests and local runs.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Account, Order, OrderSummary, Product, Role};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryAccounts, InMemoryCatalog, InMemoryOrders};
pub use postgres::{PgAccountRepository, SeaOrmOrderRepository, SeaOrmProductCatalog};

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("orm error: {0}")]
    Orm(#[from] sea_orm::DbErr),

    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Fields needed to create an account. The email must already be normalized.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Inserts a new account.
    ///
    /// Returns `RepositoryError::Conflict` when the email is already taken.
    /// Implementations must enforce this at write time so two concurrent
    /// inserts for the same email cannot both succeed.
    async fn insert(&self, account: NewAccount) -> Result<Account, RepositoryError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, RepositoryError>;
}

#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Returns the active products among `ids`. Missing or inactive ids are
    /// simply absent from the result.
    async fn find_active(&self, ids: &[Uuid]) -> Result<Vec<Product>, RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists the order and all of its lines as one atomic unit.
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError>;

    async fn find_for_owner(
        &self,
        owner_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, RepositoryError>;

    /// Summaries of the owner's orders, newest first.
    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<OrderSummary>, RepositoryError>;
}
