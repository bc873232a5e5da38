use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};
use sqlx::FromRow;
use uuid::Uuid;

use super::{AccountRepository, NewAccount, OrderRepository, ProductCatalog, RepositoryError};
use crate::{
    db::DbPool,
    entity::{
        order_items::{
            ActiveModel as OrderItemActive, Column as OrderItemCol, Entity as OrderItems,
            Model as OrderItemModel,
        },
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders, Model as OrderModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    models::{Account, Order, OrderLine, OrderSummary, PaymentDetails, Product},
};

#[derive(FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = RepositoryError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("account {}: {e}", row.id)))?;
        Ok(Account {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role,
            created_at: row.created_at,
        })
    }
}

/// Accounts live in `users`; a unique index on `lower(email)` is the
/// authority on duplicates.
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: DbPool,
}

impl PgAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn insert(&self, account: NewAccount) -> Result<Account, RepositoryError> {
        let row: AccountRow = sqlx::query_as(
            r#"
            INSERT INTO users (id, email, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, password_hash, role, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account.email.as_str())
        .bind(account.password_hash)
        .bind(account.role.as_str())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return RepositoryError::Conflict("email already exists".into());
                }
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, RepositoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, email, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Account::try_from).transpose()
    }
}

#[derive(Clone)]
pub struct SeaOrmProductCatalog {
    orm: DatabaseConnection,
}

impl SeaOrmProductCatalog {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl ProductCatalog for SeaOrmProductCatalog {
    async fn find_active(&self, ids: &[Uuid]) -> Result<Vec<Product>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let products = Products::find()
            .filter(
                Condition::all()
                    .add(ProdCol::Id.is_in(ids.to_vec()))
                    .add(ProdCol::IsActive.eq(true)),
            )
            .all(&self.orm)
            .await?
            .into_iter()
            .map(product_from_entity)
            .collect();

        Ok(products)
    }
}

#[derive(Clone)]
pub struct SeaOrmOrderRepository {
    orm: DatabaseConnection,
}

impl SeaOrmOrderRepository {
    pub fn new(orm: DatabaseConnection) -> Self {
        Self { orm }
    }
}

#[async_trait]
impl OrderRepository for SeaOrmOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        let txn = self.orm.begin().await?;

        OrderActive {
            id: Set(order.id()),
            user_id: Set(order.owner_id()),
            total_cents: Set(order.total_cents()),
            payment_method: Set(order.payment().method.as_str().to_string()),
            card_brand: Set(order.payment().card_brand.clone()),
            card_last4: Set(order.payment().card_last4.clone()),
            created_at: Set(order.created_at().into()),
        }
        .insert(&txn)
        .await?;

        let lines = order.lines().iter().map(|line| OrderItemActive {
            id: Set(line.id()),
            order_id: Set(line.order_id()),
            product_id: Set(line.product_id()),
            product_name: Set(line.product_name().to_string()),
            unit_price_cents: Set(line.unit_price_cents()),
            quantity: Set(line.quantity()),
        });
        OrderItems::insert_many(lines).exec(&txn).await?;

        // Dropping an uncommitted transaction rolls it back.
        txn.commit().await?;
        Ok(())
    }

    async fn find_for_owner(
        &self,
        owner_id: Uuid,
        order_id: Uuid,
    ) -> Result<Option<Order>, RepositoryError> {
        let order = Orders::find()
            .filter(
                Condition::all()
                    .add(OrderCol::UserId.eq(owner_id))
                    .add(OrderCol::Id.eq(order_id)),
            )
            .one(&self.orm)
            .await?;
        let order = match order {
            Some(o) => o,
            None => return Ok(None),
        };

        let items = OrderItems::find()
            .filter(OrderItemCol::OrderId.eq(order.id))
            .order_by_asc(OrderItemCol::ProductName)
            .all(&self.orm)
            .await?;

        order_from_entity(order, items).map(Some)
    }

    async fn list_for_owner(&self, owner_id: Uuid) -> Result<Vec<OrderSummary>, RepositoryError> {
        let orders = Orders::find()
            .filter(OrderCol::UserId.eq(owner_id))
            .order_by_desc(OrderCol::CreatedAt)
            .all(&self.orm)
            .await?;
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let counts: HashMap<Uuid, i64> = OrderItems::find()
            .select_only()
            .column(OrderItemCol::OrderId)
            .column_as(OrderItemCol::Id.count(), "item_count")
            .filter(OrderItemCol::OrderId.is_in(ids))
            .group_by(OrderItemCol::OrderId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.orm)
            .await?
            .into_iter()
            .collect();

        Ok(orders
            .into_iter()
            .map(|o| OrderSummary {
                id: o.id,
                total_cents: o.total_cents,
                created_at: o.created_at.with_timezone(&Utc),
                item_count: counts.get(&o.id).copied().unwrap_or(0),
            })
            .collect())
    }
}

fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price_cents: model.price_cents,
        is_active: model.is_active,
        category_id: model.category_id,
    }
}

fn order_from_entity(
    model: OrderModel,
    items: Vec<OrderItemModel>,
) -> Result<Order, RepositoryError> {
    let method = model.payment_method.parse().map_err(|_| {
        RepositoryError::DataCorruption(format!(
            "order {} has unknown payment method {:?}",
            model.id, model.payment_method
        ))
    })?;

    let lines = items
        .into_iter()
        .map(|item| {
            OrderLine::from_parts(
                item.id,
                item.order_id,
                item.product_id,
                item.product_name,
                item.unit_price_cents,
                item.quantity,
            )
        })
        .collect();

    Ok(Order::from_parts(
        model.id,
        model.user_id,
        model.created_at.with_timezone(&Utc),
        model.total_cents,
        PaymentDetails {
            method,
            card_brand: model.card_brand,
            card_last4: model.card_last4,
        },
        lines,
    ))
}
