use std::sync::Arc;

use crate::{
    db::{DbPool, orm_from_pool},
    repository::{
        AccountRepository, OrderRepository, PgAccountRepository, ProductCatalog,
        SeaOrmOrderRepository, SeaOrmProductCatalog,
    },
    services::auth_service::TokenKeys,
};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub orders: Arc<dyn OrderRepository>,
    pub tokens: Arc<TokenKeys>,
}

impl AppState {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        catalog: Arc<dyn ProductCatalog>,
        orders: Arc<dyn OrderRepository>,
        tokens: TokenKeys,
    ) -> Self {
        Self {
            accounts,
            catalog,
            orders,
            tokens: Arc::new(tokens),
        }
    }

    /// Postgres-backed state sharing one pool between sqlx and SeaORM.
    pub fn postgres(pool: DbPool, tokens: TokenKeys) -> Self {
        let orm = orm_from_pool(&pool);
        Self::new(
            Arc::new(PgAccountRepository::new(pool)),
            Arc::new(SeaOrmProductCatalog::new(orm.clone())),
            Arc::new(SeaOrmOrderRepository::new(orm)),
            tokens,
        )
    }
}
