use chrono::{SubsecRound, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Order, OrderLine, OrderSummary},
    services::{
        cart::{CartLine, consolidate},
        catalog::resolve_products,
        payment::{PaymentInput, validate_payment},
    },
    state::AppState,
};

/// Consolidates, validates, prices and persists an order in one pass.
/// Any failing step aborts before anything is written.
pub async fn place_order(
    state: &AppState,
    user_id: Uuid,
    raw_items: &[CartLine],
    payment: &PaymentInput,
) -> AppResult<Order> {
    let items = consolidate(raw_items)?;

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let snapshots = resolve_products(state.catalog.as_ref(), &product_ids).await?;

    let payment = validate_payment(payment)?;

    // Tokens outlive accounts; the owner must still exist.
    if state.accounts.find_by_id(user_id).await?.is_none() {
        return Err(AppError::Unauthorized);
    }

    let order_id = Uuid::new_v4();
    let mut total_cents: i64 = 0;
    let mut lines = Vec::with_capacity(items.len());

    for item in &items {
        let snapshot = snapshots.get(&item.product_id).ok_or(AppError::InvalidProduct)?;

        total_cents = snapshot
            .unit_price_cents
            .checked_mul(i64::from(item.quantity))
            .and_then(|amount| total_cents.checked_add(amount))
            .ok_or_else(|| AppError::InvalidInput("Order total is too large".into()))?;

        lines.push(OrderLine::from_parts(
            Uuid::new_v4(),
            order_id,
            item.product_id,
            snapshot.name.clone(),
            snapshot.unit_price_cents,
            item.quantity,
        ));
    }

    // Postgres keeps microseconds; truncate so the echo matches a re-read.
    let created_at = Utc::now().trunc_subsecs(6);
    let order = Order::from_parts(order_id, user_id, created_at, total_cents, payment, lines);

    state.orders.insert(&order).await?;

    tracing::info!(
        order_id = %order.id(),
        user_id = %user_id,
        total_cents = order.total_cents(),
        lines = order.lines().len(),
        payment_method = order.payment().method.as_str(),
        "order placed"
    );

    Ok(order)
}

/// Orders belonging to someone else are reported as missing.
pub async fn get_order(state: &AppState, user_id: Uuid, order_id: Uuid) -> AppResult<Order> {
    let order = state.orders.find_for_owner(user_id, order_id).await?;
    match order {
        Some(o) => Ok(o),
        None => Err(AppError::NotFound),
    }
}

pub async fn list_orders(state: &AppState, user_id: Uuid) -> AppResult<Vec<OrderSummary>> {
    let orders = state.orders.list_for_owner(user_id).await?;
    Ok(orders)
}
