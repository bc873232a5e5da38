use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::ProductSnapshot,
    repository::ProductCatalog,
};

/// Resolves every requested id to an active product, or fails the whole set
/// with `InvalidProduct` when any id is unknown or inactive.
pub async fn resolve_products(
    catalog: &dyn ProductCatalog,
    product_ids: &[Uuid],
) -> AppResult<HashMap<Uuid, ProductSnapshot>> {
    let requested: HashSet<Uuid> = product_ids.iter().copied().collect();
    let distinct: Vec<Uuid> = requested.iter().copied().collect();

    let resolved: HashMap<Uuid, ProductSnapshot> = catalog
        .find_active(&distinct)
        .await?
        .into_iter()
        .filter(|p| p.is_active && requested.contains(&p.id))
        .map(|p| {
            (
                p.id,
                ProductSnapshot {
                    name: p.name,
                    unit_price_cents: p.price_cents,
                },
            )
        })
        .collect();

    if resolved.len() != requested.len() {
        tracing::debug!(
            requested = requested.len(),
            resolved = resolved.len(),
            "product resolution failed"
        );
        return Err(AppError::InvalidProduct);
    }

    Ok(resolved)
}
