use std::collections::HashMap;

use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Drops non-positive quantities and merges repeated products, summing
/// their quantities. Products keep the order of their first appearance.
pub fn consolidate(raw: &[CartLine]) -> AppResult<Vec<CartLine>> {
    let mut totals: Vec<(Uuid, i64)> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for line in raw.iter().filter(|l| l.quantity > 0) {
        match index.get(&line.product_id) {
            Some(&pos) => totals[pos].1 += i64::from(line.quantity),
            None => {
                index.insert(line.product_id, totals.len());
                totals.push((line.product_id, i64::from(line.quantity)));
            }
        }
    }

    if totals.is_empty() {
        return Err(AppError::EmptyCart);
    }

    totals
        .into_iter()
        .map(|(product_id, quantity)| {
            let quantity = i32::try_from(quantity).map_err(|_| {
                AppError::InvalidInput(format!("quantity for product {product_id} is too large"))
            })?;
            Ok(CartLine {
                product_id,
                quantity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: Uuid, quantity: i32) -> CartLine {
        CartLine {
            product_id,
            quantity,
        }
    }

    #[test]
    fn duplicate_products_collapse_into_one_line() {
        let p1 = Uuid::new_v4();
        let lines = consolidate(&[line(p1, 2), line(p1, 3)]).unwrap();
        assert_eq!(lines, vec![line(p1, 5)]);
    }

    #[test]
    fn keeps_first_seen_order() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let lines = consolidate(&[line(b, 1), line(a, 1), line(b, 4), line(c, 2)]).unwrap();
        assert_eq!(lines, vec![line(b, 5), line(a, 1), line(c, 2)]);
    }

    #[test]
    fn non_positive_quantities_are_dropped() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let lines = consolidate(&[line(a, 0), line(b, -4), line(a, 1)]).unwrap();
        assert_eq!(lines, vec![line(a, 1)]);
    }

    #[test]
    fn empty_input_is_an_empty_cart() {
        assert!(matches!(consolidate(&[]), Err(AppError::EmptyCart)));
    }

    #[test]
    fn nothing_positive_is_an_empty_cart() {
        let p = Uuid::new_v4();
        assert!(matches!(
            consolidate(&[line(p, 0), line(p, -1)]),
            Err(AppError::EmptyCart)
        ));
    }

    #[test]
    fn quantity_overflow_is_rejected() {
        let p = Uuid::new_v4();
        assert!(matches!(
            consolidate(&[line(p, i32::MAX), line(p, 1)]),
            Err(AppError::InvalidInput(_))
        ));
    }
}
