//! Stock reconciliation planner.
//!
//! The pure half of the reconciliation engine: merge a forecast snapshot with
//! a stock snapshot and compute which entities need restocking and by how
//! much. Applying the plan (find-or-create pending requests) is the service
//! layer's job, inside its transaction.
//!
//! Both scopes use this planner — store/item against the 7-day forecast and
//! warehouse/item against the 30-day forecast.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One entity that needs restocking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestockNeed<K> {
    pub key: K,
    pub predicted_total: f64,
    pub current_stock: f64,
    /// `predicted_total - current_stock`; strictly positive by construction.
    pub required_quantity: f64,
}

/// Outer-join forecast and stock on the entity key (absent side counts as
/// zero) and keep the entities whose predicted demand strictly exceeds stock.
///
/// Equal stock and forecast means no action. Entities not needing restock are
/// omitted entirely — the caller leaves their existing requests alone. Output
/// is ordered by ascending key and duplicate-free (later snapshot entries for
/// the same key overwrite earlier ones).
pub fn plan_restocking<K: Ord + Copy>(
    forecast: &[(K, f64)],
    stock: &[(K, f64)],
) -> Vec<RestockNeed<K>> {
    let mut merged: BTreeMap<K, (f64, f64)> = BTreeMap::new();
    for &(key, predicted) in forecast {
        merged.entry(key).or_insert((0.0, 0.0)).0 = predicted;
    }
    for &(key, on_hand) in stock {
        merged.entry(key).or_insert((0.0, 0.0)).1 = on_hand;
    }

    merged
        .into_iter()
        .filter(|&(_, (predicted, on_hand))| predicted > on_hand)
        .map(|(key, (predicted, on_hand))| RestockNeed {
            key,
            predicted_total: predicted,
            current_stock: on_hand,
            required_quantity: predicted - on_hand,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn shortfall_produces_a_need_with_the_exact_gap() {
        let needs = plan_restocking(&[(1u32, 120.0)], &[(1u32, 80.0)]);
        assert_eq!(needs.len(), 1);
        assert_eq!(needs[0].required_quantity, 40.0);
        assert_eq!(needs[0].predicted_total, 120.0);
        assert_eq!(needs[0].current_stock, 80.0);
    }

    #[test]
    fn equal_forecast_and_stock_means_no_action() {
        assert!(plan_restocking(&[(1u32, 80.0)], &[(1u32, 80.0)]).is_empty());
    }

    #[test]
    fn missing_sides_are_zero_filled_not_dropped() {
        // Forecast-only entity: stock counts as 0.
        let needs = plan_restocking(&[(7u32, 15.0)], &[]);
        assert_eq!(needs.len(), 1);
        assert_eq!(needs[0].required_quantity, 15.0);

        // Stock-only entity: forecast 0 never exceeds stock.
        assert!(plan_restocking(&[], &[(7u32, 15.0)]).is_empty());
    }

    #[test]
    fn stock_only_entity_with_zero_stock_needs_nothing() {
        // 0 > 0 is false: strict inequality.
        assert!(plan_restocking(&[], &[(1u32, 0.0)]).is_empty());
    }

    #[test]
    fn output_is_key_ordered() {
        let needs = plan_restocking(&[(3u32, 10.0), (1u32, 10.0), (2u32, 10.0)], &[]);
        let keys: Vec<u32> = needs.iter().map(|n| n.key).collect();
        assert_eq!(keys, vec![1, 2, 3]);
    }

    proptest! {
        /// Required quantities are strictly positive and exact.
        #[test]
        fn required_quantity_is_the_positive_gap(
            entries in prop::collection::vec((0u32..50, 0.0f64..500.0, 0.0f64..500.0), 0..40),
        ) {
            let forecast: Vec<(u32, f64)> = entries.iter().map(|&(k, p, _)| (k, p)).collect();
            let stock: Vec<(u32, f64)> = entries.iter().map(|&(k, _, s)| (k, s)).collect();
            for need in plan_restocking(&forecast, &stock) {
                prop_assert!(need.required_quantity > 0.0);
                prop_assert_eq!(
                    need.required_quantity,
                    need.predicted_total - need.current_stock
                );
            }
        }

        /// Planning is idempotent: same inputs, same plan.
        #[test]
        fn planning_is_deterministic(
            forecast in prop::collection::vec((0u32..20, 0.0f64..100.0), 0..20),
            stock in prop::collection::vec((0u32..20, 0.0f64..100.0), 0..20),
        ) {
            prop_assert_eq!(
                plan_restocking(&forecast, &stock),
                plan_restocking(&forecast, &stock)
            );
        }
    }
}
