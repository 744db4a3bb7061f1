//! Time-series feature engineering.
//!
//! Derives one feature row per sales observation, computed independently per
//! (store, item) series. Lag and rolling features only ever look at prior rows
//! of the same series (no lookahead); the training targets are the one
//! deliberate exception (forward sums) and are excluded from the inference
//! vector.
//!
//! Zero-fill policy: a lag that reaches before the start of a series is 0, not
//! a hole. Rows are never dropped for missing history — the predictors were
//! trained against zero-filled vectors.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use supplyline_core::{ItemId, StoreId};

/// Number of features in the inference vector.
pub const FEATURE_COUNT: usize = 11;

/// One raw, date-stamped sales observation. Append-only; the sole input to
/// forecasting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesObservation {
    pub date: NaiveDate,
    pub store: StoreId,
    pub item: ItemId,
    /// Units sold on `date`. Non-negative.
    pub quantity: f64,
}

/// Training targets: total sales over the forward window starting at the next
/// row of the series. Partial at series end. Never part of the inference set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingTargets {
    pub next_7: f64,
    pub next_30: f64,
}

/// A sales observation augmented with time-series and calendar features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub store: StoreId,
    pub item: ItemId,
    pub quantity: f64,

    /// Quantity one row back in this series (0 at series start).
    pub lag_1: f64,
    /// Quantity seven rows back in this series (0 when unavailable).
    pub lag_7: f64,
    /// Rolling sum over the last 14 rows, current row included; partial
    /// windows at series start sum whatever exists.
    pub rolling_14: f64,
    /// Rolling sum over the last 28 rows, current row included.
    pub rolling_28: f64,
    /// Expanding (cumulative-to-date) mean, current row included.
    pub mean_sales: f64,

    pub day: u32,
    pub month: u32,
    pub year: i32,
    /// Monday = 0 .. Sunday = 6.
    pub day_of_week: u32,
    pub weekend: bool,
    pub quarter: u32,

    pub targets: TrainingTargets,
}

impl FeatureRow {
    /// The fixed feature vector the predictors were trained against.
    ///
    /// Order matters and must not change: lag_1, lag_7, rolling_14,
    /// rolling_28, mean_sales, day, month, year, day_of_week, weekend,
    /// quarter. Targets are intentionally absent.
    pub fn inference_vector(&self) -> [f64; FEATURE_COUNT] {
        [
            self.lag_1,
            self.lag_7,
            self.rolling_14,
            self.rolling_28,
            self.mean_sales,
            f64::from(self.day),
            f64::from(self.month),
            f64::from(self.year as u32),
            f64::from(self.day_of_week),
            if self.weekend { 1.0 } else { 0.0 },
            f64::from(self.quarter),
        ]
    }
}

/// Derive feature rows for every observation, grouped per (store, item).
///
/// Each group is sorted by date ascending before lag/rolling computation.
/// Output order is deterministic: ascending (store, item), then date.
/// Groups with zero or one observation yield degenerate-but-defined rows.
pub fn engineer_features(observations: &[SalesObservation]) -> Vec<FeatureRow> {
    let mut groups: BTreeMap<(StoreId, ItemId), Vec<&SalesObservation>> = BTreeMap::new();
    for obs in observations {
        groups.entry((obs.store, obs.item)).or_default().push(obs);
    }

    let mut rows = Vec::with_capacity(observations.len());
    for ((store, item), mut series) in groups {
        series.sort_by_key(|obs| obs.date);
        let quantities: Vec<f64> = series.iter().map(|obs| obs.quantity).collect();

        let mut running_sum = 0.0;
        for (i, obs) in series.iter().enumerate() {
            running_sum += quantities[i];

            rows.push(FeatureRow {
                date: obs.date,
                store,
                item,
                quantity: quantities[i],
                lag_1: lag(&quantities, i, 1),
                lag_7: lag(&quantities, i, 7),
                rolling_14: rolling_sum(&quantities, i, 14),
                rolling_28: rolling_sum(&quantities, i, 28),
                mean_sales: running_sum / (i as f64 + 1.0),
                day: obs.date.day(),
                month: obs.date.month(),
                year: obs.date.year(),
                day_of_week: obs.date.weekday().num_days_from_monday(),
                weekend: obs.date.weekday().num_days_from_monday() >= 5,
                quarter: (obs.date.month() - 1) / 3 + 1,
                targets: TrainingTargets {
                    next_7: forward_sum(&quantities, i, 7),
                    next_30: forward_sum(&quantities, i, 30),
                },
            });
        }
    }
    rows
}

fn lag(quantities: &[f64], i: usize, offset: usize) -> f64 {
    if i >= offset { quantities[i - offset] } else { 0.0 }
}

/// Backward-inclusive rolling sum: up to `window` rows ending at `i`.
fn rolling_sum(quantities: &[f64], i: usize, window: usize) -> f64 {
    let start = (i + 1).saturating_sub(window);
    quantities[start..=i].iter().sum()
}

/// Forward sum over the next `window` rows after `i`, partial at series end.
fn forward_sum(quantities: &[f64], i: usize, window: usize) -> f64 {
    let start = i + 1;
    let end = (start + window).min(quantities.len());
    if start >= end {
        0.0
    } else {
        quantities[start..end].iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn obs(day: u32, store: u32, item: u32, quantity: f64) -> SalesObservation {
        SalesObservation {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                + chrono::Days::new(u64::from(day - 1)),
            store: StoreId::new(store),
            item: ItemId::new(item),
            quantity,
        }
    }

    fn constant_series(n: u32, quantity: f64) -> Vec<SalesObservation> {
        (1..=n).map(|d| obs(d, 1, 1, quantity)).collect()
    }

    #[test]
    fn ten_constant_observations_match_expected_row_ten() {
        // 10 daily observations of 5 each; check the final row.
        let rows = engineer_features(&constant_series(10, 5.0));
        assert_eq!(rows.len(), 10);

        let last = rows.last().unwrap();
        assert_eq!(last.lag_1, 5.0);
        assert_eq!(last.lag_7, 5.0);
        // Window of 14 exceeds the 10 available rows: sum over all of them.
        assert_eq!(last.rolling_14, 50.0);
        assert_eq!(last.rolling_28, 50.0);
        assert_eq!(last.mean_sales, 5.0);
    }

    #[test]
    fn single_observation_group_is_degenerate_but_defined() {
        let rows = engineer_features(&[obs(15, 3, 9, 7.0)]);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.lag_1, 0.0);
        assert_eq!(row.lag_7, 0.0);
        assert_eq!(row.rolling_14, 7.0);
        assert_eq!(row.rolling_28, 7.0);
        assert_eq!(row.mean_sales, 7.0);
        assert_eq!(row.targets.next_7, 0.0);
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(engineer_features(&[]).is_empty());
    }

    #[test]
    fn groups_are_computed_independently() {
        let mut observations = constant_series(5, 2.0);
        observations.extend((1..=5).map(|d| obs(d, 2, 1, 100.0)));

        let rows = engineer_features(&observations);
        let store_one: Vec<_> = rows.iter().filter(|r| r.store == StoreId::new(1)).collect();
        assert_eq!(store_one.len(), 5);
        // Store 2's large quantities must not bleed into store 1's features.
        assert_eq!(store_one.last().unwrap().rolling_14, 10.0);
        assert_eq!(store_one.last().unwrap().mean_sales, 2.0);
    }

    #[test]
    fn unsorted_input_is_sorted_per_group_before_derivation() {
        let mut observations = constant_series(4, 1.0);
        observations[3].quantity = 9.0; // day 4
        observations.reverse();

        let rows = engineer_features(&observations);
        assert_eq!(rows[3].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(rows[3].lag_1, 1.0);
        assert_eq!(rows[3].quantity, 9.0);
    }

    #[test]
    fn calendar_features_are_functions_of_the_date() {
        // 2024-01-06 is a Saturday in Q1.
        let rows = engineer_features(&[obs(6, 1, 1, 1.0)]);
        let row = &rows[0];
        assert_eq!(row.day, 6);
        assert_eq!(row.month, 1);
        assert_eq!(row.year, 2024);
        assert_eq!(row.day_of_week, 5);
        assert!(row.weekend);
        assert_eq!(row.quarter, 1);
    }

    #[test]
    fn forward_targets_sum_the_next_window() {
        let observations: Vec<_> = (1..=9)
            .map(|d| obs(d, 1, 1, f64::from(d)))
            .collect();
        let rows = engineer_features(&observations);

        // Row at day 1: next 7 are days 2..=8 -> 2+..+8 = 35.
        assert_eq!(rows[0].targets.next_7, 35.0);
        // Row at day 5: only days 6..=9 remain -> 30 (partial window).
        assert_eq!(rows[4].targets.next_7, 30.0);
        // Last row has nothing ahead of it.
        assert_eq!(rows[8].targets.next_7, 0.0);
    }

    #[test]
    fn inference_vector_has_fixed_order_and_no_targets() {
        let rows = engineer_features(&constant_series(10, 5.0));
        let v = rows.last().unwrap().inference_vector();
        assert_eq!(v.len(), FEATURE_COUNT);
        assert_eq!(v[0], 5.0); // lag_1
        assert_eq!(v[1], 5.0); // lag_7
        assert_eq!(v[2], 50.0); // rolling_14
        assert_eq!(v[4], 5.0); // mean_sales
        assert_eq!(v[7], 2024.0); // year
    }

    proptest! {
        /// Features at row D are invariant to any change in rows after D
        /// within the same series (no lookahead), targets aside.
        #[test]
        fn no_lookahead(
            quantities in prop::collection::vec(0.0f64..200.0, 2..40),
            tail in 0.0f64..500.0,
        ) {
            let observations: Vec<_> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| obs(i as u32 + 1, 1, 1, *q))
                .collect();

            let mut mutated = observations.clone();
            mutated.last_mut().unwrap().quantity = tail;

            let before = engineer_features(&observations);
            let after = engineer_features(&mutated);

            for (a, b) in before.iter().zip(after.iter()).take(quantities.len() - 1) {
                prop_assert_eq!(a.inference_vector(), b.inference_vector());
            }
        }

        /// Rolling sums over a partial window equal the plain prefix sum.
        #[test]
        fn partial_windows_sum_available_rows(
            quantities in prop::collection::vec(0.0f64..100.0, 1..14),
        ) {
            let observations: Vec<_> = quantities
                .iter()
                .enumerate()
                .map(|(i, q)| obs(i as u32 + 1, 1, 1, *q))
                .collect();
            let rows = engineer_features(&observations);
            let total: f64 = quantities.iter().sum();
            prop_assert!((rows.last().unwrap().rolling_14 - total).abs() < 1e-9);
        }
    }
}
