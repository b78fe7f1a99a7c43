//! Batch cost calculator.
//!
//! Every derived field of a [`FeedBatch`] is recomputed from its lines on each
//! call; there is no incremental path. Sums are exact decimals. Per-unit
//! values (`cost_per_bag`, `cost_per_kg`) are rounded half-up to 4 decimal
//! places.
//!
//! The bag count is `total_quantity_kg / bag_size_kg` rounded half-up to a
//! whole bag. It is a nominal count for costing: the fractional remainder is
//! not represented and does not map to physical bags.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::util::{checked_sum, normalize_text, round_derived};
use crate::{
    EngineError, FeedBatch, IngredientInput, IngredientLine, ResultEngine, validate_lines,
};

/// Derive a batch from already validated lines.
///
/// The returned batch gets a fresh id; derived fields only depend on the
/// inputs, so repeated calls agree on everything but `id`.
pub fn compute_batch(
    batch_name: &str,
    batch_date: NaiveDate,
    bag_size_kg: Decimal,
    lines: Vec<IngredientLine>,
) -> ResultEngine<FeedBatch> {
    let batch_name = normalize_text(batch_name);
    if batch_name.is_empty() {
        return Err(EngineError::InvalidBatch {
            batch: batch_name,
            field: "batchName",
            reason: "must not be empty".to_string(),
        });
    }
    if lines.is_empty() {
        return Err(EngineError::EmptyBatch(batch_name));
    }
    if bag_size_kg <= Decimal::ZERO {
        return Err(EngineError::InvalidBagSize {
            batch: batch_name,
            reason: format!("must be > 0, got {bag_size_kg}"),
        });
    }

    let overflow = |field: &'static str| EngineError::InvalidBatch {
        batch: batch_name.clone(),
        field,
        reason: "sum overflows".to_string(),
    };
    let total_quantity_kg =
        checked_sum(lines.iter().map(|l| l.quantity_kg)).ok_or_else(|| overflow("totalQuantityKg"))?;
    let total_cost =
        checked_sum(lines.iter().map(|l| l.total_cost)).ok_or_else(|| overflow("totalCost"))?;

    let total_bags = nominal_bags(&batch_name, total_quantity_kg, bag_size_kg)?;
    if total_bags == 0 {
        return Err(EngineError::ZeroBags {
            batch: batch_name,
            total_quantity_kg,
            bag_size_kg,
        });
    }

    let cost_per_bag = total_cost
        .checked_div(Decimal::from(total_bags))
        .map(round_derived)
        .ok_or_else(|| {
            EngineError::DivisionUndefined(format!(
                "batch \"{batch_name}\" costPerBag over {total_bags} bags"
            ))
        })?;
    let cost_per_kg = total_cost
        .checked_div(total_quantity_kg)
        .map(round_derived)
        .ok_or_else(|| {
            EngineError::DivisionUndefined(format!(
                "batch \"{batch_name}\" costPerKg over {total_quantity_kg} kg"
            ))
        })?;

    tracing::debug!(
        batch = %batch_name,
        %total_quantity_kg,
        %total_cost,
        total_bags,
        "computed feed batch"
    );

    Ok(FeedBatch {
        id: Uuid::new_v4(),
        batch_date,
        batch_name,
        bag_size_kg,
        lines,
        total_quantity_kg,
        total_cost,
        total_bags,
        cost_per_bag,
        cost_per_kg,
    })
}

/// Validate raw inputs and derive the batch.
pub fn compute_batch_from_inputs(
    batch_name: &str,
    batch_date: NaiveDate,
    bag_size_kg: Decimal,
    inputs: &[IngredientInput],
) -> ResultEngine<FeedBatch> {
    let lines = validate_lines(inputs)?;
    compute_batch(batch_name, batch_date, bag_size_kg, lines)
}

fn nominal_bags(batch_name: &str, total_quantity_kg: Decimal, bag_size_kg: Decimal) -> ResultEngine<i64> {
    total_quantity_kg
        .checked_div(bag_size_kg)
        .map(|bags| bags.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|bags| bags.to_i64())
        .ok_or_else(|| EngineError::InvalidBatch {
            batch: batch_name.to_string(),
            field: "totalBags",
            reason: format!("out of range for {total_quantity_kg} kg at {bag_size_kg} kg per bag"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn input(name: &str, qty: i64, cost: i64) -> IngredientInput {
        IngredientInput::new(name, Decimal::from(qty), Decimal::from(cost))
    }

    fn fifty() -> Decimal {
        Decimal::from(50)
    }

    #[test]
    fn layer_mash_scenario() {
        let batch = compute_batch_from_inputs(
            "Layer mash",
            date(),
            fifty(),
            &[input("Maize", 500, 25_000), input("Soya", 300, 21_000)],
        )
        .unwrap();

        assert_eq!(batch.total_quantity_kg, Decimal::from(800));
        assert_eq!(batch.total_cost, Decimal::from(46_000));
        assert_eq!(batch.total_bags, 16);
        assert_eq!(batch.cost_per_bag, Decimal::from(2_875));
        assert_eq!(batch.cost_per_kg, Decimal::new(575, 1));
        assert_eq!(batch.total_quantity_tons(), Decimal::new(8, 1));
    }

    #[test]
    fn too_small_for_one_bag_is_zero_bags() {
        let err = compute_batch_from_inputs("Tiny", date(), fifty(), &[input("Maize", 10, 500)])
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::ZeroBags {
                batch: "Tiny".to_string(),
                total_quantity_kg: Decimal::from(10),
                bag_size_kg: fifty(),
            }
        );
    }

    #[test]
    fn empty_ingredient_list_is_empty_batch() {
        let err = compute_batch_from_inputs("Nothing", date(), fifty(), &[]).unwrap_err();
        assert_eq!(err, EngineError::EmptyBatch("Nothing".to_string()));
    }

    #[test]
    fn non_positive_bag_size_is_rejected() {
        for bag in [Decimal::ZERO, Decimal::from(-50)] {
            let err =
                compute_batch_from_inputs("Mash", date(), bag, &[input("Maize", 100, 10)])
                    .unwrap_err();
            assert!(matches!(err, EngineError::InvalidBagSize { .. }));
        }
    }

    #[test]
    fn bag_count_beyond_i64_blames_the_total() {
        let huge = Decimal::from_i128_with_scale(100_000_000_000_000_000_000, 0);
        let err = compute_batch_from_inputs(
            "Silo",
            date(),
            Decimal::ONE,
            &[IngredientInput::new("Maize", huge, Decimal::ONE)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidBatch {
                field: "totalBags",
                ..
            }
        ));
    }

    #[test]
    fn blank_batch_name_is_rejected() {
        let err = compute_batch_from_inputs("  ", date(), fifty(), &[input("Maize", 100, 10)])
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidBatch {
                field: "batchName",
                ..
            }
        ));
    }

    #[test]
    fn bags_round_half_up() {
        // 125 kg / 50 kg = 2.5 bags -> 3
        let batch =
            compute_batch_from_inputs("Mash", date(), fifty(), &[input("Maize", 125, 300)])
                .unwrap();
        assert_eq!(batch.total_bags, 3);
        assert_eq!(batch.cost_per_bag, Decimal::from(100));

        // 124 kg / 50 kg = 2.48 bags -> 2
        let batch =
            compute_batch_from_inputs("Mash", date(), fifty(), &[input("Maize", 124, 300)])
                .unwrap();
        assert_eq!(batch.total_bags, 2);

        // 25 kg is exactly half a bag -> 1
        let batch =
            compute_batch_from_inputs("Mash", date(), fifty(), &[input("Maize", 25, 300)])
                .unwrap();
        assert_eq!(batch.total_bags, 1);
    }

    #[test]
    fn totals_are_exact_decimal_sums() {
        let inputs = [
            IngredientInput::new("Maize", Decimal::new(1, 1), Decimal::new(1, 2)),
            IngredientInput::new("Soya", Decimal::new(2, 1), Decimal::new(2, 2)),
            IngredientInput::new("Limestone", Decimal::new(999_997, 1), Decimal::new(7, 2)),
        ];
        let batch = compute_batch_from_inputs("Mash", date(), fifty(), &inputs).unwrap();

        let qty: Decimal = batch.lines.iter().map(|l| l.quantity_kg).sum();
        let cost: Decimal = batch.lines.iter().map(|l| l.total_cost).sum();
        assert_eq!(batch.total_quantity_kg, qty);
        assert_eq!(batch.total_cost, cost);
        assert_eq!(batch.total_quantity_kg, Decimal::from(100_000));
        assert_eq!(batch.total_cost, Decimal::new(1, 1));
    }

    #[test]
    fn cost_per_bag_times_bags_is_within_one_unit() {
        let batch =
            compute_batch_from_inputs("Mash", date(), fifty(), &[input("Maize", 150, 1_000)])
                .unwrap();
        assert_eq!(batch.total_bags, 3);
        assert_eq!(batch.cost_per_bag, Decimal::new(3_333_333, 4));

        let rebuilt = batch.cost_per_bag * Decimal::from(batch.total_bags);
        let unit = Decimal::new(1, 2);
        assert!((rebuilt - batch.total_cost).abs() <= unit);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let inputs = [input("Maize", 520, 26_100), input("Soya", 310, 21_777)];
        let a = compute_batch_from_inputs("Mash", date(), fifty(), &inputs).unwrap();
        let b = compute_batch_from_inputs("Mash", date(), fifty(), &inputs).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(FeedBatch { id: a.id, ..b }, a);
    }

    #[test]
    fn lines_keep_supplied_order() {
        let inputs = [input("Soya", 300, 1), input("Maize", 500, 1), input("Bran", 200, 1)];
        let batch = compute_batch_from_inputs("Mash", date(), fifty(), &inputs).unwrap();
        let names: Vec<&str> = batch.lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Soya", "Maize", "Bran"]);
    }

    #[test]
    fn invalid_line_fails_the_whole_batch() {
        let err = compute_batch_from_inputs(
            "Mash",
            date(),
            fifty(),
            &[input("Maize", 500, 1), input("Soya", 300, -1)],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidIngredient {
                index: 1,
                field: "totalCost",
                ..
            }
        ));
    }
}
