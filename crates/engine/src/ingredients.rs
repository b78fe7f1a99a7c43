//! Ingredient lines.
//!
//! An [`IngredientLine`] is one purchased ingredient contributing to a
//! [`FeedBatch`](crate::FeedBatch). Lines are validated from raw
//! [`IngredientInput`]s and become immutable once attached to a persisted
//! batch: the only way to change them is to replace the whole batch.
//!
//! Quantities are kilograms and costs are in the farm currency, both exact
//! decimals.

use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::{normalize_optional_text, normalize_text, parse_decimal, round_derived};
use crate::{EngineError, ResultEngine};

/// Raw ingredient entry as supplied by a caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientInput {
    pub name: String,
    pub quantity_kg: Decimal,
    pub total_cost: Decimal,
    pub supplier: Option<String>,
}

impl IngredientInput {
    #[must_use]
    pub fn new(name: impl Into<String>, quantity_kg: Decimal, total_cost: Decimal) -> Self {
        Self {
            name: name.into(),
            quantity_kg,
            total_cost,
            supplier: None,
        }
    }

    #[must_use]
    pub fn supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub name: String,
    pub quantity_kg: Decimal,
    pub total_cost: Decimal,
    pub supplier: Option<String>,
    /// `total_cost / quantity_kg`, rounded half-up to 4 decimal places.
    pub cost_per_kg: Decimal,
}

impl IngredientLine {
    /// Validate and normalize the ingredient at position `index`.
    ///
    /// The name is trimmed (casing is kept), a blank supplier becomes `None`.
    pub fn validate(index: usize, input: &IngredientInput) -> ResultEngine<Self> {
        let invalid = |field: &'static str, reason: &str| EngineError::InvalidIngredient {
            index,
            field,
            reason: reason.to_string(),
        };

        let name = normalize_text(&input.name);
        if name.is_empty() {
            return Err(invalid("ingredientName", "must not be empty"));
        }
        if input.quantity_kg <= Decimal::ZERO {
            return Err(invalid("quantityKg", "must be > 0"));
        }
        if input.total_cost < Decimal::ZERO {
            return Err(invalid("totalCost", "must be >= 0"));
        }

        let cost_per_kg = input
            .total_cost
            .checked_div(input.quantity_kg)
            .map(round_derived)
            .ok_or_else(|| {
                EngineError::DivisionUndefined(format!(
                    "ingredients[{index}].costPerKg: quantityKg is {}",
                    input.quantity_kg
                ))
            })?;

        Ok(Self {
            name,
            quantity_kg: input.quantity_kg,
            total_cost: input.total_cost,
            supplier: normalize_optional_text(input.supplier.as_deref()),
            cost_per_kg,
        })
    }
}

/// Validate every input, reporting the first invalid line.
pub fn validate_lines(inputs: &[IngredientInput]) -> ResultEngine<Vec<IngredientLine>> {
    inputs
        .iter()
        .enumerate()
        .map(|(index, input)| IngredientLine::validate(index, input))
        .collect()
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "feed_batch_ingredients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub batch_id: String,
    pub position: i64,
    pub name: String,
    pub quantity_kg: String,
    pub total_cost: String,
    pub supplier: Option<String>,
    pub cost_per_kg: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::feed_batches::Entity",
        from = "Column::BatchId",
        to = "super::feed_batches::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    FeedBatches,
}

impl Related<super::feed_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FeedBatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Row for the line at `position` of batch `batch_id`.
impl From<(Uuid, usize, &IngredientLine)> for ActiveModel {
    fn from((batch_id, position, line): (Uuid, usize, &IngredientLine)) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            batch_id: ActiveValue::Set(batch_id.to_string()),
            position: ActiveValue::Set(position as i64),
            name: ActiveValue::Set(line.name.clone()),
            quantity_kg: ActiveValue::Set(line.quantity_kg.to_string()),
            total_cost: ActiveValue::Set(line.total_cost.to_string()),
            supplier: ActiveValue::Set(line.supplier.clone()),
            cost_per_kg: ActiveValue::Set(line.cost_per_kg.to_string()),
        }
    }
}

impl TryFrom<Model> for IngredientLine {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            quantity_kg: parse_decimal(&model.quantity_kg, "ingredient quantity_kg")?,
            total_cost: parse_decimal(&model.total_cost, "ingredient total_cost")?,
            cost_per_kg: parse_decimal(&model.cost_per_kg, "ingredient cost_per_kg")?,
            name: model.name,
            supplier: model.supplier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, qty: i64, cost: i64) -> IngredientInput {
        IngredientInput::new(name, Decimal::from(qty), Decimal::from(cost))
    }

    #[test]
    fn derives_cost_per_kg_and_trims_name() {
        let line = IngredientLine::validate(0, &input("  Maize  ", 500, 25_000)).unwrap();
        assert_eq!(line.name, "Maize");
        assert_eq!(line.cost_per_kg, Decimal::from(50));
    }

    #[test]
    fn cost_per_kg_keeps_four_places() {
        let line = IngredientLine::validate(0, &input("Soya", 3, 10)).unwrap();
        assert_eq!(line.cost_per_kg, Decimal::new(33_333, 4));
    }

    #[test]
    fn supplier_keeps_case_and_blank_becomes_none() {
        let line =
            IngredientLine::validate(0, &input("Fishmeal", 10, 100).supplier(" McDonald Feeds "))
                .unwrap();
        assert_eq!(line.supplier.as_deref(), Some("McDonald Feeds"));

        let line = IngredientLine::validate(0, &input("Fishmeal", 10, 100).supplier("  ")).unwrap();
        assert_eq!(line.supplier, None);
    }

    #[test]
    fn zero_cost_is_allowed() {
        let line = IngredientLine::validate(0, &input("Premix sample", 1, 0)).unwrap();
        assert_eq!(line.cost_per_kg, Decimal::ZERO);
    }

    #[test]
    fn rejects_blank_name() {
        let err = IngredientLine::validate(3, &input("   ", 1, 1)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidIngredient {
                index: 3,
                field: "ingredientName",
                reason: "must not be empty".to_string(),
            }
        );
    }

    #[test]
    fn rejects_non_positive_quantity() {
        for qty in [0, -5] {
            let err = IngredientLine::validate(1, &input("Maize", qty, 10)).unwrap_err();
            assert!(matches!(
                err,
                EngineError::InvalidIngredient {
                    index: 1,
                    field: "quantityKg",
                    ..
                }
            ));
        }
    }

    #[test]
    fn rejects_negative_cost() {
        let err = IngredientLine::validate(0, &input("Maize", 10, -1)).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidIngredient {
                field: "totalCost",
                ..
            }
        ));
    }

    #[test]
    fn validate_lines_reports_first_bad_index() {
        let inputs = vec![input("Maize", 10, 10), input("", 10, 10), input("Soya", 0, 10)];
        let err = validate_lines(&inputs).unwrap_err();
        assert!(matches!(err, EngineError::InvalidIngredient { index: 1, .. }));
    }
}
