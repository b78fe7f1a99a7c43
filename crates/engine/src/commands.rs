//! Command structs for engine operations.
//!
//! These types group parameters for batch writes (create/replace), keeping
//! call sites readable and avoiding long argument lists.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::IngredientInput;

/// Create (or replace) a feed batch.
#[derive(Clone, Debug)]
pub struct NewBatchCmd {
    pub batch_name: String,
    pub batch_date: NaiveDate,
    /// Falls back to the engine default bag size when `None`.
    pub bag_size_kg: Option<Decimal>,
    pub ingredients: Vec<IngredientInput>,
}

impl NewBatchCmd {
    #[must_use]
    pub fn new(batch_name: impl Into<String>, batch_date: NaiveDate) -> Self {
        Self {
            batch_name: batch_name.into(),
            batch_date,
            bag_size_kg: None,
            ingredients: Vec::new(),
        }
    }

    #[must_use]
    pub fn bag_size_kg(mut self, bag_size_kg: Decimal) -> Self {
        self.bag_size_kg = Some(bag_size_kg);
        self
    }

    #[must_use]
    pub fn ingredient(mut self, ingredient: IngredientInput) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    #[must_use]
    pub fn ingredients(mut self, ingredients: impl IntoIterator<Item = IngredientInput>) -> Self {
        self.ingredients.extend(ingredients);
        self
    }
}
