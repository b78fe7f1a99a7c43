//! Feed batch primitives.
//!
//! A `FeedBatch` is one production run of mixed feed. Its totals are derived
//! from its [`IngredientLine`]s by [`compute_batch`](crate::compute_batch)
//! and are persisted alongside the header so reads never recompute them.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::util::{parse_decimal, parse_uuid};
use crate::{EngineError, IngredientLine};

/// Bag size used when the caller does not provide one.
pub const DEFAULT_BAG_SIZE_KG: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedBatch {
    pub id: Uuid,
    pub batch_date: NaiveDate,
    pub batch_name: String,
    pub bag_size_kg: Decimal,
    /// Lines in the order they were supplied.
    pub lines: Vec<IngredientLine>,
    pub total_quantity_kg: Decimal,
    pub total_cost: Decimal,
    /// Nominal bag count used for costing, not a physical inventory count.
    pub total_bags: i64,
    pub cost_per_bag: Decimal,
    pub cost_per_kg: Decimal,
}

impl FeedBatch {
    /// Total quantity in metric tons.
    #[must_use]
    pub fn total_quantity_tons(&self) -> Decimal {
        (self.total_quantity_kg / Decimal::ONE_THOUSAND).normalize()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "feed_batches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub batch_date: Date,
    pub batch_name: String,
    pub bag_size_kg: String,
    pub total_quantity_kg: String,
    pub total_cost: String,
    pub total_bags: i64,
    pub cost_per_bag: String,
    pub cost_per_kg: String,
    /// Bumped by every replace; deletes are conditional on it.
    pub revision: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ingredients::Entity")]
    Ingredients,
}

impl Related<super::ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ingredients.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Header row for `batch` at `revision`, created at `created_at`.
impl From<(&FeedBatch, i64, DateTime<Utc>)> for ActiveModel {
    fn from((batch, revision, created_at): (&FeedBatch, i64, DateTime<Utc>)) -> Self {
        Self {
            id: ActiveValue::Set(batch.id.to_string()),
            batch_date: ActiveValue::Set(batch.batch_date),
            batch_name: ActiveValue::Set(batch.batch_name.clone()),
            bag_size_kg: ActiveValue::Set(batch.bag_size_kg.to_string()),
            total_quantity_kg: ActiveValue::Set(batch.total_quantity_kg.to_string()),
            total_cost: ActiveValue::Set(batch.total_cost.to_string()),
            total_bags: ActiveValue::Set(batch.total_bags),
            cost_per_bag: ActiveValue::Set(batch.cost_per_bag.to_string()),
            cost_per_kg: ActiveValue::Set(batch.cost_per_kg.to_string()),
            revision: ActiveValue::Set(revision),
            created_at: ActiveValue::Set(created_at),
        }
    }
}

impl TryFrom<(Model, Vec<IngredientLine>)> for FeedBatch {
    type Error = EngineError;

    fn try_from((model, lines): (Model, Vec<IngredientLine>)) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "feed batch")?,
            batch_date: model.batch_date,
            bag_size_kg: parse_decimal(&model.bag_size_kg, "bag_size_kg")?,
            total_quantity_kg: parse_decimal(&model.total_quantity_kg, "total_quantity_kg")?,
            total_cost: parse_decimal(&model.total_cost, "total_cost")?,
            total_bags: model.total_bags,
            cost_per_bag: parse_decimal(&model.cost_per_bag, "cost_per_bag")?,
            cost_per_kg: parse_decimal(&model.cost_per_kg, "cost_per_kg")?,
            batch_name: model.batch_name,
            lines,
        })
    }
}
