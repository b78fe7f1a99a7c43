//! Reporting views.
//!
//! Thin orchestration over the house/log tables, the aggregator and the
//! batch repository. Nothing here computes a figure of its own.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    DailyLog, DailySummary, EngineError, FeedBatch, House, PeriodSummary, ResultEngine, Role,
    daily_logs, houses, summarize_day, summarize_period,
};

use super::{BatchListFilter, Engine, with_tx};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientReport {
    pub name: String,
    pub quantity_kg: Decimal,
    pub supplier: Option<String>,
    pub total_cost: Option<Decimal>,
    pub cost_per_kg: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCosts {
    pub total_cost: Decimal,
    pub cost_per_bag: Decimal,
    pub cost_per_kg: Decimal,
}

/// A batch as shown to a given role. Cost fields are only filled in for
/// roles allowed to see them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub id: Uuid,
    pub batch_date: NaiveDate,
    pub batch_name: String,
    pub bag_size_kg: Decimal,
    pub total_quantity_kg: Decimal,
    pub total_quantity_tons: Decimal,
    pub total_bags: i64,
    pub ingredients: Vec<IngredientReport>,
    pub costs: Option<BatchCosts>,
}

impl BatchReport {
    pub fn for_role(batch: FeedBatch, role: Role) -> Self {
        let show_costs = role.can_view_costs();
        let ingredients = batch
            .lines
            .iter()
            .map(|line| IngredientReport {
                name: line.name.clone(),
                quantity_kg: line.quantity_kg,
                supplier: line.supplier.clone(),
                total_cost: show_costs.then_some(line.total_cost),
                cost_per_kg: show_costs.then_some(line.cost_per_kg),
            })
            .collect();
        let costs = show_costs.then(|| BatchCosts {
            total_cost: batch.total_cost,
            cost_per_bag: batch.cost_per_bag,
            cost_per_kg: batch.cost_per_kg,
        });

        Self {
            id: batch.id,
            batch_date: batch.batch_date,
            total_quantity_tons: batch.total_quantity_tons(),
            batch_name: batch.batch_name,
            bag_size_kg: batch.bag_size_kg,
            total_quantity_kg: batch.total_quantity_kg,
            total_bags: batch.total_bags,
            ingredients,
            costs,
        }
    }
}

/// Longest range, in days, a period summary may cover.
pub const MAX_PERIOD_DAYS: i64 = 366;

fn validate_range(from: NaiveDate, to: NaiveDate) -> ResultEngine<()> {
    if from > to {
        return Err(EngineError::InvalidRange(format!(
            "from {from} is after to {to}"
        )));
    }
    let days = (to - from).num_days() + 1;
    if days > MAX_PERIOD_DAYS {
        return Err(EngineError::InvalidRange(format!(
            "{from}..{to} spans {days} days, at most {MAX_PERIOD_DAYS} allowed"
        )));
    }
    Ok(())
}

/// Houses ordered by id, so the breakdown keeps a stable order when houses
/// are renamed. Ids compare as text.
async fn load_houses(db_tx: &DatabaseTransaction) -> ResultEngine<Vec<House>> {
    let models = houses::Entity::find()
        .order_by_asc(houses::Column::Id)
        .all(db_tx)
        .await?;
    Ok(models.into_iter().map(House::from).collect())
}

/// Logs dated within `[from, to]`, plus the number of unreadable rows per
/// date.
async fn load_logs(
    db_tx: &DatabaseTransaction,
    from: NaiveDate,
    to: NaiveDate,
) -> ResultEngine<(Vec<DailyLog>, BTreeMap<NaiveDate, usize>)> {
    let models = daily_logs::Entity::find()
        .filter(daily_logs::Column::LogDate.gte(from))
        .filter(daily_logs::Column::LogDate.lte(to))
        .all(db_tx)
        .await?;

    let mut logs = Vec::with_capacity(models.len());
    let mut unreadable: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for model in models {
        let (log_id, log_date) = (model.id.clone(), model.log_date);
        match DailyLog::try_from(model) {
            Ok(log) => logs.push(log),
            Err(err) => {
                tracing::warn!(%log_id, %log_date, "unreadable daily log: {err}");
                *unreadable.entry(log_date).or_default() += 1;
            }
        }
    }
    Ok((logs, unreadable))
}

impl Engine {
    /// Every known house, ordered by id.
    pub async fn houses(&self) -> ResultEngine<Vec<House>> {
        with_tx!(self, |db_tx| load_houses(&db_tx).await)
    }

    /// Houses and the logs of `[from, to]`, read in one transaction.
    async fn production_rows(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<(Vec<House>, Vec<DailyLog>, BTreeMap<NaiveDate, usize>)> {
        with_tx!(self, |db_tx| {
            let houses = load_houses(&db_tx).await?;
            let (logs, unreadable) = load_logs(&db_tx, from, to).await?;
            Ok::<_, EngineError>((houses, logs, unreadable))
        })
    }

    /// Farm-wide and per-house production for `date`.
    pub async fn daily_summary(&self, date: NaiveDate) -> ResultEngine<DailySummary> {
        let (houses, logs, unreadable) = self.production_rows(date, date).await?;

        let mut summary = summarize_day(date, &logs, &houses);
        summary.note_unreadable(unreadable.values().sum());
        Ok(summary)
    }

    /// One daily summary per day in `[from, to]` plus period totals.
    ///
    /// The range may cover at most [`MAX_PERIOD_DAYS`] days.
    pub async fn period_summary(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ResultEngine<PeriodSummary> {
        validate_range(from, to)?;
        let (houses, logs, unreadable) = self.production_rows(from, to).await?;

        let mut period = summarize_period(from, to, &logs, &houses);
        for (date, count) in unreadable {
            if let Some(day) = period.days.iter_mut().find(|d| d.date == date) {
                day.note_unreadable(count);
                period.skipped_logs += count;
            }
        }
        Ok(period)
    }

    /// A single batch as seen by `role`.
    pub async fn batch_report(&self, id: Uuid, role: Role) -> ResultEngine<BatchReport> {
        let batch = self.batch(id).await?;
        Ok(BatchReport::for_role(batch, role))
    }

    /// Batches matching `filter` as seen by `role`.
    pub async fn batch_reports(
        &self,
        filter: &BatchListFilter,
        role: Role,
    ) -> ResultEngine<Vec<BatchReport>> {
        let batches = self.list_batches(filter).await?;
        Ok(batches
            .into_iter()
            .map(|batch| BatchReport::for_role(batch, role))
            .collect())
    }
}
