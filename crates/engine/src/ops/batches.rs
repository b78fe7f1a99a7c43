use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, FeedBatch, IngredientLine, NewBatchCmd, ResultEngine, compute_batch_from_inputs,
    feed_batches, ingredients,
};

use super::{Engine, with_tx};

/// Filters for listing batches.
///
/// Both bounds are inclusive calendar dates (`[from, to]`).
#[derive(Clone, Debug, Default)]
pub struct BatchListFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl BatchListFilter {
    fn validate(&self) -> ResultEngine<()> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(EngineError::InvalidRange(format!(
                "from {from} is after to {to}"
            )));
        }
        Ok(())
    }
}

fn batch_not_found(id: Uuid) -> EngineError {
    EngineError::NotFound(format!("feed batch {id}"))
}

impl Engine {
    /// Validate the command and derive the batch without persisting it.
    pub fn compute_batch(&self, cmd: &NewBatchCmd) -> ResultEngine<FeedBatch> {
        compute_batch_from_inputs(
            &cmd.batch_name,
            cmd.batch_date,
            cmd.bag_size_kg.unwrap_or(self.default_bag_size_kg),
            &cmd.ingredients,
        )
    }

    /// Create a batch: header and every ingredient line are committed
    /// together or not at all.
    pub async fn create_batch(&self, cmd: NewBatchCmd) -> ResultEngine<FeedBatch> {
        let batch = self.compute_batch(&cmd)?;

        let db_tx = self.database.begin().await?;
        insert_batch(&db_tx, &batch, 0, Utc::now()).await?;
        db_tx.commit().await?;

        tracing::info!(
            batch_id = %batch.id,
            batch = %batch.batch_name,
            lines = batch.lines.len(),
            "created feed batch"
        );
        Ok(batch)
    }

    /// Replace a batch: the old header and lines are deleted and the new ones
    /// inserted under the same id, inside one transaction.
    ///
    /// If another writer replaced or deleted the batch in the meantime this
    /// fails with `ConstraintViolation` and nothing is written.
    pub async fn replace_batch(&self, id: Uuid, cmd: NewBatchCmd) -> ResultEngine<FeedBatch> {
        let mut batch = self.compute_batch(&cmd)?;
        batch.id = id;

        let db_tx = self.database.begin().await?;
        let existing = feed_batches::Entity::find_by_id(id.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| batch_not_found(id))?;
        delete_batch_rows(&db_tx, id, existing.revision).await?;
        insert_batch(&db_tx, &batch, existing.revision + 1, existing.created_at).await?;
        db_tx.commit().await?;

        tracing::info!(
            batch_id = %id,
            batch = %batch.batch_name,
            revision = existing.revision + 1,
            "replaced feed batch"
        );
        Ok(batch)
    }

    /// Delete a batch and its ingredient lines.
    pub async fn delete_batch(&self, id: Uuid) -> ResultEngine<()> {
        let db_tx = self.database.begin().await?;
        let existing = feed_batches::Entity::find_by_id(id.to_string())
            .one(&db_tx)
            .await?
            .ok_or_else(|| batch_not_found(id))?;
        delete_batch_rows(&db_tx, id, existing.revision).await?;
        db_tx.commit().await?;

        tracing::info!(batch_id = %id, "deleted feed batch");
        Ok(())
    }

    /// Return a batch with its lines in insertion order.
    pub async fn batch(&self, id: Uuid) -> ResultEngine<FeedBatch> {
        with_tx!(self, |db_tx| {
            let model = feed_batches::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| batch_not_found(id))?;
            let lines = ingredients::Entity::find()
                .filter(ingredients::Column::BatchId.eq(id.to_string()))
                .order_by_asc(ingredients::Column::Position)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(IngredientLine::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            FeedBatch::try_from((model, lines))
        })
    }

    /// List batches ordered by date then name.
    pub async fn list_batches(&self, filter: &BatchListFilter) -> ResultEngine<Vec<FeedBatch>> {
        filter.validate()?;
        with_tx!(self, |db_tx| {
            let mut query = feed_batches::Entity::find();
            if let Some(from) = filter.from {
                query = query.filter(feed_batches::Column::BatchDate.gte(from));
            }
            if let Some(to) = filter.to {
                query = query.filter(feed_batches::Column::BatchDate.lte(to));
            }
            let headers = query
                .order_by_asc(feed_batches::Column::BatchDate)
                .order_by_asc(feed_batches::Column::BatchName)
                .order_by_asc(feed_batches::Column::Id)
                .all(&db_tx)
                .await?;

            let ids: Vec<String> = headers.iter().map(|h| h.id.clone()).collect();
            let mut lines_by_batch: HashMap<String, Vec<IngredientLine>> = HashMap::new();
            let line_models = ingredients::Entity::find()
                .filter(ingredients::Column::BatchId.is_in(ids))
                .order_by_asc(ingredients::Column::BatchId)
                .order_by_asc(ingredients::Column::Position)
                .all(&db_tx)
                .await?;
            for model in line_models {
                let batch_id = model.batch_id.clone();
                lines_by_batch
                    .entry(batch_id)
                    .or_default()
                    .push(IngredientLine::try_from(model)?);
            }

            headers
                .into_iter()
                .map(|header| {
                    let lines = lines_by_batch.remove(&header.id).unwrap_or_default();
                    FeedBatch::try_from((header, lines))
                })
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}

async fn insert_batch(
    db_tx: &DatabaseTransaction,
    batch: &FeedBatch,
    revision: i64,
    created_at: DateTime<Utc>,
) -> ResultEngine<()> {
    feed_batches::ActiveModel::from((batch, revision, created_at))
        .insert(db_tx)
        .await?;
    for (position, line) in batch.lines.iter().enumerate() {
        ingredients::ActiveModel::from((batch.id, position, line))
            .insert(db_tx)
            .await?;
    }
    Ok(())
}

/// Delete lines and header of `id`, provided the header is still at
/// `revision`.
async fn delete_batch_rows(
    db_tx: &DatabaseTransaction,
    id: Uuid,
    revision: i64,
) -> ResultEngine<()> {
    ingredients::Entity::delete_many()
        .filter(ingredients::Column::BatchId.eq(id.to_string()))
        .exec(db_tx)
        .await?;
    let deleted = feed_batches::Entity::delete_many()
        .filter(feed_batches::Column::Id.eq(id.to_string()))
        .filter(feed_batches::Column::Revision.eq(revision))
        .exec(db_tx)
        .await?;
    if deleted.rows_affected != 1 {
        return Err(EngineError::ConstraintViolation(format!(
            "feed batch {id} changed concurrently (expected revision {revision})"
        )));
    }
    Ok(())
}
