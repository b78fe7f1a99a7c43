use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use crate::{DEFAULT_BAG_SIZE_KG, EngineError, ResultEngine};

mod batches;
mod reports;

pub use batches::BatchListFilter;
pub use reports::{BatchCosts, BatchReport, IngredientReport, MAX_PERIOD_DAYS};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    default_bag_size_kg: Decimal,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    default_bag_size_kg: Decimal,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            default_bag_size_kg: DEFAULT_BAG_SIZE_KG,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Override the default bag size (50 kg).
    pub fn default_bag_size_kg(mut self, bag_size_kg: Decimal) -> EngineBuilder {
        self.default_bag_size_kg = bag_size_kg;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        if self.default_bag_size_kg <= Decimal::ZERO {
            return Err(EngineError::InvalidBagSize {
                batch: "<default>".to_string(),
                reason: format!("must be > 0, got {}", self.default_bag_size_kg),
            });
        }
        Ok(Engine {
            database: self.database,
            default_bag_size_kg: self.default_bag_size_kg,
        })
    }
}
