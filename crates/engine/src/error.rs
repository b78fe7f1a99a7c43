//! The module contains the error the engine can throw.
//!
//! Validation and derivation failures ([`InvalidIngredient`], [`EmptyBatch`],
//! [`InvalidBagSize`], [`ZeroBags`]) are always reported to the caller and
//! never corrected. [`NotFound`] is thrown for unknown ids and
//! [`ConstraintViolation`] when the database rejects an atomic unit, e.g. a
//! batch replaced or deleted concurrently. Callers re-issue the operation.
//!
//!  [`InvalidIngredient`]: EngineError::InvalidIngredient
//!  [`EmptyBatch`]: EngineError::EmptyBatch
//!  [`InvalidBagSize`]: EngineError::InvalidBagSize
//!  [`ZeroBags`]: EngineError::ZeroBags
//!  [`NotFound`]: EngineError::NotFound
//!  [`ConstraintViolation`]: EngineError::ConstraintViolation
use rust_decimal::Decimal;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A single ingredient line is invalid. `index` is the position of the
    /// line in the submitted list (0-based).
    #[error("invalid ingredients[{index}].{field}: {reason}")]
    InvalidIngredient {
        index: usize,
        field: &'static str,
        reason: String,
    },
    #[error("invalid batch \"{batch}\": {field} {reason}")]
    InvalidBatch {
        batch: String,
        field: &'static str,
        reason: String,
    },
    #[error("batch \"{0}\" has no ingredients")]
    EmptyBatch(String),
    #[error("invalid bagSizeKg for batch \"{batch}\": {reason}")]
    InvalidBagSize { batch: String, reason: String },
    #[error(
        "batch \"{batch}\" yields zero bags: {total_quantity_kg} kg at {bag_size_kg} kg per bag"
    )]
    ZeroBags {
        batch: String,
        total_quantity_kg: Decimal,
        bag_size_kg: Decimal,
    },
    #[error("division undefined: {0}")]
    DivisionUndefined(String),
    #[error("\"{0}\" not found!")]
    NotFound(String),
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("invalid stored value: {0}")]
    InvalidStoredValue(String),
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error(transparent)]
    Database(DbErr),
}

impl From<DbErr> for EngineError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::ConstraintViolation(msg),
            _ if is_write_conflict(&err) => Self::ConstraintViolation(err.to_string()),
            _ => Self::Database(err),
        }
    }
}

/// SQLite reports a competing writer as a locked database.
fn is_write_conflict(err: &DbErr) -> bool {
    let msg = err.to_string();
    msg.contains("database is locked") || msg.contains("database table is locked")
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::InvalidIngredient {
                    index: a_index,
                    field: a_field,
                    reason: a_reason,
                },
                Self::InvalidIngredient {
                    index: b_index,
                    field: b_field,
                    reason: b_reason,
                },
            ) => a_index == b_index && a_field == b_field && a_reason == b_reason,
            (
                Self::InvalidBatch {
                    batch: a_batch,
                    field: a_field,
                    reason: a_reason,
                },
                Self::InvalidBatch {
                    batch: b_batch,
                    field: b_field,
                    reason: b_reason,
                },
            ) => a_batch == b_batch && a_field == b_field && a_reason == b_reason,
            (Self::EmptyBatch(a), Self::EmptyBatch(b)) => a == b,
            (
                Self::InvalidBagSize {
                    batch: a_batch,
                    reason: a_reason,
                },
                Self::InvalidBagSize {
                    batch: b_batch,
                    reason: b_reason,
                },
            ) => a_batch == b_batch && a_reason == b_reason,
            (
                Self::ZeroBags {
                    batch: a_batch,
                    total_quantity_kg: a_qty,
                    bag_size_kg: a_bag,
                },
                Self::ZeroBags {
                    batch: b_batch,
                    total_quantity_kg: b_qty,
                    bag_size_kg: b_bag,
                },
            ) => a_batch == b_batch && a_qty == b_qty && a_bag == b_bag,
            (Self::DivisionUndefined(a), Self::DivisionUndefined(b)) => a == b,
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::ConstraintViolation(a), Self::ConstraintViolation(b)) => a == b,
            (Self::InvalidRange(a), Self::InvalidRange(b)) => a == b,
            (Self::InvalidId(a), Self::InvalidId(b)) => a == b,
            (Self::InvalidStoredValue(a), Self::InvalidStoredValue(b)) => a == b,
            (Self::InvalidRole(a), Self::InvalidRole(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingredient_error_names_line_and_field() {
        let err = EngineError::InvalidIngredient {
            index: 2,
            field: "quantityKg",
            reason: "must be > 0".to_string(),
        };
        assert_eq!(err.to_string(), "invalid ingredients[2].quantityKg: must be > 0");
    }

    #[test]
    fn zero_bags_names_batch_and_sizes() {
        let err = EngineError::ZeroBags {
            batch: "Layer mash".to_string(),
            total_quantity_kg: Decimal::from(10),
            bag_size_kg: Decimal::from(50),
        };
        assert_eq!(
            err.to_string(),
            "batch \"Layer mash\" yields zero bags: 10 kg at 50 kg per bag"
        );
    }

    #[test]
    fn locked_database_is_a_constraint_violation() {
        let err = EngineError::from(DbErr::Custom("database is locked".to_string()));
        assert!(matches!(err, EngineError::ConstraintViolation(_)));
    }

    #[test]
    fn plain_db_errors_stay_database_errors() {
        let err = EngineError::from(DbErr::Custom("boom".to_string()));
        assert_eq!(err, EngineError::Database(DbErr::Custom("boom".to_string())));
    }
}
