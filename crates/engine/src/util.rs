//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! decimal rounding and storage parsing so the engine enforces consistent
//! invariants.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Decimal places kept on derived per-unit values (cost per kg, cost per bag).
pub(crate) const DERIVED_SCALE: u32 = 4;

/// Round a derived value half-up to [`DERIVED_SCALE`] places.
pub(crate) fn round_derived(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DERIVED_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Sum decimals, failing instead of panicking on overflow.
pub(crate) fn checked_sum<I>(values: I) -> Option<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(value))
}

/// Trim and NFC-normalize a free-text name. Casing is left untouched.
pub(crate) fn normalize_text(value: &str) -> String {
    value.trim().nfc().collect()
}

/// Normalize optional free text; blank input becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value.map(normalize_text).filter(|s| !s.is_empty())
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Parse a decimal stored as TEXT and return a labeled error on failure.
pub(crate) fn parse_decimal(value: &str, label: &str) -> ResultEngine<Decimal> {
    Decimal::from_str(value)
        .map_err(|_| EngineError::InvalidStoredValue(format!("invalid {label}: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_derived_is_half_up() {
        assert_eq!(
            round_derived(Decimal::new(123_455, 5)),
            Decimal::new(12_346, 4)
        );
        assert_eq!(
            round_derived(Decimal::new(123_454, 5)),
            Decimal::new(12_345, 4)
        );
    }

    #[test]
    fn checked_sum_is_exact() {
        let values = [Decimal::new(1, 1), Decimal::new(2, 1), Decimal::new(3, 1)];
        assert_eq!(checked_sum(values), Some(Decimal::new(6, 1)));
        assert_eq!(checked_sum([Decimal::MAX, Decimal::ONE]), None);
    }

    #[test]
    fn normalize_keeps_case() {
        assert_eq!(normalize_text("  Maize Bran "), "Maize Bran");
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(
            normalize_optional_text(Some(" AgroMills ")),
            Some("AgroMills".to_string())
        );
    }

    #[test]
    fn parse_decimal_labels_errors() {
        assert_eq!(parse_decimal("57.5", "cost").unwrap(), Decimal::new(575, 1));
        assert_eq!(
            parse_decimal("abc", "cost"),
            Err(EngineError::InvalidStoredValue("invalid cost: abc".to_string()))
        );
    }
}
