//! Daily production logs.
//!
//! A [`DailyLog`] is one house's egg/feed/mortality record for one calendar
//! date. Rows are written by the logging collaborator; the engine reads them
//! and never trusts them blindly (see [`DailyLog::is_well_formed`]).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::EngineError;
use crate::util::parse_decimal;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    pub id: String,
    pub log_date: NaiveDate,
    pub house_id: String,
    /// Authoritative egg count when present.
    pub eggs_total: Option<i64>,
    pub eggs_grade_a: Option<i64>,
    pub eggs_grade_b: Option<i64>,
    pub eggs_grade_c: Option<i64>,
    pub feed_consumed_kg: Decimal,
    pub mortality_count: i64,
    pub notes: Option<String>,
}

impl DailyLog {
    #[must_use]
    pub fn new(id: impl Into<String>, log_date: NaiveDate, house_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            log_date,
            house_id: house_id.into(),
            eggs_total: None,
            eggs_grade_a: None,
            eggs_grade_b: None,
            eggs_grade_c: None,
            feed_consumed_kg: Decimal::ZERO,
            mortality_count: 0,
            notes: None,
        }
    }

    #[must_use]
    pub fn eggs_total(mut self, eggs: i64) -> Self {
        self.eggs_total = Some(eggs);
        self
    }

    #[must_use]
    pub fn grades(mut self, a: i64, b: i64, c: i64) -> Self {
        self.eggs_grade_a = Some(a);
        self.eggs_grade_b = Some(b);
        self.eggs_grade_c = Some(c);
        self
    }

    #[must_use]
    pub fn feed_consumed_kg(mut self, kg: Decimal) -> Self {
        self.feed_consumed_kg = kg;
        self
    }

    #[must_use]
    pub fn mortality(mut self, count: i64) -> Self {
        self.mortality_count = count;
        self
    }

    fn counts(&self) -> impl Iterator<Item = i64> + '_ {
        [
            self.eggs_total,
            self.eggs_grade_a,
            self.eggs_grade_b,
            self.eggs_grade_c,
            Some(self.mortality_count),
        ]
        .into_iter()
        .flatten()
    }

    /// `false` when any count or the feed quantity is negative.
    pub fn is_well_formed(&self) -> bool {
        self.counts().all(|c| c >= 0) && self.feed_consumed_kg >= Decimal::ZERO
    }

    /// Sum of the grades that are present, `None` if no grade is.
    pub fn grade_sum(&self) -> Option<i64> {
        let grades = [self.eggs_grade_a, self.eggs_grade_b, self.eggs_grade_c];
        grades
            .iter()
            .any(Option::is_some)
            .then(|| grades.iter().flatten().fold(0i64, |acc, g| acc.saturating_add(*g)))
    }

    /// Eggs collected: `eggs_total` if set, the grade sum otherwise.
    pub fn eggs(&self) -> i64 {
        self.eggs_total
            .or_else(|| self.grade_sum())
            .unwrap_or_default()
    }

    /// `true` when all grades and `eggs_total` are set but disagree.
    pub fn grades_disagree(&self) -> bool {
        let all_grades = self.eggs_grade_a.is_some()
            && self.eggs_grade_b.is_some()
            && self.eggs_grade_c.is_some();
        match (self.eggs_total, self.grade_sum()) {
            (Some(total), Some(sum)) if all_grades => total != sum,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "daily_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub log_date: Date,
    pub house_id: String,
    pub eggs_total: Option<i64>,
    pub eggs_grade_a: Option<i64>,
    pub eggs_grade_b: Option<i64>,
    pub eggs_grade_c: Option<i64>,
    pub feed_consumed_kg: String,
    pub mortality_count: i64,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::houses::Entity",
        from = "Column::HouseId",
        to = "super::houses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Houses,
}

impl Related<super::houses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Houses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for DailyLog {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            feed_consumed_kg: parse_decimal(&model.feed_consumed_kg, "feed_consumed_kg")?,
            id: model.id,
            log_date: model.log_date,
            house_id: model.house_id,
            eggs_total: model.eggs_total,
            eggs_grade_a: model.eggs_grade_a,
            eggs_grade_b: model.eggs_grade_b,
            eggs_grade_c: model.eggs_grade_c,
            mortality_count: model.mortality_count,
            notes: model.notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log() -> DailyLog {
        DailyLog::new("l1", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), "H1")
    }

    #[test]
    fn eggs_total_wins_over_grades() {
        let log = log().eggs_total(100).grades(50, 30, 10);
        assert_eq!(log.eggs(), 100);
        assert!(log.grades_disagree());
    }

    #[test]
    fn grades_fill_in_missing_total() {
        let graded = log().grades(50, 30, 10);
        assert_eq!(graded.eggs(), 90);
        assert!(!graded.grades_disagree());

        let mut partial = log();
        partial.eggs_grade_a = Some(40);
        assert_eq!(partial.eggs(), 40);
    }

    #[test]
    fn no_counts_means_zero_eggs() {
        assert_eq!(log().eggs(), 0);
    }

    #[test]
    fn negative_values_are_malformed() {
        assert!(log().eggs_total(10).is_well_formed());
        assert!(!log().eggs_total(-1).is_well_formed());
        assert!(!log().grades(1, -2, 3).is_well_formed());
        assert!(!log().mortality(-1).is_well_formed());
        assert!(!log().feed_consumed_kg(Decimal::from(-3)).is_well_formed());
    }
}
