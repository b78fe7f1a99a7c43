//! Daily log aggregation.
//!
//! The aggregator is a pure function of its inputs: no I/O, no cache, no
//! memory of previous calls. Summaries are total over the house list (every
//! house gets an entry, with zeros when it was not logged) and independent of
//! the order of the logs.
//!
//! Rows are never allowed to abort a report. A row is skipped, and counted in
//! `skipped_logs`, when it carries a negative count or feed quantity, or when
//! it references a house missing from the house list.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{DailyLog, House};

/// Production of one house on one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseProduction {
    pub house_id: String,
    pub house_name: String,
    pub eggs: i64,
    pub feed_kg: Decimal,
    pub mortality: i64,
}

impl HouseProduction {
    fn empty(house: &House) -> Self {
        Self {
            house_id: house.id.clone(),
            house_name: house.name.clone(),
            eggs: 0,
            feed_kg: Decimal::ZERO,
            mortality: 0,
        }
    }

    fn add(&mut self, log: &DailyLog) {
        self.eggs = self.eggs.saturating_add(log.eggs());
        self.feed_kg = self.feed_kg.saturating_add(log.feed_consumed_kg);
        self.mortality = self.mortality.saturating_add(log.mortality_count);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_eggs: i64,
    pub houses_logged: usize,
    pub total_houses: usize,
    /// One entry per known house, in house-list order.
    pub per_house: Vec<HouseProduction>,
    pub total_feed_kg: Decimal,
    pub total_mortality: i64,
    /// Rows excluded from the sums.
    pub skipped_logs: usize,
    /// Rows whose grades disagree with their authoritative `eggs_total`.
    pub grade_mismatches: usize,
}

impl DailySummary {
    /// Count rows that could not even be read as logs.
    pub fn note_unreadable(&mut self, count: usize) {
        self.skipped_logs += count;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// One summary per calendar day in `[from, to]`.
    pub days: Vec<DailySummary>,
    pub total_eggs: i64,
    pub total_feed_kg: Decimal,
    pub total_mortality: i64,
    pub skipped_logs: usize,
}

/// Summarize the logs dated `date`; other dates are ignored.
pub fn summarize_day(date: NaiveDate, logs: &[DailyLog], houses: &[House]) -> DailySummary {
    summarize_rows(date, logs.iter().filter(|log| log.log_date == date), houses)
}

/// Summarize every day in `[from, to]`. An inverted range yields no days.
pub fn summarize_period(
    from: NaiveDate,
    to: NaiveDate,
    logs: &[DailyLog],
    houses: &[House],
) -> PeriodSummary {
    let mut by_date: BTreeMap<NaiveDate, Vec<&DailyLog>> = BTreeMap::new();
    for log in logs.iter().filter(|log| log.log_date >= from && log.log_date <= to) {
        by_date.entry(log.log_date).or_default().push(log);
    }

    let mut days = Vec::new();
    let mut day = Some(from);
    while let Some(date) = day.filter(|d| *d <= to) {
        let rows = by_date.remove(&date).unwrap_or_default();
        days.push(summarize_rows(date, rows, houses));
        day = date.succ_opt();
    }

    let mut period = PeriodSummary {
        from,
        to,
        days: Vec::new(),
        total_eggs: 0,
        total_feed_kg: Decimal::ZERO,
        total_mortality: 0,
        skipped_logs: 0,
    };
    for summary in &days {
        period.total_eggs = period.total_eggs.saturating_add(summary.total_eggs);
        period.total_feed_kg = period.total_feed_kg.saturating_add(summary.total_feed_kg);
        period.total_mortality = period.total_mortality.saturating_add(summary.total_mortality);
        period.skipped_logs += summary.skipped_logs;
    }
    period.days = days;
    period
}

fn summarize_rows<'a, I>(date: NaiveDate, rows: I, houses: &[House]) -> DailySummary
where
    I: IntoIterator<Item = &'a DailyLog>,
{
    let mut per_house: Vec<HouseProduction> = Vec::with_capacity(houses.len());
    let mut slots: HashMap<&str, usize> = HashMap::with_capacity(houses.len());
    for house in houses {
        if !slots.contains_key(house.id.as_str()) {
            slots.insert(house.id.as_str(), per_house.len());
            per_house.push(HouseProduction::empty(house));
        }
    }

    let mut logged: HashSet<&str> = HashSet::new();
    let mut skipped_logs = 0;
    let mut grade_mismatches = 0;
    for log in rows {
        let slot = slots.get(log.house_id.as_str()).copied();
        let Some(slot) = slot.filter(|_| log.is_well_formed()) else {
            tracing::warn!(
                log_id = %log.id,
                house_id = %log.house_id,
                %date,
                "skipping malformed daily log"
            );
            skipped_logs += 1;
            continue;
        };
        if log.grades_disagree() {
            grade_mismatches += 1;
        }
        logged.insert(log.house_id.as_str());
        per_house[slot].add(log);
    }

    let total_eggs = per_house
        .iter()
        .fold(0i64, |acc, h| acc.saturating_add(h.eggs));
    let total_feed_kg = per_house
        .iter()
        .fold(Decimal::ZERO, |acc, h| acc.saturating_add(h.feed_kg));
    let total_mortality = per_house
        .iter()
        .fold(0i64, |acc, h| acc.saturating_add(h.mortality));

    DailySummary {
        date,
        total_eggs,
        houses_logged: logged.len(),
        total_houses: per_house.len(),
        per_house,
        total_feed_kg,
        total_mortality,
        skipped_logs,
        grade_mismatches,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn may_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn houses() -> Vec<House> {
        vec![
            House::new("H1", "House 1"),
            House::new("H2", "House 2"),
            House::new("H3", "House 3"),
        ]
    }

    fn logs() -> Vec<DailyLog> {
        vec![
            DailyLog::new("a", may_first(), "H1").eggs_total(100),
            DailyLog::new("b", may_first(), "H1").eggs_total(150),
            DailyLog::new("c", may_first(), "H2").eggs_total(200),
        ]
    }

    fn eggs_by_house(summary: &DailySummary) -> Vec<(&str, i64)> {
        summary
            .per_house
            .iter()
            .map(|h| (h.house_id.as_str(), h.eggs))
            .collect()
    }

    #[test]
    fn sums_repeat_logs_and_fills_missing_houses() {
        let summary = summarize_day(may_first(), &logs(), &houses());

        assert_eq!(summary.total_eggs, 450);
        assert_eq!(summary.houses_logged, 2);
        assert_eq!(summary.total_houses, 3);
        assert_eq!(eggs_by_house(&summary), [("H1", 250), ("H2", 200), ("H3", 0)]);
        assert_eq!(summary.skipped_logs, 0);
    }

    #[test]
    fn other_dates_are_ignored() {
        let mut logs = logs();
        logs.push(DailyLog::new("d", may_first().succ_opt().unwrap(), "H3").eggs_total(999));

        let summary = summarize_day(may_first(), &logs, &houses());
        assert_eq!(summary.total_eggs, 450);
        assert_eq!(summary.houses_logged, 2);
    }

    #[test]
    fn order_of_logs_does_not_matter() {
        let logs = logs();
        let expected = summarize_day(may_first(), &logs, &houses());

        let mut reversed = logs.clone();
        reversed.reverse();
        assert_eq!(summarize_day(may_first(), &reversed, &houses()), expected);

        let mut rotated = logs.clone();
        rotated.rotate_left(1);
        assert_eq!(summarize_day(may_first(), &rotated, &houses()), expected);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let logs = logs();
        let first = summarize_day(may_first(), &logs, &houses());
        let second = summarize_day(may_first(), &logs, &houses());
        assert_eq!(first, second);
    }

    #[test]
    fn grade_sum_used_only_without_total() {
        let logs = vec![
            DailyLog::new("a", may_first(), "H1").grades(60, 30, 10),
            DailyLog::new("b", may_first(), "H2").eggs_total(80).grades(60, 30, 10),
        ];
        let summary = summarize_day(may_first(), &logs, &houses());

        assert_eq!(eggs_by_house(&summary), [("H1", 100), ("H2", 80), ("H3", 0)]);
        assert_eq!(summary.total_eggs, 180);
        assert_eq!(summary.grade_mismatches, 1);
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let mut logs = logs();
        logs.push(DailyLog::new("bad", may_first(), "H3").eggs_total(-5));
        logs.push(DailyLog::new("ghost", may_first(), "H9").eggs_total(40));

        let summary = summarize_day(may_first(), &logs, &houses());
        assert_eq!(summary.total_eggs, 450);
        assert_eq!(summary.houses_logged, 2);
        assert_eq!(summary.skipped_logs, 2);
        assert!(summary.houses_logged <= summary.total_houses);
    }

    #[test]
    fn feed_and_mortality_are_summed() {
        let logs = vec![
            DailyLog::new("a", may_first(), "H1")
                .eggs_total(10)
                .feed_consumed_kg(Decimal::new(125, 1))
                .mortality(1),
            DailyLog::new("b", may_first(), "H1")
                .eggs_total(10)
                .feed_consumed_kg(Decimal::new(75, 1))
                .mortality(2),
            DailyLog::new("c", may_first(), "H2").feed_consumed_kg(Decimal::from(30)),
        ];
        let summary = summarize_day(may_first(), &logs, &houses());

        assert_eq!(summary.per_house[0].feed_kg, Decimal::from(20));
        assert_eq!(summary.per_house[0].mortality, 3);
        assert_eq!(summary.total_feed_kg, Decimal::from(50));
        assert_eq!(summary.total_mortality, 3);
    }

    #[test]
    fn no_logs_yields_zeroed_houses() {
        let summary = summarize_day(may_first(), &[], &houses());
        assert_eq!(summary.total_eggs, 0);
        assert_eq!(summary.houses_logged, 0);
        assert_eq!(summary.total_houses, 3);
        assert!(summary.per_house.iter().all(|h| h.eggs == 0));
    }

    #[test]
    fn duplicate_houses_are_listed_once() {
        let mut houses = houses();
        houses.push(House::new("H1", "House 1 again"));
        let summary = summarize_day(may_first(), &logs(), &houses);
        assert_eq!(summary.total_houses, 3);
        assert_eq!(summary.per_house[0].house_name, "House 1");
    }

    #[test]
    fn period_covers_every_day() {
        let second = may_first().succ_opt().unwrap();
        let third = second.succ_opt().unwrap();
        let mut logs = logs();
        logs.push(DailyLog::new("d", third, "H3").eggs_total(70));
        logs.push(DailyLog::new("e", third, "H3").eggs_total(-1));

        let period = summarize_period(may_first(), third, &logs, &houses());

        let dates: Vec<NaiveDate> = period.days.iter().map(|d| d.date).collect();
        assert_eq!(dates, [may_first(), second, third]);
        assert_eq!(period.days[1].total_eggs, 0);
        assert_eq!(period.days[1].total_houses, 3);
        assert_eq!(period.days[2].total_eggs, 70);
        assert_eq!(period.total_eggs, 520);
        assert_eq!(period.skipped_logs, 1);
    }

    #[test]
    fn inverted_period_is_empty() {
        let period = summarize_period(may_first().succ_opt().unwrap(), may_first(), &logs(), &houses());
        assert!(period.days.is_empty());
        assert_eq!(period.total_eggs, 0);
    }
}
