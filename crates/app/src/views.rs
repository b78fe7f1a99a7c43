//! Conversions between engine types and the JSON shapes in `api_types`.

use api_types::{
    feed_batch::{FeedBatchNew, FeedBatchView, IngredientView},
    summary::{DailySummaryView, HouseBreakdown, PeriodSummaryView},
};
use engine::{BatchReport, DailySummary, IngredientInput, NewBatchCmd, PeriodSummary};

pub fn batch_cmd(new: FeedBatchNew) -> NewBatchCmd {
    let ingredients: Vec<IngredientInput> = new
        .ingredients
        .into_iter()
        .map(|line| {
            let input = IngredientInput::new(line.ingredient_name, line.quantity_kg, line.total_cost);
            match line.supplier {
                Some(supplier) => input.supplier(supplier),
                None => input,
            }
        })
        .collect();

    let cmd = NewBatchCmd::new(new.batch_name, new.batch_date).ingredients(ingredients);
    match new.bag_size_kg {
        Some(bag_size_kg) => cmd.bag_size_kg(bag_size_kg),
        None => cmd,
    }
}

/// `stored` is false for batches that were only computed.
pub fn batch_view(report: BatchReport, stored: bool) -> FeedBatchView {
    let ingredients = report
        .ingredients
        .into_iter()
        .map(|line| IngredientView {
            ingredient_name: line.name,
            quantity_kg: line.quantity_kg,
            supplier: line.supplier,
            total_cost: line.total_cost,
            cost_per_kg: line.cost_per_kg,
        })
        .collect();
    let costs = report.costs;

    FeedBatchView {
        id: stored.then_some(report.id),
        batch_name: report.batch_name,
        batch_date: report.batch_date,
        bag_size_kg: report.bag_size_kg,
        total_quantity_kg: report.total_quantity_kg,
        total_quantity_tons: report.total_quantity_tons,
        total_bags: report.total_bags,
        total_cost: costs.as_ref().map(|c| c.total_cost),
        cost_per_bag: costs.as_ref().map(|c| c.cost_per_bag),
        cost_per_kg: costs.as_ref().map(|c| c.cost_per_kg),
        ingredients,
    }
}

pub fn daily_view(summary: DailySummary) -> DailySummaryView {
    DailySummaryView {
        date: summary.date,
        total_eggs: summary.total_eggs,
        houses_logged: summary.houses_logged,
        total_houses: summary.total_houses,
        house_breakdown: summary
            .per_house
            .into_iter()
            .map(|house| HouseBreakdown {
                house_id: house.house_id,
                house_name: house.house_name,
                eggs: house.eggs,
                feed_kg: house.feed_kg,
                mortality: house.mortality,
            })
            .collect(),
        total_feed_kg: summary.total_feed_kg,
        total_mortality: summary.total_mortality,
        skipped_logs: summary.skipped_logs,
        grade_mismatches: summary.grade_mismatches,
    }
}

pub fn period_view(period: PeriodSummary) -> PeriodSummaryView {
    PeriodSummaryView {
        from: period.from,
        to: period.to,
        days: period.days.into_iter().map(daily_view).collect(),
        total_eggs: period.total_eggs,
        total_feed_kg: period.total_feed_kg,
        total_mortality: period.total_mortality,
        skipped_logs: period.skipped_logs,
    }
}
