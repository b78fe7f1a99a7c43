//! JSON shapes exchanged with the operator CLI and the existing dashboards.
//!
//! Field names are camelCase. Decimal values travel as strings so that no
//! precision is lost on the way.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod feed_batch {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IngredientNew {
        pub ingredient_name: String,
        pub quantity_kg: Decimal,
        pub total_cost: Decimal,
        #[serde(default)]
        pub supplier: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FeedBatchNew {
        pub batch_name: String,
        pub batch_date: NaiveDate,
        /// Bag size in kg. Falls back to the configured default (50 kg).
        #[serde(default)]
        pub bag_size_kg: Option<Decimal>,
        pub ingredients: Vec<IngredientNew>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IngredientView {
        pub ingredient_name: String,
        pub quantity_kg: Decimal,
        pub supplier: Option<String>,
        /// Absent for roles that cannot see costs.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub total_cost: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub cost_per_kg: Option<Decimal>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FeedBatchView {
        /// Absent for a batch that was only computed, never stored.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub id: Option<Uuid>,
        pub batch_name: String,
        pub batch_date: NaiveDate,
        pub bag_size_kg: Decimal,
        pub total_quantity_kg: Decimal,
        pub total_quantity_tons: Decimal,
        pub total_bags: i64,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub total_cost: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub cost_per_bag: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub cost_per_kg: Option<Decimal>,
        pub ingredients: Vec<IngredientView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FeedBatchDeleted {
        pub id: Uuid,
    }
}

pub mod summary {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct HouseBreakdown {
        pub house_id: String,
        pub house_name: String,
        pub eggs: i64,
        pub feed_kg: Decimal,
        pub mortality: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DailySummaryView {
        pub date: NaiveDate,
        pub total_eggs: i64,
        pub houses_logged: usize,
        pub total_houses: usize,
        pub house_breakdown: Vec<HouseBreakdown>,
        pub total_feed_kg: Decimal,
        pub total_mortality: i64,
        pub skipped_logs: usize,
        pub grade_mismatches: usize,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PeriodSummaryView {
        pub from: NaiveDate,
        pub to: NaiveDate,
        pub days: Vec<DailySummaryView>,
        pub total_eggs: i64,
        pub total_feed_kg: Decimal,
        pub total_mortality: i64,
        pub skipped_logs: usize,
    }
}

#[cfg(test)]
mod tests {
    use super::feed_batch::*;
    use rust_decimal::Decimal;

    #[test]
    fn batch_input_uses_compatibility_names() {
        let raw = r#"{
            "batchName": "Layer mash",
            "batchDate": "2024-05-01",
            "ingredients": [
                { "ingredientName": "Maize", "quantityKg": "500", "totalCost": "25000" }
            ]
        }"#;
        let batch: FeedBatchNew = serde_json::from_str(raw).unwrap();

        assert_eq!(batch.batch_name, "Layer mash");
        assert!(batch.bag_size_kg.is_none());
        assert_eq!(batch.ingredients.len(), 1);
        assert!(batch.ingredients[0].supplier.is_none());
    }

    #[test]
    fn hidden_costs_are_omitted() {
        let view = IngredientView {
            ingredient_name: "Maize".to_string(),
            quantity_kg: Decimal::from(500),
            supplier: None,
            total_cost: None,
            cost_per_kg: None,
        };
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["ingredientName"], "Maize");
        assert!(json.get("totalCost").is_none());
        assert!(json.get("costPerKg").is_none());
    }
}
