use crate::food::api::usda::FoodNutrient;
use serde::{Deserialize, Serialize};

// USDA nutrient ids
pub const NUTRIENT_ENERGY: u32 = 1008; // kcal
pub const NUTRIENT_PROTEIN: u32 = 1003; // g
pub const NUTRIENT_CARBS: u32 = 1005; // g
pub const NUTRIENT_FAT: u32 = 1004; // g

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbohydrate: Option<f64>,
    pub fat: Option<f64>,
}

impl NutritionFacts {
    /// Starting point for a summed estimate.
    pub fn zero() -> Self {
        Self {
            calories: Some(0.0),
            protein: Some(0.0),
            carbohydrate: Some(0.0),
            fat: Some(0.0),
        }
    }

    pub fn from_nutrients(nutrients: &[FoodNutrient]) -> Self {
        let mut facts = Self::default();
        for nutrient in nutrients {
            let (Some(id), Some(value)) = (nutrient.nutrient_id, nutrient.value) else {
                continue;
            };
            match id {
                NUTRIENT_ENERGY => facts.calories = Some(value),
                NUTRIENT_PROTEIN => facts.protein = Some(value),
                NUTRIENT_CARBS => facts.carbohydrate = Some(value),
                NUTRIENT_FAT => facts.fat = Some(value),
                _ => {}
            }
        }
        facts
    }

    /// Adds the present values of `other`.
    pub fn accumulate(&mut self, other: &NutritionFacts) {
        fn add(total: &mut Option<f64>, value: Option<f64>) {
            if let Some(v) = value {
                *total = Some(total.unwrap_or(0.0) + v);
            }
        }
        add(&mut self.calories, other.calories);
        add(&mut self.protein, other.protein);
        add(&mut self.carbohydrate, other.carbohydrate);
        add(&mut self.fat, other.fat);
    }

    /// True when neither calories nor protein were found.
    pub fn is_empty_estimate(&self) -> bool {
        self.calories.unwrap_or(0.0) == 0.0 && self.protein.unwrap_or(0.0) == 0.0
    }

    pub fn summary_line(&self) -> String {
        format!(
            "{} kcal, {} g protein, {} g carbs, {} g fat",
            format_amount(self.calories),
            format_amount(self.protein),
            format_amount(self.carbohydrate),
            format_amount(self.fat),
        )
    }
}

/// One decimal place, or "—" when absent.
pub fn format_amount(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.1}", v),
        None => "—".to_string(),
    }
}
