use crate::food::analysis::nutrition::{format_amount, NutritionFacts};
use crate::food::api::safe_float;
use crate::food::error::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Characters of description kept in the recipe table.
pub const DESCRIPTION_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NutritionSource {
    /// Values estimated by the text generator.
    Ai,
    Usda,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub recipe_id: String,
    pub recipe_name: String,
    pub recipe_description: String,
    pub calories: Option<f64>,
    pub protein_g: Option<f64>,
    pub carbs_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub ingredients: Vec<String>,
    pub nutrition_source: NutritionSource,
}

impl Recipe {
    /// Names looked up for a nutrition estimate. Falls back to the recipe
    /// name when no ingredients are known.
    pub fn lookup_terms(&self) -> Vec<String> {
        if self.ingredients.is_empty() {
            vec![self.recipe_name.clone()]
        } else {
            self.ingredients.clone()
        }
    }

    pub fn apply_nutrition(&mut self, facts: &NutritionFacts) {
        self.calories = facts.calories;
        self.protein_g = facts.protein;
        self.carbs_g = facts.carbohydrate;
        self.fat_g = facts.fat;
        self.nutrition_source = NutritionSource::Usda;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeRow {
    pub recipe: String,
    pub calories: String,
    pub protein: String,
    pub carbs: String,
    pub fat: String,
    pub description: String,
}

pub const RECIPE_COLUMNS: [&str; 6] = ["Recipe", "Calories", "Protein (g)", "Carbs (g)", "Fat (g)", "Description"];

impl RecipeRow {
    pub fn cells(&self) -> [&str; 6] {
        [
            self.recipe.as_str(),
            self.calories.as_str(),
            self.protein.as_str(),
            self.carbs.as_str(),
            self.fat.as_str(),
            self.description.as_str(),
        ]
    }
}

impl From<&Recipe> for RecipeRow {
    fn from(recipe: &Recipe) -> Self {
        let name = if recipe.recipe_name.is_empty() {
            "—".to_string()
        } else {
            recipe.recipe_name.clone()
        };
        Self {
            recipe: name,
            calories: format_amount(recipe.calories),
            protein: format_amount(recipe.protein_g),
            carbs: format_amount(recipe.carbs_g),
            fat: format_amount(recipe.fat_g),
            description: truncate(&recipe.recipe_description, DESCRIPTION_WIDTH),
        }
    }
}

pub fn recipes_to_table_rows(recipes: &[Recipe]) -> Vec<RecipeRow> {
    recipes.iter().map(RecipeRow::from).collect()
}

/// Keeps the first `max_len` characters, appending "..." when cut.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut cut: String = s.chars().take(max_len).collect();
    cut.push_str("...");
    cut
}

/// Parses the JSON recipe list out of a model reply. The reply may wrap the
/// object in prose or code fences; the outermost `{...}` span is used.
pub fn parse_recipes_json(text: &str) -> Result<Vec<Recipe>, FetchError> {
    let text = text.trim();
    let json_text = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    };

    let data: Value =
        serde_json::from_str(json_text).map_err(|_| FetchError::Generation("JSON Parse Error.".to_string()))?;

    let raw = match data.get("recipes") {
        Some(Value::Array(items)) => items.clone(),
        Some(obj @ Value::Object(_)) => vec![obj.clone()],
        _ => Vec::new(),
    };

    let recipes = raw
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_object())
        .map(|(i, r)| Recipe {
            recipe_id: format!("ollama-{}", i),
            recipe_name: text_field(r, "recipe_name").unwrap_or_else(|| "Recipe".to_string()),
            recipe_description: text_field(r, "recipe_description").unwrap_or_default(),
            calories: safe_float(r.get("calories")),
            protein_g: safe_float(r.get("protein")),
            carbs_g: safe_float(r.get("carbohydrate")),
            fat_g: safe_float(r.get("fat")),
            ingredients: Vec::new(),
            nutrition_source: NutritionSource::Ai,
        })
        .collect();
    Ok(recipes)
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

/// One line per recipe, fed to the nutrition report prompt.
pub fn recipes_summary(recipes: &[Recipe]) -> String {
    recipes
        .iter()
        .map(|r| {
            format!(
                "{} ({} kcal, {} g protein, {} g carbs, {} g fat)",
                r.recipe_name,
                format_amount(r.calories),
                format_amount(r.protein_g),
                format_amount(r.carbs_g),
                format_amount(r.fat_g)
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recipes_wrapped_in_prose() {
        let reply = r#"Sure! Here you go:
```json
{"recipes": [
  {"recipe_name": " Pommes Frites ", "calories": 312, "protein": "3.4", "carbohydrate": 41, "fat": 15, "recipe_description": "Twice-fried potatoes."},
  "not an object",
  {"recipe_name": "Rösti", "calories": "n/a"}
]}
```
Enjoy."#;
        let recipes = parse_recipes_json(reply).unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].recipe_name, "Pommes Frites");
        assert_eq!(recipes[0].protein_g, Some(3.4));
        assert_eq!(recipes[0].nutrition_source, NutritionSource::Ai);
        assert_eq!(recipes[0].recipe_id, "ollama-0");
        assert_eq!(recipes[1].recipe_id, "ollama-2");
        assert_eq!(recipes[1].calories, None);
        assert_eq!(recipes[1].recipe_description, "");
    }

    #[test]
    fn test_parse_single_recipe_object() {
        let recipes = parse_recipes_json(r#"{"recipes": {"recipe_name": "Latke"}}"#).unwrap();
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].recipe_name, "Latke");
    }

    #[test]
    fn test_parse_failure() {
        let err = parse_recipes_json("no json here").unwrap_err();
        assert_eq!(err.to_string(), "JSON Parse Error.");
    }

    #[test]
    fn test_table_rows_use_placeholders() {
        let recipe = Recipe {
            recipe_id: "1".to_string(),
            recipe_name: String::new(),
            recipe_description: "x".repeat(100),
            calories: Some(250.0),
            protein_g: None,
            carbs_g: None,
            fat_g: Some(9.25),
            ingredients: Vec::new(),
            nutrition_source: NutritionSource::Ai,
        };
        let rows = recipes_to_table_rows(&[recipe]);
        assert_eq!(rows[0].recipe, "—");
        assert_eq!(rows[0].calories, "250.0");
        assert_eq!(rows[0].protein, "—");
        assert_eq!(rows[0].description.chars().count(), DESCRIPTION_WIDTH + 3);
        assert!(rows[0].description.ends_with("..."));
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("crème brûlée", 5), "crème...");
        assert_eq!(truncate("short", 80), "short");
    }

    #[test]
    fn test_lookup_terms_fall_back_to_name() {
        let mut recipe = parse_recipes_json(r#"{"recipes": [{"recipe_name": "Paella"}]}"#)
            .unwrap()
            .remove(0);
        assert_eq!(recipe.lookup_terms(), vec!["Paella".to_string()]);
        recipe.ingredients = vec!["rice".to_string()];
        assert_eq!(recipe.lookup_terms(), vec!["rice".to_string()]);
    }
}
