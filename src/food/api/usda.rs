use crate::config::AppConfig;
use crate::food::analysis::nutrition::NutritionFacts;
use crate::food::api::{read_json, string_or_number};
use crate::food::error::{blank_error, FetchError};
use crate::food::recipes::{NutritionSource, Recipe};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;
use validator::{Validate, ValidationError};

/// Ingredients looked up when estimating a recipe.
pub const MAX_ESTIMATE_INGREDIENTS: usize = 8;

const MISSING_KEY: &str =
    "FDC_API_KEY must be set in .env. Get key at https://fdc.nal.usda.gov/api-key-signup";

fn validate_expression(expression: &str) -> Result<(), ValidationError> {
    if expression.trim().is_empty() {
        return Err(blank_error("Search expression cannot be empty."));
    }
    Ok(())
}

#[derive(Debug, Clone, Validate)]
pub struct FoodSearch {
    #[validate(custom = "validate_expression")]
    pub query: String,
    #[validate(range(min = 1, max = 200, message = "Page size must be between 1 and 200."))]
    pub page_size: u32,
    #[validate(range(min = 1, message = "Page number must be 1 or greater."))]
    pub page_number: u32,
}

impl FoodSearch {
    pub fn new(query: impl Into<String>, page_size: u32) -> Self {
        Self {
            query: query.into(),
            page_size,
            page_number: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodNutrient {
    #[serde(default)]
    pub nutrient_id: Option<u32>,
    #[serde(default)]
    pub nutrient_name: Option<String>,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Food {
    #[serde(default, deserialize_with = "string_or_number")]
    pub fdc_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub brand_owner: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<FoodNutrient>,
}

impl Food {
    pub fn nutrition(&self) -> NutritionFacts {
        NutritionFacts::from_nutrients(&self.food_nutrients)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodSearchResponse {
    #[serde(default)]
    pub total_hits: Option<u64>,
    #[serde(default)]
    pub foods: Vec<Food>,
}

#[derive(Debug, Clone)]
pub struct UsdaClient {
    client: Client,
    api_key: Option<String>,
    base_url: Url,
    timeout: Duration,
}

impl UsdaClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.keys.fdc_api_key.clone(),
            base_url: config.usda_api_url.clone(),
            timeout: config.http_timeout,
        }
    }

    pub fn has_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> Result<&str, FetchError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| FetchError::config(MISSING_KEY))
    }

    fn search_url(&self) -> String {
        format!("{}/foods/search", self.base_url.as_str().trim_end_matches('/'))
    }

    pub async fn search_foods(&self, search: &FoodSearch) -> Result<FoodSearchResponse, FetchError> {
        search.validate()?;
        let api_key = self.key()?;

        debug!(query = %search.query.trim(), page_size = search.page_size, "Searching USDA foods");

        let response = self
            .client
            .get(self.search_url())
            .query(&[
                ("api_key", api_key.to_string()),
                ("query", search.query.trim().to_string()),
                ("pageSize", search.page_size.to_string()),
                ("pageNumber", search.page_number.to_string()),
            ])
            .timeout(self.timeout)
            .send()
            .await?;

        let body = read_json(response).await?;
        serde_json::from_value(body).map_err(|_| FetchError::InvalidJson)
    }

    /// Nutrition of the first search match.
    pub async fn nutrition_for_food(&self, food: &str) -> Result<NutritionFacts, FetchError> {
        let data = self.search_foods(&FoodSearch::new(food, 1)).await?;
        let first = data
            .foods
            .first()
            .ok_or_else(|| FetchError::Api("No food found".to_string()))?;

        let facts = first.nutrition();
        if facts.calories.is_none() && facts.protein.is_none() {
            return Err(FetchError::Api("No nutrition data for this food".to_string()));
        }
        Ok(facts)
    }

    /// Rough per-serving estimate: sums the first match of each ingredient.
    /// Ingredients that fail to resolve are skipped.
    pub async fn estimate_recipe_nutrition(
        &self,
        ingredients: &[String],
    ) -> Result<NutritionFacts, FetchError> {
        if ingredients.is_empty() {
            return Err(FetchError::validation("No ingredients provided"));
        }
        self.key()?;

        let mut total = NutritionFacts::zero();
        for ingredient in ingredients.iter().take(MAX_ESTIMATE_INGREDIENTS) {
            match self.nutrition_for_food(ingredient.trim()).await {
                Ok(facts) => total.accumulate(&facts),
                Err(e) => {
                    warn!(ingredient = %ingredient, error = %e, "Skipping ingredient without nutrition");
                }
            }
        }

        if total.is_empty_estimate() {
            return Err(FetchError::Api(
                "Could not find nutrition for any ingredient".to_string(),
            ));
        }
        Ok(total)
    }

    /// Search results reshaped as recipe-like rows, one per distinct food.
    pub async fn search_foods_as_recipes(
        &self,
        expression: &str,
        max_results: u32,
    ) -> Result<Vec<Recipe>, FetchError> {
        let page_size = max_results.clamp(1, 50);
        let data = self.search_foods(&FoodSearch::new(expression, page_size)).await?;

        let mut seen = HashSet::new();
        let mut recipes = Vec::new();
        for food in data.foods {
            if !seen.insert(food.fdc_id.clone()) {
                continue;
            }
            let facts = food.nutrition();
            let description = food
                .ingredients
                .clone()
                .filter(|s| !s.is_empty())
                .or_else(|| food.brand_owner.clone())
                .unwrap_or_default();
            recipes.push(Recipe {
                recipe_id: food.fdc_id.clone().unwrap_or_default(),
                recipe_name: food.description.clone().unwrap_or_else(|| "Unknown".to_string()),
                recipe_description: description,
                calories: facts.calories,
                protein_g: facts.protein,
                carbs_g: facts.carbohydrate,
                fat_g: facts.fat,
                ingredients: Vec::new(),
                nutrition_source: NutritionSource::Usda,
            });
        }

        info!(expression = %expression.trim(), count = recipes.len(), "USDA foods mapped to recipes");
        Ok(recipes)
    }
}
