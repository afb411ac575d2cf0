use crate::food::analysis::safety::{check_ingredients, parse_ingredients};
use crate::food::api::usda::UsdaClient;
use crate::food::error::FetchError;
use crate::food::recipes::Recipe;
use crate::llm::chef::ChefAssistant;
use tracing::{debug, info};

/// Upper bound on ideas requested per search.
pub const MAX_RESULTS_PER_SEARCH: usize = 15;

#[derive(Debug, Clone)]
pub struct RecipeSearch {
    pub ingredients: Vec<String>,
    pub recipes: Vec<Recipe>,
}

/// Ingredients in, recipe ideas out: the text generator names the dishes
/// and USDA supplies the nutrition where it can.
#[derive(Clone)]
pub struct RecipeFinder {
    chef: ChefAssistant,
    usda: UsdaClient,
}

impl RecipeFinder {
    pub fn new(chef: ChefAssistant, usda: UsdaClient) -> Self {
        Self { chef, usda }
    }

    pub async fn find_recipes(&self, ingredients_text: &str) -> Result<RecipeSearch, FetchError> {
        let ingredients = parse_ingredients(ingredients_text);
        if ingredients.is_empty() {
            return Err(FetchError::validation("Please enter at least one ingredient."));
        }
        if let Some(message) = check_ingredients(&ingredients) {
            return Err(FetchError::Validation(message));
        }

        let mut recipes = self
            .chef
            .generate_recipe_ideas(&ingredients, MAX_RESULTS_PER_SEARCH.min(10))
            .await?;

        for recipe in recipes.iter_mut() {
            self.enrich(recipe).await;
        }

        info!(count = recipes.len(), "Recipes found");
        Ok(RecipeSearch { ingredients, recipes })
    }

    /// Replaces the model's nutrition guess with a USDA estimate when one is
    /// available; otherwise the recipe is left untouched.
    async fn enrich(&self, recipe: &mut Recipe) {
        if !self.usda.has_key() {
            return;
        }
        match self.usda.estimate_recipe_nutrition(&recipe.lookup_terms()).await {
            Ok(facts) => recipe.apply_nutrition(&facts),
            Err(e) => debug!(recipe = %recipe.recipe_name, error = %e, "Keeping AI nutrition estimate"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::food::recipes::NutritionSource;
    use crate::llm::chef::tests::ScriptedProvider;
    use serde_json::json;
    use std::sync::Arc;
    use url::Url;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const IDEAS: &str = r#"{"recipes": [
        {"recipe_name": "Chicken Fried Rice", "calories": 600, "protein": 30},
        {"recipe_name": "Congee", "calories": 200}
    ]}"#;

    fn finder(provider: ScriptedProvider, usda_url: Option<String>) -> RecipeFinder {
        let mut config = AppConfig::default();
        if let Some(url) = usda_url {
            config.usda_api_url = Url::parse(&url).unwrap();
            config.keys.fdc_api_key = Some("fdc-key".to_string());
        }
        RecipeFinder::new(
            ChefAssistant::new(Some(Arc::new(provider))),
            UsdaClient::new(&config),
        )
    }

    #[tokio::test]
    async fn test_rejects_empty_and_unsafe_input() {
        let provider = ScriptedProvider::replying(IDEAS);
        let finder = finder(provider.clone(), None);

        let err = finder.find_recipes(" ;, ").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter at least one ingredient.");

        let err = finder.find_recipes("rice, bleach").await.unwrap_err();
        assert!(err.to_string().contains("dangerous: bleach."));
        assert!(provider.prompts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_without_usda_key_keeps_ai_nutrition() {
        let finder = finder(ScriptedProvider::replying(IDEAS), None);
        let search = finder.find_recipes("chicken; rice").await.unwrap();
        assert_eq!(search.ingredients, vec!["chicken".to_string(), "rice".to_string()]);
        assert_eq!(search.recipes.len(), 2);
        assert_eq!(search.recipes[0].calories, Some(600.0));
        assert_eq!(search.recipes[0].nutrition_source, NutritionSource::Ai);
    }

    #[tokio::test]
    async fn test_usda_enrichment_by_recipe_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("query", "Chicken Fried Rice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "foods": [{"fdcId": 1, "description": "Fried rice with chicken", "foodNutrients": [
                    {"nutrientId": 1008, "value": 174.0},
                    {"nutrientId": 1003, "value": 8.9}
                ]}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("query", "Congee"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"foods": []})))
            .mount(&server)
            .await;

        let finder = finder(ScriptedProvider::replying(IDEAS), Some(server.uri()));
        let search = finder.find_recipes("chicken, rice").await.unwrap();

        assert_eq!(search.recipes[0].calories, Some(174.0));
        assert_eq!(search.recipes[0].nutrition_source, NutritionSource::Usda);
        assert_eq!(search.recipes[1].calories, Some(200.0));
        assert_eq!(search.recipes[1].nutrition_source, NutritionSource::Ai);
    }
}
