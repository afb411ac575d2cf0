use crate::food::error::FetchError;
use crate::food::recipes::{parse_recipes_json, Recipe};
use crate::providers::traits::CompletionProvider;
use std::sync::Arc;
use tracing::{info, warn};

pub const MISSING_KEY: &str = "OLLAMA_API_KEY not set.";

/// Recipe counts requested from the model.
pub const MIN_IDEAS: usize = 3;
pub const MAX_IDEAS: usize = 10;

/// Chef-style prompts over a completion provider. Without a provider every
/// call fails with the missing-key message.
#[derive(Clone)]
pub struct ChefAssistant {
    provider: Option<Arc<dyn CompletionProvider + Send + Sync>>,
}

impl ChefAssistant {
    pub fn new(provider: Option<Arc<dyn CompletionProvider + Send + Sync>>) -> Self {
        Self { provider }
    }

    fn provider(&self) -> Result<&Arc<dyn CompletionProvider + Send + Sync>, FetchError> {
        self.provider
            .as_ref()
            .ok_or_else(|| FetchError::config(MISSING_KEY))
    }

    async fn call(&self, prompt: &str) -> Result<String, FetchError> {
        let provider = self.provider()?;
        provider.complete(prompt).await.map_err(|e| {
            warn!(error = %e, "Text generation failed");
            FetchError::Generation(e.to_string())
        })
    }

    /// A full markdown recipe for one dish.
    pub async fn generate_recipe(
        &self,
        ingredients: &[String],
        recipe_name: Option<&str>,
        recipe_description: Option<&str>,
    ) -> Result<String, FetchError> {
        let prompt = recipe_prompt(ingredients, recipe_name, recipe_description);
        info!(recipe = recipe_name.unwrap_or("-"), "Generating recipe");
        self.call(&prompt).await
    }

    /// A list of dish ideas with rough nutrition, parsed from the model's JSON.
    pub async fn generate_recipe_ideas(
        &self,
        ingredients: &[String],
        max_recipes: usize,
    ) -> Result<Vec<Recipe>, FetchError> {
        let count = max_recipes.clamp(MIN_IDEAS, MAX_IDEAS);
        let text = self.call(&ideas_prompt(ingredients, count)).await?;
        if text.trim().is_empty() {
            return Err(FetchError::Generation("No response from AI.".to_string()));
        }
        let recipes = parse_recipes_json(&text)?;
        info!(requested = count, received = recipes.len(), "Recipe ideas generated");
        Ok(recipes)
    }

    /// A short markdown report on the nutritional balance of the suggestions.
    pub async fn nutrition_report(
        &self,
        ingredients: &[String],
        recipes_summary: &str,
    ) -> Result<String, FetchError> {
        self.call(&report_prompt(ingredients, recipes_summary)).await
    }
}

fn ingredient_list(ingredients: &[String]) -> String {
    if ingredients.is_empty() {
        "common pantry items".to_string()
    } else {
        ingredients.join(", ")
    }
}

fn recipe_prompt(
    ingredients: &[String],
    recipe_name: Option<&str>,
    recipe_description: Option<&str>,
) -> String {
    let ing_str = ingredient_list(ingredients);
    let dish = match recipe_name {
        Some(name) if !name.trim().is_empty() => name.trim().to_string(),
        _ => format!("a dish using {}", ing_str),
    };
    let context = match recipe_description {
        Some(desc) if !desc.trim().is_empty() => desc.trim(),
        _ => "Focus on high-quality execution.",
    };

    format!(
        "You are a professional executive chef. Provide a technical, clear recipe for: \"{dish}\".\n\n\
         NAMING RULE: Do not force the ingredient names into the recipe title. Use professional culinary \
         names (e.g., 'Pommes Frites' instead of 'Potato Fries').\n\n\
         User Ingredients: {ing_str}.\n\
         Context: {context}\n\n\
         FORMATTING RULES:\n\
         1. ## [Culinary Recipe Name]\n\
         2. ### Ingredients: Precise quantities and prep states (e.g., 'diced', 'minced').\n\
         3. ### Instructions: Numbered, technical steps focusing on heat control, technique, and timing.\n\
         4. ### Chef's Notes: 2-3 brief tips on technical finesse or storage.\n\n\
         TONE: Professional and direct. Bold key instructions."
    )
}

fn ideas_prompt(ingredients: &[String], count: usize) -> String {
    let ing_str = ingredient_list(ingredients);
    format!(
        "You are a culinary expert. Generate {count} recipe ideas based on: {ing_str}.\n\n\
         CRITICAL NAMING CONSTRAINTS:\n\
         1. NEVER use the literal ingredient names in the title unless it is part of a formal dish name \
         (e.g., 'Potato Salad' is okay, but 'Potato with Beef' is FORBIDDEN).\n\
         2. USE ESTABLISHED CULINARY TITLES: fried potatoes are 'Pommes Frites', a potato pancake is a \
         'Latke' or 'Rösti'.\n\
         3. SEMANTIC EXPANSION: Identify what these ingredients become when processed by a chef. Think of \
         derived forms, classic mother sauces, and international variations.\n\
         4. MAIN INGREDIENT FOCUS: The provided ingredients are the primary component of the dish, not a garnish.\n\n\
         Return ONLY valid JSON:\n\
         {{\n  \"recipes\": [\n    {{\n      \"recipe_name\": \"Official Culinary Title\",\n      \
         \"calories\": 0,\n      \"protein\": 0,\n      \"carbohydrate\": 0,\n      \"fat\": 0,\n      \
         \"recipe_description\": \"Technical one-sentence summary.\"\n    }}\n  ]\n}}"
    )
}

fn report_prompt(ingredients: &[String], recipes_summary: &str) -> String {
    format!(
        "Analyze the nutritional density of these ingredients: {} \n\
         found in these recipes: {}.\n\n\
         TASK:\n\
         - ## Summary: Overall nutritional balance.\n\
         - ## Macros: Best options for protein and calorie efficiency.\n\
         - ## Recommendations: 1-2 technical cooking adjustments to optimize health.\n\n\
         STYLE: Objective, data-driven, and professional.",
        ingredients.join(", "),
        recipes_summary
    )
}
