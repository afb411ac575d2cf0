use colored::Colorize;
use tracing::warn;

use super::spinner;
use crate::config::AppConfig;
use crate::food::analysis::nutrition::format_amount;
use crate::food::api::usda::{FoodSearch, UsdaClient};

const SEARCH_TERM: &str = "chicken breast";
const SEARCH_PAGE_SIZE: u32 = 5;
const SINGLE_FOOD: &str = "rice";

/// Exercises the USDA client end to end. Returns false when the key is
/// missing or the search step fails.
pub async fn run(config: &AppConfig) -> bool {
    let client = UsdaClient::new(config);
    if !client.has_key() {
        eprintln!("{}", "FDC_API_KEY not found in .env".red());
        return false;
    }

    println!("{}", format!("1. Searching foods: '{}'", SEARCH_TERM).bold());
    let bar = spinner("Searching USDA FoodData Central...");
    let search = client
        .search_foods(&FoodSearch::new(SEARCH_TERM, SEARCH_PAGE_SIZE))
        .await;
    bar.finish_and_clear();
    match search {
        Ok(response) => {
            let total = response
                .total_hits
                .map(|t| t.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!("   Total hits: {}  ·  Showing: {}", total, response.foods.len());
            for food in &response.foods {
                let facts = food.nutrition();
                println!(
                    "   - {} (fdcId {}): {} kcal, {} g protein",
                    food.description.as_deref().unwrap_or("Unknown"),
                    food.fdc_id.as_deref().unwrap_or("?"),
                    format_amount(facts.calories),
                    format_amount(facts.protein)
                );
            }
        }
        Err(e) => {
            eprintln!("   {}", e.to_string().red());
            return false;
        }
    }

    println!("\n{}", format!("2. Nutrition for '{}'", SINGLE_FOOD).bold());
    match client.nutrition_for_food(SINGLE_FOOD).await {
        Ok(facts) => println!("   {}", facts.summary_line().green()),
        Err(e) => {
            warn!(food = SINGLE_FOOD, error = %e, "Single food lookup failed");
            println!("   {}", e.to_string().yellow());
        }
    }

    let ingredients = vec!["chicken".to_string(), "rice".to_string()];
    println!("\n{}", format!("3. Recipe estimate for {}", ingredients.join(", ")).bold());
    match client.estimate_recipe_nutrition(&ingredients).await {
        Ok(facts) => println!("   {}", facts.summary_line().green()),
        Err(e) => println!("   {}", e.to_string().yellow()),
    }

    true
}
