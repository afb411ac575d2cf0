use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    /// Non-food or poisonous entries that block recipe generation.
    static ref INAPPROPRIATE_TERMS: HashSet<&'static str> = [
        "paper", "plastic", "metal", "wood", "rocks", "glass", "dirt", "sand",
        "bleach", "poison", "posion", "chemicals", "soap", "glue", "paint", "gasoline",
        "detergent", "ammonia", "lighter fluid", "antifreeze", "rat poison",
        "cyanide", "arsenic", "lead", "mercury", "pesticide", "herbicide",
    ]
    .into_iter()
    .collect();
}

/// Splits free text on commas and semicolons into trimmed, non-empty entries.
pub fn parse_ingredients(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c == ';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Entries that are, or contain as a whole word, an inappropriate term.
/// Whole-word matching keeps foods like "bleached flour" allowed.
pub fn find_inappropriate(ingredients: &[String]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for ingredient in ingredients {
        let lower = ingredient.trim().to_lowercase();
        if lower.is_empty() {
            continue;
        }
        let blocked = INAPPROPRIATE_TERMS.contains(lower.as_str())
            || lower
                .split_whitespace()
                .any(|word| INAPPROPRIATE_TERMS.contains(word));
        if blocked && !found.contains(ingredient) {
            found.push(ingredient.clone());
        }
    }
    found
}

/// The user-facing rejection message, or `None` when every entry is edible.
pub fn check_ingredients(ingredients: &[String]) -> Option<String> {
    let found = find_inappropriate(ingredients);
    if found.is_empty() {
        return None;
    }
    Some(format!(
        "No recipes can be generated. One or more ingredients are inappropriate or dangerous: {}. \
         Please enter only safe, edible food ingredients.",
        found.join(", ")
    ))
}
