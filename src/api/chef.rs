use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::html::{self, alert, muted, page, AlertKind, Tab};
use super::session::{RecipeDetail, SessionData, SessionId};
use super::{ApiResult, AppState};
use crate::food::analysis::nutrition::NutritionFacts;
use crate::food::error::FetchError;
use crate::food::recipes::{recipes_summary, recipes_to_table_rows, Recipe, RECIPE_COLUMNS};

const TITLE: &str = "Smart Chef";
const NUTRITION_MATCHES: u32 = 5;

#[derive(Debug, Deserialize)]
pub struct IngredientsForm {
    #[serde(default)]
    pub ingredients: String,
    #[serde(default)]
    pub ollama_key: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    pub index: usize,
}

#[derive(Debug, Deserialize)]
pub struct NutritionParams {
    #[serde(default)]
    pub food: String,
}

#[derive(Serialize)]
pub struct NutritionResponse {
    pub food: String,
    pub nutrition: NutritionFacts,
    pub matches: Vec<Recipe>,
}

fn tabs(active: &str) -> [Tab<'static>; 2] {
    [
        Tab { href: "/", label: "Recipes", active: active == "recipes" },
        Tab { href: "/about", label: "About", active: active == "about" },
    ]
}

fn ingredients_card(data: &SessionData) -> String {
    let key_hint = if data.ollama_key.is_some() {
        "Using the key entered for this session"
    } else {
        "Leave blank to use OLLAMA_API_KEY from .env"
    };
    format!(
        r#"<h2>What's in your kitchen?</h2>
<form method="post" action="/recipes">
<label for="ingredients">Ingredients (separate with commas)</label>
<textarea id="ingredients" name="ingredients" rows="3" placeholder="e.g. chicken, rice, garlic">{ingredients}</textarea>
<label for="ollama_key">Ollama API key (optional)</label>
<input id="ollama_key" name="ollama_key" type="password" placeholder="{key_hint}">
<button type="submit">Find recipes</button>
</form>"#,
        ingredients = html::text(&data.ingredients_text),
        key_hint = html::attr(key_hint),
    )
}

fn generate_button(index: usize) -> String {
    format!(
        r#"<form method="post" action="/recipes/generate"><input type="hidden" name="index" value="{}"><button type="submit">Generate</button></form>"#,
        index
    )
}

fn recipe_table(recipes: &[Recipe]) -> String {
    let rows = recipes_to_table_rows(recipes);
    let mut out = format!("<h3>Suggested recipes</h3>{}", muted(&format!("{} recipes found.", recipes.len())));
    out.push_str(&html::table(
        &RECIPE_COLUMNS,
        rows.iter()
            .enumerate()
            .map(|(i, row)| (row.cells().to_vec(), Some(generate_button(i)))),
        Some("Recipe"),
    ));
    out
}

fn report_section(data: &SessionData) -> String {
    let mut out = String::from(
        r#"<h3>Nutrition report</h3>
<form method="post" action="/report"><button type="submit">Nutrition report</button></form>"#,
    );
    match &data.report {
        None => {}
        Some(Ok(text)) => out.push_str(&markdown_block(text)),
        Some(Err(e)) => out.push_str(&alert(AlertKind::Danger, &e.to_string())),
    }
    out
}

fn markdown_block(text: &str) -> String {
    format!(r#"<pre class="markdown">{}</pre>"#, html::text(text))
}

fn detail_view(detail: &RecipeDetail) -> String {
    let mut out = format!("<h2>{}</h2>", html::text(&detail.recipe_name));
    match &detail.text {
        Ok(text) => {
            out.push_str(&markdown_block(text));
            out.push_str(r#"<p><a href="/recipe.md" download>Download recipe.md</a></p>"#);
        }
        Err(e) => out.push_str(&alert(AlertKind::Danger, &e.to_string())),
    }
    out.push_str(r#"<form method="post" action="/back"><button type="submit">Back to recipes</button></form>"#);
    out
}

pub fn render_chef_page(data: &SessionData, notice: Option<&str>) -> Html<String> {
    let mut content = String::new();
    if let Some(notice) = notice {
        content.push_str(&alert(AlertKind::Warning, notice));
    }

    if let Some(detail) = &data.detail {
        content.push_str(&detail_view(detail));
        return page(TITLE, &tabs("recipes"), "", &content);
    }

    content.push_str(&ingredients_card(data));
    match &data.recipes {
        None => content.push_str(&muted("Enter ingredients and click Find recipes.")),
        Some(Err(e)) => content.push_str(&alert(AlertKind::Danger, &e.to_string())),
        Some(Ok(search)) if search.recipes.is_empty() => {
            content.push_str(&alert(AlertKind::Warning, "No recipes found for these ingredients."))
        }
        Some(Ok(search)) => {
            content.push_str(&recipe_table(&search.recipes));
            content.push_str(&report_section(data));
        }
    }
    page(TITLE, &tabs("recipes"), "", &content)
}

pub async fn index(
    State(state): State<AppState>,
    session: SessionId,
) -> Html<String> {
    render_chef_page(&state.sessions.get(session), None)
}

/// POST /recipes
pub async fn find_recipes(
    State(state): State<AppState>,
    session: SessionId,
    Form(form): Form<IngredientsForm>,
) -> Html<String> {
    let typed_key = form
        .ollama_key
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());
    state.sessions.update(session, |data| {
        data.ingredients_text = form.ingredients.clone();
        if typed_key.is_some() {
            data.ollama_key = typed_key;
        }
        data.detail = None;
        data.report = None;
    });

    let key = state.sessions.get(session).ollama_key;
    let result = state.finder(key.as_deref()).find_recipes(&form.ingredients).await;
    state.sessions.update(session, |data| data.recipes = Some(result));
    render_chef_page(&state.sessions.get(session), None)
}

/// POST /recipes/generate - full recipe for one table row.
pub async fn generate_recipe(
    State(state): State<AppState>,
    session: SessionId,
    Form(form): Form<GenerateForm>,
) -> Html<String> {
    let data = state.sessions.get(session);
    let (ingredients, recipe) = match &data.recipes {
        Some(Ok(search)) => match search.recipes.get(form.index) {
            Some(recipe) => (search.ingredients.clone(), recipe.clone()),
            None => return render_chef_page(&data, Some("That recipe is no longer listed.")),
        },
        _ => return render_chef_page(&data, Some("Find recipes first.")),
    };

    info!(index = form.index, recipe = %recipe.recipe_name, "Recipe detail requested");
    let text = state
        .chef(data.ollama_key.as_deref())
        .generate_recipe(
            &ingredients,
            Some(recipe.recipe_name.as_str()),
            Some(recipe.recipe_description.as_str()),
        )
        .await;

    state.sessions.update(session, |data| {
        data.detail = Some(RecipeDetail {
            recipe_name: recipe.recipe_name.clone(),
            text,
        });
    });
    render_chef_page(&state.sessions.get(session), None)
}

pub async fn back_to_table(
    State(state): State<AppState>,
    session: SessionId,
) -> Html<String> {
    state.sessions.update(session, |data| data.detail = None);
    render_chef_page(&state.sessions.get(session), None)
}

/// GET /recipe.md - the generated recipe as a markdown attachment.
pub async fn download_recipe(
    State(state): State<AppState>,
    session: SessionId,
) -> Response {
    match state.sessions.get(session).detail {
        Some(RecipeDetail { text: Ok(text), .. }) => (
            [
                (header::CONTENT_TYPE, "text/markdown; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"recipe.md\""),
            ],
            text,
        )
            .into_response(),
        _ => (StatusCode::NOT_FOUND, "No recipe has been generated yet.").into_response(),
    }
}

/// POST /report - AI commentary on the listed recipes.
pub async fn nutrition_report(
    State(state): State<AppState>,
    session: SessionId,
) -> Html<String> {
    let data = state.sessions.get(session);
    let search = match &data.recipes {
        Some(Ok(search)) => search,
        _ => return render_chef_page(&data, Some("Find recipes first.")),
    };
    let report = state
        .chef(data.ollama_key.as_deref())
        .nutrition_report(&search.ingredients, &recipes_summary(&search.recipes))
        .await;
    state.sessions.update(session, |data| data.report = Some(report));
    render_chef_page(&state.sessions.get(session), None)
}

pub async fn about() -> Html<String> {
    let content = r#"<h2>About Smart Chef</h2>
<p>Enter the ingredients you have and Smart Chef suggests dishes, estimates their nutrition and writes full recipes on request.</p>
<h3>How it works</h3>
<ul>
<li>Recipe ideas and full recipes are written by an Ollama Cloud model.</li>
<li>Nutrition is estimated from USDA FoodData Central when an FDC key is configured; otherwise the model's estimate is shown.</li>
<li>Inappropriate or dangerous ingredients are rejected before anything is generated.</li>
</ul>
<h3>Keys</h3>
<p>Set <code>OLLAMA_API_KEY</code> and <code>FDC_API_KEY</code> in <code>.env</code>. An Ollama key can also be entered on the recipes page for the current session.</p>"#;
    page(TITLE, &tabs("about"), "", content)
}

/// GET /api/nutrition?food= - USDA nutrition for one food.
pub async fn nutrition_json(
    State(state): State<AppState>,
    Query(params): Query<NutritionParams>,
) -> ApiResult<NutritionResponse> {
    let food = params.food.trim().to_string();
    if food.is_empty() {
        return Err(FetchError::validation("Please enter a food name.").into());
    }
    let nutrition = state.usda.nutrition_for_food(&food).await?;
    let matches = state.usda.search_foods_as_recipes(&food, NUTRITION_MATCHES).await?;
    Ok(Json(NutritionResponse { food, nutrition, matches }))
}
