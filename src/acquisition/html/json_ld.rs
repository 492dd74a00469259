use html_escape::decode_html_entities;
use log::debug;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;

use crate::model::ExtractedRecipe;

#[derive(Debug, Deserialize)]
struct JsonLdRecipe {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "recipeIngredient", default)]
    recipe_ingredient: Option<RecipeIngredients>,
    #[serde(rename = "recipeInstructions", default)]
    recipe_instructions: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RecipeIngredients {
    Strings(Vec<String>),
    Objects(Vec<IngredientObject>),
    Single(String),
}

#[derive(Debug, Deserialize)]
struct IngredientObject {
    name: String,
    amount: Option<String>,
}

/// A schema.org `Recipe` found in a page's JSON-LD, flattened to lines.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct StructuredRecipe {
    pub name: Option<String>,
    pub recipe: ExtractedRecipe,
}

impl StructuredRecipe {
    /// Renders the recipe as plain text for the extractor.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(name) = &self.name {
            out.push_str(name);
            out.push_str("\n\n");
        }
        out.push_str("Ingredients:\n");
        for ingredient in &self.recipe.ingredients {
            out.push_str(ingredient);
            out.push('\n');
        }
        out.push_str("\nInstructions:\n");
        for (i, step) in self.recipe.instructions.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, step));
        }
        out.trim_end().to_string()
    }
}

fn decode_html_symbols(text: &str) -> String {
    // some sites double-encode entities
    decode_html_entities(&decode_html_entities(text))
        .trim()
        .to_string()
}

fn is_recipe_type(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t.eq_ignore_ascii_case("recipe"),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|t| t.eq_ignore_ascii_case("recipe")),
        _ => false,
    }
}

/// Finds the first Recipe object in a JSON-LD document: the root, an array
/// member, or a member of `@graph`.
fn find_recipe(json_ld: &Value) -> Option<&Value> {
    if is_recipe_type(json_ld) {
        return Some(json_ld);
    }
    if let Some(items) = json_ld.as_array() {
        return items.iter().find_map(find_recipe);
    }
    json_ld
        .get("@graph")
        .and_then(Value::as_array)
        .and_then(|items| items.iter().find(|item| is_recipe_type(item)))
}

/// Collects instruction steps from any of the shapes sites publish: a single
/// string, a list of strings, HowToStep objects, or HowToSections of steps.
fn collect_steps(value: &Value, steps: &mut Vec<String>) {
    match value {
        Value::String(text) => {
            let text = decode_html_symbols(text);
            if !text.is_empty() {
                steps.push(text);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_steps(item, steps)),
        Value::Object(object) => {
            if let Some(elements) = object.get("itemListElement") {
                collect_steps(elements, steps);
            } else if let Some(text) = object.get("text").or_else(|| object.get("name")) {
                collect_steps(text, steps);
            }
        }
        _ => {}
    }
}

impl From<JsonLdRecipe> for StructuredRecipe {
    fn from(json_ld: JsonLdRecipe) -> Self {
        let ingredients = match json_ld.recipe_ingredient {
            Some(RecipeIngredients::Strings(lines)) => {
                lines.iter().map(|line| decode_html_symbols(line)).collect()
            }
            Some(RecipeIngredients::Objects(objects)) => objects
                .into_iter()
                .map(|ing| {
                    let name = decode_html_symbols(&ing.name);
                    match ing.amount.as_deref().map(str::trim) {
                        Some(amount) if !amount.is_empty() => format!("{} {}", amount, name),
                        _ => name,
                    }
                })
                .collect(),
            Some(RecipeIngredients::Single(line)) => line
                .lines()
                .map(decode_html_symbols)
                .collect(),
            None => Vec::new(),
        };

        let mut instructions = Vec::new();
        if let Some(value) = &json_ld.recipe_instructions {
            collect_steps(value, &mut instructions);
        }

        StructuredRecipe {
            name: json_ld
                .name
                .map(|n| decode_html_symbols(&n))
                .filter(|n| !n.is_empty()),
            recipe: ExtractedRecipe {
                ingredients: ingredients.into_iter().filter(|i: &String| !i.is_empty()).collect(),
                instructions,
            },
        }
    }
}

/// The first schema.org Recipe embedded in the page, if any carries
/// ingredients or instructions.
pub(crate) fn extract_json_ld_recipe(document: &Html) -> Option<StructuredRecipe> {
    let selector = Selector::parse("script[type='application/ld+json']").ok()?;

    for (index, script) in document.select(&selector).enumerate() {
        let raw_json = script.inner_html();
        let json_ld: Value = match serde_json::from_str(raw_json.trim()) {
            Ok(value) => value,
            Err(e) => {
                debug!("JSON-LD block {} is not valid JSON: {}", index, e);
                continue;
            }
        };

        let Some(recipe) = find_recipe(&json_ld) else {
            continue;
        };
        match serde_json::from_value::<JsonLdRecipe>(recipe.clone()) {
            Ok(recipe) => {
                let structured = StructuredRecipe::from(recipe);
                if !structured.recipe.is_empty() {
                    return Some(structured);
                }
            }
            Err(e) => debug!("JSON-LD block {} is not a usable Recipe: {}", index, e),
        }
    }

    None
}
