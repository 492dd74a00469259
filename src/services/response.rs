use log::{debug, warn};
use serde::Deserialize;

use crate::error::ServiceError;
use crate::ingredients::units::normalize_unit;
use crate::model::{Amount, ExtractedRecipe, ParsedIngredient, QuantityRange};

/// Confidence assigned to ingredients structured by a text-generation model.
const MODEL_CONFIDENCE: f32 = 0.9;

/// Removes a surrounding markdown code fence and any chatter around the
/// outermost JSON object.
pub(crate) fn json_payload(raw: &str) -> &str {
    let trimmed = raw.trim();
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

fn clean_lines(lines: Vec<String>) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Reads an extraction reply. Anything that is not the expected JSON shape
/// is "no recipe".
pub(crate) fn parse_extraction(raw: &str) -> ExtractedRecipe {
    match serde_json::from_str::<ExtractedRecipe>(json_payload(raw)) {
        Ok(recipe) => ExtractedRecipe {
            ingredients: clean_lines(recipe.ingredients),
            instructions: clean_lines(recipe.instructions),
        },
        Err(e) => {
            warn!("Extraction reply was not a recipe object: {}", e);
            debug!("Raw extraction reply: {}", raw);
            ExtractedRecipe::default()
        }
    }
}

/// Reads a classification reply. `true` means music or other non-cooking
/// content; anything unrecognized counts as cooking content.
pub(crate) fn parse_classification(raw: &str) -> bool {
    let label = raw
        .trim()
        .trim_matches(|c: char| !c.is_ascii_alphabetic() && c != '_')
        .to_ascii_uppercase();

    match label.as_str() {
        "MUSIC" | "NOT_COOKING" | "NOT COOKING" => true,
        "COOKING" => false,
        _ => {
            warn!("Unrecognized classification '{}', treating as cooking content", raw.trim());
            false
        }
    }
}

#[derive(Debug, Deserialize)]
struct NormalizedLine {
    #[serde(default)]
    name: String,
    quantity: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
    preparation: Option<String>,
    notes: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reads a normalization reply into a `ParsedIngredient` for `line`.
pub(crate) fn parse_normalized(raw: &str, line: &str) -> Result<ParsedIngredient, ServiceError> {
    let normalized: NormalizedLine = serde_json::from_str(json_payload(raw))
        .map_err(|e| ServiceError::Unparseable(e.to_string()))?;

    let name = normalized.name.trim().to_lowercase();
    if name.is_empty() {
        return Err(ServiceError::Unparseable(format!(
            "no ingredient name for '{}'",
            line
        )));
    }

    let amount = match (normalized.min, normalized.max, normalized.quantity) {
        (Some(min), Some(max), _) if min != max => Amount::range(QuantityRange::new(min, max)),
        (Some(min), Some(_), _) => Amount::scalar(min),
        (_, _, Some(quantity)) => Amount::scalar(quantity),
        _ => Amount::scalar(0.0),
    };
    if !amount.is_finite() || amount.estimate() < 0.0 {
        return Err(ServiceError::Unparseable(format!(
            "invalid amount for '{}'",
            line
        )));
    }

    let unit = normalized
        .unit
        .map(|u| u.trim().to_lowercase())
        .unwrap_or_default();
    let unit = normalize_unit(&unit)
        .map(str::to_string)
        .unwrap_or(unit);

    Ok(ParsedIngredient {
        name,
        amount,
        unit,
        preparation: non_empty(normalized.preparation),
        notes: non_empty(normalized.notes),
        confidence: MODEL_CONFIDENCE,
        original: line.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_inside_code_fence() {
        let raw = "```json\n{\"ingredients\": [\"2 eggs\", \" \"], \"instructions\": [\"Whisk\"]}\n```";
        let recipe = parse_extraction(raw);
        assert_eq!(recipe.ingredients, vec!["2 eggs"]);
        assert_eq!(recipe.instructions, vec!["Whisk"]);
    }

    #[test]
    fn test_malformed_extraction_is_empty() {
        assert!(parse_extraction("I could not find a recipe, sorry!").is_empty());
        assert!(parse_extraction("{\"ingredients\": \"salt\"}").is_empty());
        assert!(parse_extraction("").is_empty());
    }

    #[test]
    fn test_classification_labels() {
        assert!(parse_classification("MUSIC"));
        assert!(parse_classification("not_cooking."));
        assert!(!parse_classification("COOKING"));
        assert!(!parse_classification("UNEXPECTED RESPONSE"));
        assert!(!parse_classification(""));
    }

    #[test]
    fn test_normalized_range() {
        let raw = r#"{"name": "Garlic", "quantity": null, "min": 3, "max": 2, "unit": "cloves", "preparation": "minced", "notes": ""}"#;
        let parsed = parse_normalized(raw, "2-3 cloves garlic, minced").unwrap();
        assert_eq!(parsed.name, "garlic");
        assert_eq!(parsed.range(), Some(QuantityRange::new(2.0, 3.0)));
        assert_eq!(parsed.unit, "clove");
        assert_eq!(parsed.preparation.as_deref(), Some("minced"));
        assert!(parsed.notes.is_none());
    }

    #[test]
    fn test_normalized_missing_amount_is_zero() {
        let raw = r#"{"name": "salt", "unit": ""}"#;
        let parsed = parse_normalized(raw, "salt").unwrap();
        assert_eq!(parsed.quantity(), Some(0.0));
        assert!(!parsed.has_unit());
    }

    #[test]
    fn test_normalized_without_name_is_error() {
        let result = parse_normalized(r#"{"quantity": 2}"#, "2");
        assert!(matches!(result, Err(ServiceError::Unparseable(_))));
    }
}
