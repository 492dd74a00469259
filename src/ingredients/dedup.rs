use log::debug;
use std::collections::HashMap;

use super::parser::parse_ingredient_line;

const MODIFIERS: [&str; 12] = [
    "boneless", "skinless", "fresh", "dried", "chopped", "diced", "minced", "sliced", "large",
    "small", "medium", "of",
];

/// Normalized name used to spot repeated mentions of one ingredient:
/// quantity and unit stripped, modifier words removed.
pub fn core_ingredient_key(text: &str) -> String {
    let parsed = parse_ingredient_line(text);
    let name = if parsed.name.is_empty() {
        text.trim().to_lowercase()
    } else {
        parsed.name
    };

    name.split(|c: char| c.is_whitespace() || c == ',')
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty() && !MODIFIERS.contains(word))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapses repeated mentions of the same ingredient, keeping the most
/// detailed (longest) raw line in the position of the first mention.
/// Quantities are not summed.
pub fn deduplicate_ingredients<S: AsRef<str>>(list: &[S], debug: bool) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(list.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for raw in list {
        let raw = raw.as_ref();
        let key = core_ingredient_key(raw);

        match positions.get(&key) {
            Some(&index) => {
                let current = &kept[index];
                if raw.chars().count() > current.chars().count() {
                    if debug {
                        debug!("Duplicate '{}': replacing '{}' with '{}'", key, current, raw);
                    }
                    kept[index] = raw.to_string();
                } else if debug {
                    debug!("Duplicate '{}': keeping '{}' over '{}'", key, current, raw);
                }
            }
            None => {
                positions.insert(key, kept.len());
                kept.push(raw.to_string());
            }
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_key_strips_quantity_and_modifiers() {
        assert_eq!(
            core_ingredient_key("2 lb boneless skinless chicken thighs"),
            "chicken thighs"
        );
        assert_eq!(core_ingredient_key("3 cloves garlic, minced"), "garlic");
        assert_eq!(core_ingredient_key("1 bunch of fresh parsley"), "parsley");
    }

    #[test]
    fn test_keeps_longer_mention() {
        let result = deduplicate_ingredients(
            &["chicken thighs", "2 lb boneless skinless chicken thighs"],
            false,
        );
        assert_eq!(result, vec!["2 lb boneless skinless chicken thighs"]);
    }

    #[test]
    fn test_keeps_first_position() {
        let result = deduplicate_ingredients(
            &["onion", "1 cup rice", "1 large onion, diced"],
            true,
        );
        assert_eq!(result, vec!["1 large onion, diced", "1 cup rice"]);
    }

    #[test]
    fn test_does_not_sum_quantities() {
        let result = deduplicate_ingredients(&["2 eggs", "3 eggs"], false);
        assert_eq!(result, vec!["2 eggs"]);
    }

    #[test]
    fn test_distinct_ingredients_survive() {
        let result = deduplicate_ingredients(&["olive oil", "sesame oil", "salt"], false);
        assert_eq!(result.len(), 3);
    }
}
