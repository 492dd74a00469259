use recipe_harvest::{
    deduplicate_ingredients, merge_ingredient_lists, parse_ingredient_line, parse_ingredients,
};

#[test]
fn test_vulgar_fraction_line() {
    let parsed = parse_ingredient_line("⅛ teaspoon turmeric");
    assert_eq!(parsed.quantity(), Some(0.125));
    assert_eq!(parsed.unit, "teaspoon");
    assert_eq!(parsed.name, "turmeric");
    assert_eq!(parsed.original, "⅛ teaspoon turmeric");
}

#[test]
fn test_shopping_list_from_two_recipes() {
    let pancakes = parse_ingredients(&["1 cup milk", "2 eggs", "1 1/2 cups flour"]);
    let omelette = parse_ingredients(&["1/2 cup milk", "3 eggs", "salt"]);

    let merged = merge_ingredient_lists(&pancakes, &omelette);
    let lines: Vec<String> = merged.iter().map(|m| m.display()).collect();

    assert_eq!(lines, vec!["5 eggs", "1 1/2 cup flour", "1 1/2 cup milk", "salt"]);
}

#[test]
fn test_ranges_survive_merging() {
    let list = parse_ingredients(&["1-2 cups shrimp"]);
    let merged = merge_ingredient_lists(&list, &list);

    assert_eq!(merged.len(), 1);
    let range = merged[0].range().unwrap();
    assert_eq!((range.min, range.max), (2.0, 4.0));
    assert_eq!(merged[0].sources, 2);
}

#[test]
fn test_dedup_then_parse() {
    let mentions = [
        "chicken thighs",
        "1 large onion, diced",
        "2 lb boneless skinless chicken thighs",
        "onion",
    ];

    let unique = deduplicate_ingredients(&mentions, false);
    assert_eq!(
        unique,
        vec!["2 lb boneless skinless chicken thighs", "1 large onion, diced"]
    );

    let parsed = parse_ingredients(&unique);
    assert_eq!(parsed[0].quantity(), Some(2.0));
    assert_eq!(parsed[0].unit, "pound");
}
