//! Free-text ingredient line parsing.
//!
//! Turns lines such as `"1 ½ cups olive oil, warmed"` or
//! `"Shrimp (approximately 1-2 cups)"` into a [`ParsedIngredient`].
//! Parsing never fails: anything unrecognizable comes back as a degraded
//! entry with quantity 0, no unit and a low confidence.

use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::units::Unit;
use crate::model::{Amount, ParsedIngredient, QuantityRange};

/// Vulgar fraction glyphs and their exact values.
pub const VULGAR_FRACTIONS: [(char, f64); 9] = [
    ('½', 0.5),
    ('¼', 0.25),
    ('¾', 0.75),
    ('⅓', 1.0 / 3.0),
    ('⅔', 2.0 / 3.0),
    ('⅛', 0.125),
    ('⅜', 0.375),
    ('⅝', 0.625),
    ('⅞', 0.875),
];

const NUMBER: &str = r"\d+\s+\d+/\d+|\d+/\d+|\d*\.\d+|\d+";

static GLYPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)?\s*([½¼¾⅓⅔⅛⅜⅝⅞])").expect("valid glyph regex"));

static LEADING_QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<approx>(?:~|≈|about|approx\.?|approximately|around|roughly)\s*)?(?P<q1>{n})(?:\s*(?:-|to|or)\s*~?\s*(?P<q2>{n}))?(?P<rest>.*)$",
        n = NUMBER
    ))
    .expect("valid quantity regex")
});

static NUMBER_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?P<word>a dozen|an?|one|two|three|four|five|six|seven|eight|nine|ten|twelve|half|dozen)\s+(?P<rest>.*)$",
    )
    .expect("valid number word regex")
});

static ASIDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^)]*)\)|\[([^\]]*)\]").expect("valid aside regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const TRAILING_NOTES: [&str; 5] = ["to taste", "as needed", "for garnish", "for serving", "optional"];

/// How the amount was found; drives the confidence score.
#[derive(Debug, Clone, Copy, PartialEq)]
enum AmountSource {
    Leading,
    Parenthetical,
    Missing,
}

struct LeadingQuantity<'a> {
    amount: Amount,
    approximate: bool,
    rest: &'a str,
}

/// Parses one ingredient line.
pub fn parse_ingredient_line(text: &str) -> ParsedIngredient {
    let prepared = prepare(text);
    if prepared.is_empty() {
        return degraded(text);
    }

    if let Some(lead) = leading_quantity(&prepared) {
        let rest = lead.rest.trim_start_matches(|c: char| c == '-' || c.is_whitespace());
        let (leading_aside, rest) = take_leading_aside(rest);
        let (unit, rest) = take_unit(rest);
        let mut parsed = build(text, lead.amount, unit, rest, AmountSource::Leading);
        if let Some(aside) = leading_aside {
            push_note(&mut parsed, aside);
        }
        if lead.approximate {
            parsed.confidence -= 0.05;
        }
        return parsed;
    }

    if let Some(parsed) = parenthetical_quantity(text, &prepared) {
        return parsed;
    }

    build(text, Amount::scalar(0.0), None, &prepared, AmountSource::Missing)
}

/// Parses every line, one entry per input line.
pub fn parse_ingredients<S: AsRef<str>>(lines: &[S]) -> Vec<ParsedIngredient> {
    lines
        .iter()
        .map(|line| parse_ingredient_line(line.as_ref()))
        .collect()
}

/// Value of a vulgar fraction glyph.
pub fn vulgar_fraction_value(glyph: char) -> Option<f64> {
    VULGAR_FRACTIONS
        .iter()
        .find(|(c, _)| *c == glyph)
        .map(|(_, v)| *v)
}

/// Normalizes dashes and fraction glyphs, strips list bullets and collapses
/// whitespace. "1 ½" and "1½" both become "1.5".
fn prepare(text: &str) -> String {
    let text = text
        .replace(['–', '—'], "-")
        .replace('⁄', "/")
        .replace('\u{a0}', " ");

    let text = GLYPH.replace_all(&text, |caps: &Captures| {
        let whole = caps
            .get(1)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0);
        let glyph = caps[2].chars().next().and_then(vulgar_fraction_value);
        match glyph {
            Some(value) => format!(" {}", whole + value),
            None => caps[0].to_string(),
        }
    });

    let text = WHITESPACE.replace_all(text.trim(), " ");
    text.trim_start_matches(['-', '*', '•', '▢', '✓', '·'])
        .trim()
        .to_string()
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.contains('/') {
        let mut parts = text.split_whitespace();
        let first = parts.next()?;
        let (whole, fraction) = match parts.next() {
            Some(fraction) => (first.parse::<f64>().ok()?, fraction),
            None => (0.0, first),
        };
        let (num, den) = fraction.split_once('/')?;
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 {
            return None;
        }
        Some(whole + num / den)
    } else {
        text.parse().ok()
    }
}

fn leading_quantity(text: &str) -> Option<LeadingQuantity<'_>> {
    if let Some(caps) = LEADING_QUANTITY.captures(text) {
        let q1 = parse_number(caps.name("q1")?.as_str())?;
        let amount = match caps.name("q2").and_then(|m| parse_number(m.as_str())) {
            Some(q2) => Amount::range(QuantityRange::new(q1, q2)),
            None => Amount::scalar(q1),
        };
        let rest = caps.name("rest").map_or("", |m| m.as_str());
        return Some(LeadingQuantity {
            amount,
            approximate: caps.name("approx").is_some(),
            rest,
        });
    }

    let caps = NUMBER_WORD.captures(text)?;
    let word = caps.name("word")?.as_str().to_lowercase();
    let rest = caps.name("rest").map_or("", |m| m.as_str());
    let value = match word.as_str() {
        // "a"/"an" only count as a quantity in front of a unit
        "a" | "an" => {
            take_unit(rest).0?;
            1.0
        }
        "one" => 1.0,
        "two" => 2.0,
        "three" => 3.0,
        "four" => 4.0,
        "five" => 5.0,
        "six" => 6.0,
        "seven" => 7.0,
        "eight" => 8.0,
        "nine" => 9.0,
        "ten" => 10.0,
        "twelve" | "dozen" | "a dozen" => 12.0,
        "half" => 0.5,
        _ => return None,
    };
    let rest = rest
        .strip_prefix("a ")
        .or_else(|| rest.strip_prefix("an "))
        .unwrap_or(rest);
    Some(LeadingQuantity {
        amount: Amount::scalar(value),
        approximate: false,
        rest,
    })
}

/// Splits a unit token off the front of `text`. The token must be followed
/// by whitespace or the end of the text, so "g" never matches "garlic".
fn take_unit(text: &str) -> (Option<Unit>, &str) {
    let mut words = text.splitn(3, ' ');
    let first = words.next().unwrap_or("");
    let second = words.next();

    if let Some(second) = second {
        let pair = format!("{} {}", first, second);
        if let Some(unit) = Unit::from_token(&pair) {
            let rest = text[pair.len()..].trim_start();
            return (Some(unit), rest);
        }
    }

    // "2 cups, sifted flour"
    let bare = first.trim_end_matches([',', ';']);
    match Unit::from_token(bare) {
        Some(unit) if !bare.is_empty() => (Some(unit), text[first.len()..].trim_start()),
        _ => (None, text),
    }
}

/// Strips a parenthetical directly after the quantity, e.g. the "(14 oz)"
/// in "1 (14 oz) can tomatoes".
fn take_leading_aside(text: &str) -> (Option<String>, &str) {
    if !text.starts_with('(') {
        return (None, text);
    }
    match text.find(')') {
        Some(end) => (
            Some(text[1..end].trim().to_string()),
            text[end + 1..].trim_start(),
        ),
        None => (None, text),
    }
}

/// Looks for an amount inside a parenthetical when the line has no leading
/// quantity, e.g. "Shrimp (approximately 1-2 cups)".
fn parenthetical_quantity(original: &str, prepared: &str) -> Option<ParsedIngredient> {
    let open = prepared.find('(')?;
    let name_part = prepared[..open].trim();
    if name_part.is_empty() {
        return None;
    }

    for caps in ASIDE.captures_iter(prepared) {
        let inner = match caps.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };
        let lead = match inner.find(|c: char| c.is_ascii_digit() || c == '.') {
            Some(start) => {
                let prefix = inner[..start].trim();
                let approximate = !prefix.is_empty();
                leading_quantity(&inner[start..]).map(|mut lead| {
                    lead.approximate |= approximate;
                    lead
                })
            }
            None => None,
        };
        if let Some(lead) = lead {
            let (unit, _) = take_unit(lead.rest.trim_start());
            debug!("Found parenthetical quantity in '{}'", original);
            let span = caps.get(0).map_or(0..0, |m| m.range());
            let remainder = format!("{}{}", &prepared[..span.start], &prepared[span.end..]);
            let tail = remainder.get(open..).unwrap_or("").trim();
            let text = if tail.is_empty() {
                name_part.to_string()
            } else {
                format!("{} {}", name_part, tail)
            };
            let mut parsed = build(
                original,
                lead.amount,
                unit,
                &text,
                AmountSource::Parenthetical,
            );
            if lead.approximate {
                parsed.confidence -= 0.05;
            }
            return Some(parsed);
        }
    }
    None
}

fn build(
    original: &str,
    amount: Amount,
    unit: Option<Unit>,
    text: &str,
    source: AmountSource,
) -> ParsedIngredient {
    let mut notes = Vec::new();
    let without_asides = ASIDE.replace_all(text, |caps: &Captures| {
        let inner = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str().trim());
        if !inner.is_empty() {
            notes.push(inner.to_string());
        }
        String::from(" ")
    });

    let mut body = without_asides.trim();
    if let Some(stripped) = body.strip_prefix("of ") {
        body = stripped;
    }

    let (name_part, preparation) = match body.split_once(',') {
        Some((name, prep)) => {
            let prep = prep.trim().trim_end_matches('.').to_string();
            (name, (!prep.is_empty()).then_some(prep))
        }
        None => (body, None),
    };

    let mut name = WHITESPACE
        .replace_all(name_part.trim(), " ")
        .to_lowercase()
        .trim_matches(|c: char| c.is_ascii_punctuation() && c != '&')
        .trim()
        .to_string();

    for phrase in TRAILING_NOTES {
        if let Some(stripped) = name.strip_suffix(phrase) {
            if stripped.is_empty() || stripped.ends_with(' ') {
                notes.push(phrase.to_string());
                name = stripped.trim().to_string();
                break;
            }
        }
    }

    let mut confidence: f32 = match (source, unit.is_some()) {
        (AmountSource::Leading, true) => 0.95,
        (AmountSource::Leading, false) => 0.85,
        (AmountSource::Parenthetical, _) => 0.75,
        (AmountSource::Missing, _) => 0.5,
    };
    if name.is_empty() {
        confidence = confidence.min(0.3);
    }

    ParsedIngredient {
        name,
        amount,
        unit: unit.map(|u| u.name().to_string()).unwrap_or_default(),
        preparation,
        notes: (!notes.is_empty()).then(|| notes.join("; ")),
        confidence,
        original: original.to_string(),
    }
}

fn push_note(parsed: &mut ParsedIngredient, note: String) {
    if note.is_empty() {
        return;
    }
    parsed.notes = Some(match parsed.notes.take() {
        Some(existing) => format!("{}; {}", note, existing),
        None => note,
    });
}

fn degraded(original: &str) -> ParsedIngredient {
    ParsedIngredient {
        name: original.trim().to_lowercase(),
        amount: Amount::scalar(0.0),
        unit: String::new(),
        preparation: None,
        notes: None,
        confidence: 0.0,
        original: original.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_of(parsed: &ParsedIngredient) -> (f64, f64) {
        let range = parsed.range().expect("expected a range");
        (range.min, range.max)
    }

    #[test]
    fn test_vulgar_fraction_is_exact() {
        let parsed = parse_ingredient_line("⅛ teaspoon turmeric");
        assert_eq!(parsed.quantity(), Some(0.125));
        assert_eq!(parsed.unit, "teaspoon");
        assert_eq!(parsed.name, "turmeric");
    }

    #[test]
    fn test_every_glyph_maps_to_its_constant() {
        for (glyph, value) in VULGAR_FRACTIONS {
            let parsed = parse_ingredient_line(&format!("{} cup sugar", glyph));
            assert_eq!(parsed.quantity(), Some(value), "glyph {}", glyph);
            assert_eq!(parsed.name, "sugar");
        }
    }

    #[test]
    fn test_mixed_numbers() {
        assert_eq!(parse_ingredient_line("1 ½ cups flour").quantity(), Some(1.5));
        assert_eq!(parse_ingredient_line("1½ cups flour").quantity(), Some(1.5));
        assert_eq!(parse_ingredient_line("2 3/4 cups flour").quantity(), Some(2.75));
    }

    #[test]
    fn test_simple_fraction_and_decimal() {
        let parsed = parse_ingredient_line("1/2 cup milk");
        assert_eq!(parsed.quantity(), Some(0.5));
        assert_eq!(parsed.unit, "cup");

        let parsed = parse_ingredient_line("2.5 kg potatoes");
        assert_eq!(parsed.quantity(), Some(2.5));
        assert_eq!(parsed.unit, "kilogram");
    }

    #[test]
    fn test_approximate_marker() {
        let parsed = parse_ingredient_line("~2 cups stock");
        assert_eq!(parsed.quantity(), Some(2.0));
        assert_eq!(parsed.unit, "cup");
        assert_eq!(parsed.name, "stock");
    }

    #[test]
    fn test_dash_and_word_ranges() {
        let parsed = parse_ingredient_line("2-3 cloves garlic");
        assert_eq!(range_of(&parsed), (2.0, 3.0));
        assert_eq!(parsed.unit, "clove");
        assert_eq!(parsed.name, "garlic");
        assert!(parsed.quantity().is_none());

        let parsed = parse_ingredient_line("1 to 2 tbsp honey");
        assert_eq!(range_of(&parsed), (1.0, 2.0));
        assert_eq!(parsed.unit, "tablespoon");

        let parsed = parse_ingredient_line("½–¾ cup water");
        assert_eq!(range_of(&parsed), (0.5, 0.75));
    }

    #[test]
    fn test_unit_does_not_match_inside_name() {
        let parsed = parse_ingredient_line("2 garlic cloves");
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.name, "garlic cloves");
        assert_eq!(parsed.quantity(), Some(2.0));
    }

    #[test]
    fn test_attached_unit() {
        let parsed = parse_ingredient_line("300g flour");
        assert_eq!(parsed.quantity(), Some(300.0));
        assert_eq!(parsed.unit, "gram");
        assert_eq!(parsed.name, "flour");
    }

    #[test]
    fn test_compound_names_are_kept() {
        let parsed = parse_ingredient_line("2 tbsp Extra Virgin Olive Oil");
        assert_eq!(parsed.name, "extra virgin olive oil");
    }

    #[test]
    fn test_asides_and_preparation() {
        let parsed = parse_ingredient_line("1 large onion (about 200g), finely diced");
        assert_eq!(parsed.name, "large onion");
        assert_eq!(parsed.preparation.as_deref(), Some("finely diced"));
        assert_eq!(parsed.notes.as_deref(), Some("about 200g"));
    }

    #[test]
    fn test_can_with_size_aside() {
        let parsed = parse_ingredient_line("1 (14 oz) can diced tomatoes");
        assert_eq!(parsed.quantity(), Some(1.0));
        assert_eq!(parsed.unit, "can");
        assert_eq!(parsed.name, "diced tomatoes");
        assert_eq!(parsed.notes.as_deref(), Some("14 oz"));
    }

    #[test]
    fn test_quantity_in_trailing_parenthetical() {
        let parsed = parse_ingredient_line("Shrimp (approximately 1-2 cups)");
        assert_eq!(parsed.name, "shrimp");
        assert_eq!(range_of(&parsed), (1.0, 2.0));
        assert_eq!(parsed.unit, "cup");
    }

    #[test]
    fn test_no_quantity_defaults_to_zero() {
        let parsed = parse_ingredient_line("salt");
        assert_eq!(parsed.quantity(), Some(0.0));
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.name, "salt");

        let parsed = parse_ingredient_line("Black pepper to taste");
        assert_eq!(parsed.quantity(), Some(0.0));
        assert_eq!(parsed.name, "black pepper");
        assert_eq!(parsed.notes.as_deref(), Some("to taste"));
    }

    #[test]
    fn test_number_words() {
        let parsed = parse_ingredient_line("a pinch of salt");
        assert_eq!(parsed.quantity(), Some(1.0));
        assert_eq!(parsed.unit, "pinch");
        assert_eq!(parsed.name, "salt");

        let parsed = parse_ingredient_line("two eggs");
        assert_eq!(parsed.quantity(), Some(2.0));
        assert_eq!(parsed.name, "eggs");

        // "a" without a unit is part of the name
        let parsed = parse_ingredient_line("a lemon");
        assert_eq!(parsed.quantity(), Some(0.0));
    }

    #[test]
    fn test_bullets_are_stripped() {
        let parsed = parse_ingredient_line("- 1 cup of rice");
        assert_eq!(parsed.quantity(), Some(1.0));
        assert_eq!(parsed.unit, "cup");
        assert_eq!(parsed.name, "rice");
    }

    #[test]
    fn test_unit_followed_by_comma() {
        let parsed = parse_ingredient_line("2 cups, sifted flour");
        assert_eq!(parsed.quantity(), Some(2.0));
        assert_eq!(parsed.unit, "cup");
        assert_eq!(parsed.name, "sifted flour");

        let parsed = parse_ingredient_line("3 eggs, beaten");
        assert_eq!(parsed.unit, "");
        assert_eq!(parsed.name, "eggs");
        assert_eq!(parsed.preparation.as_deref(), Some("beaten"));
    }

    #[test]
    fn test_quantity_aside_after_other_aside() {
        let parsed = parse_ingredient_line("Shrimp (peeled) (about 1-2 cups)");
        assert_eq!(parsed.name, "shrimp");
        assert_eq!(range_of(&parsed), (1.0, 2.0));
        assert_eq!(parsed.unit, "cup");
        assert_eq!(parsed.notes.as_deref(), Some("peeled"));
    }

    #[test]
    fn test_malformed_input_degrades() {
        let parsed = parse_ingredient_line("   ");
        assert_eq!(parsed.confidence, 0.0);
        assert_eq!(parsed.quantity(), Some(0.0));
        assert_eq!(parsed.original, "   ");

        let parsed = parse_ingredient_line("1/0 cup ???");
        assert!(parsed.confidence < 0.6);
    }

    #[test]
    fn test_confidence_ordering() {
        let full = parse_ingredient_line("1 cup rice");
        let no_unit = parse_ingredient_line("3 eggs");
        let missing = parse_ingredient_line("parsley");
        assert!(full.confidence > no_unit.confidence);
        assert!(no_unit.confidence > missing.confidence);
    }

    #[test]
    fn test_parse_ingredients_keeps_one_entry_per_line() {
        let parsed = parse_ingredients(&["1 cup rice", "", "salt"]);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1].confidence, 0.0);
    }
}
