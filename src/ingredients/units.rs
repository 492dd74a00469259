//! Unit normalization, conversion and display formatting.
//!
//! Volume units convert through the cup, weight units through the ounce.
//! Count-like units (cloves, cans, pinches) and unrecognized units only
//! combine with themselves.

use serde::Serialize;
use std::fmt;

const GRAMS_PER_OUNCE: f64 = 28.35;
const MILLILITERS_PER_CUP: f64 = 236.588;

/// Readable magnitude window used when picking a display unit.
const READABLE_MIN: f64 = 1.0;
const READABLE_MAX: f64 = 1000.0;

const FRACTION_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitCategory {
    Volume,
    Weight,
    Count,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Teaspoon,
    Tablespoon,
    FluidOunce,
    Cup,
    Pint,
    Quart,
    Gallon,
    Milliliter,
    Liter,
    Gram,
    Ounce,
    Pound,
    Kilogram,
    Clove,
    Can,
    Bunch,
    Pinch,
    Dash,
    Slice,
    Piece,
    Stick,
    Sprig,
    Head,
    Package,
}

const IMPERIAL_VOLUME: [Unit; 6] = [
    Unit::Teaspoon,
    Unit::Tablespoon,
    Unit::Cup,
    Unit::Pint,
    Unit::Quart,
    Unit::Gallon,
];
const METRIC_VOLUME: [Unit; 2] = [Unit::Milliliter, Unit::Liter];
const IMPERIAL_WEIGHT: [Unit; 2] = [Unit::Ounce, Unit::Pound];
const METRIC_WEIGHT: [Unit; 2] = [Unit::Gram, Unit::Kilogram];

impl Unit {
    /// Parses a unit token such as "Tbsp.", "cups" or "g".
    pub fn from_token(token: &str) -> Option<Unit> {
        let token = token.trim().trim_end_matches('.');
        // "T" and "t" are the only case-sensitive abbreviations
        match token {
            "T" | "Tb" | "TB" => return Some(Unit::Tablespoon),
            "t" => return Some(Unit::Teaspoon),
            _ => {}
        }

        let unit = match token.to_lowercase().as_str() {
            "tsp" | "tsps" | "teaspoon" | "teaspoons" => Unit::Teaspoon,
            "tbsp" | "tbsps" | "tbs" | "tbl" | "tablespoon" | "tablespoons" => Unit::Tablespoon,
            "fl oz" | "fl. oz" | "fluid ounce" | "fluid ounces" | "floz" => Unit::FluidOunce,
            "c" | "cup" | "cups" => Unit::Cup,
            "pt" | "pint" | "pints" => Unit::Pint,
            "qt" | "quart" | "quarts" => Unit::Quart,
            "gal" | "gallon" | "gallons" => Unit::Gallon,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => {
                Unit::Milliliter
            }
            "l" | "liter" | "liters" | "litre" | "litres" => Unit::Liter,
            "g" | "gr" | "gram" | "grams" | "gramme" | "grammes" => Unit::Gram,
            "oz" | "ounce" | "ounces" => Unit::Ounce,
            "lb" | "lbs" | "pound" | "pounds" => Unit::Pound,
            "kg" | "kgs" | "kilogram" | "kilograms" => Unit::Kilogram,
            "clove" | "cloves" => Unit::Clove,
            "can" | "cans" => Unit::Can,
            "bunch" | "bunches" => Unit::Bunch,
            "pinch" | "pinches" => Unit::Pinch,
            "dash" | "dashes" => Unit::Dash,
            "slice" | "slices" => Unit::Slice,
            "piece" | "pieces" | "pc" | "pcs" => Unit::Piece,
            "stick" | "sticks" => Unit::Stick,
            "sprig" | "sprigs" => Unit::Sprig,
            "head" | "heads" => Unit::Head,
            "package" | "packages" | "pkg" | "packet" | "packets" => Unit::Package,
            _ => return None,
        };
        Some(unit)
    }

    /// Canonical singular name.
    pub fn name(&self) -> &'static str {
        match self {
            Unit::Teaspoon => "teaspoon",
            Unit::Tablespoon => "tablespoon",
            Unit::FluidOunce => "fluid ounce",
            Unit::Cup => "cup",
            Unit::Pint => "pint",
            Unit::Quart => "quart",
            Unit::Gallon => "gallon",
            Unit::Milliliter => "milliliter",
            Unit::Liter => "liter",
            Unit::Gram => "gram",
            Unit::Ounce => "ounce",
            Unit::Pound => "pound",
            Unit::Kilogram => "kilogram",
            Unit::Clove => "clove",
            Unit::Can => "can",
            Unit::Bunch => "bunch",
            Unit::Pinch => "pinch",
            Unit::Dash => "dash",
            Unit::Slice => "slice",
            Unit::Piece => "piece",
            Unit::Stick => "stick",
            Unit::Sprig => "sprig",
            Unit::Head => "head",
            Unit::Package => "package",
        }
    }

    pub fn category(&self) -> UnitCategory {
        match self {
            Unit::Teaspoon
            | Unit::Tablespoon
            | Unit::FluidOunce
            | Unit::Cup
            | Unit::Pint
            | Unit::Quart
            | Unit::Gallon
            | Unit::Milliliter
            | Unit::Liter => UnitCategory::Volume,
            Unit::Gram | Unit::Ounce | Unit::Pound | Unit::Kilogram => UnitCategory::Weight,
            _ => UnitCategory::Count,
        }
    }

    /// How many base units (cups or ounces) one of this unit holds.
    /// Count units are their own base.
    fn base_factor(&self) -> f64 {
        match self {
            Unit::Teaspoon => 1.0 / 48.0,
            Unit::Tablespoon => 1.0 / 16.0,
            Unit::FluidOunce => 1.0 / 8.0,
            Unit::Cup => 1.0,
            Unit::Pint => 2.0,
            Unit::Quart => 4.0,
            Unit::Gallon => 16.0,
            Unit::Milliliter => 1.0 / MILLILITERS_PER_CUP,
            Unit::Liter => 1000.0 / MILLILITERS_PER_CUP,
            Unit::Gram => 1.0 / GRAMS_PER_OUNCE,
            Unit::Ounce => 1.0,
            Unit::Pound => 16.0,
            Unit::Kilogram => 1000.0 / GRAMS_PER_OUNCE,
            _ => 1.0,
        }
    }

    fn is_metric(&self) -> bool {
        matches!(
            self,
            Unit::Milliliter | Unit::Liter | Unit::Gram | Unit::Kilogram
        )
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Canonical unit name for a token, `None` when the token is not a unit.
pub fn normalize_unit(token: &str) -> Option<&'static str> {
    Unit::from_token(token).map(|u| u.name())
}

/// Category of a unit token. Empty and unrecognized tokens have none.
pub fn unit_category(token: &str) -> Option<UnitCategory> {
    Unit::from_token(token).map(|u| u.category())
}

/// True when quantities in `a` and `b` can be summed.
///
/// Identical tokens (including two empty ones) always combine; otherwise
/// both must be recognized volume or weight units of the same category.
pub fn units_compatible(a: &str, b: &str) -> bool {
    if a.trim().eq_ignore_ascii_case(b.trim()) {
        return true;
    }
    match (Unit::from_token(a), Unit::from_token(b)) {
        (Some(ua), Some(ub)) if ua == ub => true,
        (Some(ua), Some(ub)) => {
            ua.category() == ub.category() && ua.category() != UnitCategory::Count
        }
        _ => false,
    }
}

/// Converts `quantity` from one unit to another.
///
/// Returns `None` when either unit is unrecognized or the categories
/// differ. Count units only convert to themselves.
pub fn convert(quantity: f64, from_unit: &str, to_unit: &str) -> Option<f64> {
    let from = Unit::from_token(from_unit)?;
    let to = Unit::from_token(to_unit)?;
    if from == to {
        return Some(quantity);
    }
    if from.category() != to.category() || from.category() == UnitCategory::Count {
        return None;
    }
    Some(quantity * from.base_factor() / to.base_factor())
}

fn hierarchy_for(a: Unit, b: Unit) -> &'static [Unit] {
    let metric = a.is_metric() && b.is_metric();
    match (a.category(), metric) {
        (UnitCategory::Volume, true) => &METRIC_VOLUME,
        (UnitCategory::Volume, false) => &IMPERIAL_VOLUME,
        (UnitCategory::Weight, true) => &METRIC_WEIGHT,
        (UnitCategory::Weight, false) => &IMPERIAL_WEIGHT,
        (UnitCategory::Count, _) => &[],
    }
}

/// Picks the display unit for a merged total of two compatible units.
///
/// `total_in_a` is the combined amount expressed in `unit_a`. Walks the
/// category hierarchy upward from the larger input unit and returns the
/// first unit in which the total lands in `[1, 1000)`, or the starting unit
/// when none does. Returns `None` for incompatible or unrecognized units.
pub fn best_common_unit(unit_a: &str, unit_b: &str, total_in_a: f64) -> Option<&'static str> {
    let a = Unit::from_token(unit_a)?;
    let b = Unit::from_token(unit_b)?;
    if a.category() != b.category() {
        return None;
    }
    if a.category() == UnitCategory::Count {
        return (a == b).then(|| a.name());
    }

    let larger = if b.base_factor() > a.base_factor() { b } else { a };
    let hierarchy = hierarchy_for(a, b);
    let start = hierarchy
        .iter()
        .position(|u| u.base_factor() >= larger.base_factor() * (1.0 - 1e-9))
        .unwrap_or(hierarchy.len() - 1);

    let total_base = total_in_a * a.base_factor();
    let chosen = hierarchy[start..]
        .iter()
        .find(|u| {
            let value = total_base / u.base_factor();
            (READABLE_MIN..READABLE_MAX).contains(&value)
        })
        .unwrap_or(&hierarchy[start]);

    Some(chosen.name())
}

const COMMON_FRACTIONS: [(f64, &str); 9] = [
    (0.125, "1/8"),
    (0.25, "1/4"),
    (1.0 / 3.0, "1/3"),
    (0.375, "3/8"),
    (0.5, "1/2"),
    (0.625, "5/8"),
    (2.0 / 3.0, "2/3"),
    (0.75, "3/4"),
    (0.875, "7/8"),
];

/// Renders a quantity for display: the nearest common cooking fraction
/// within 0.05 when there is one, otherwise two decimal places.
pub fn format_quantity(value: f64) -> String {
    if !value.is_finite() || value < 0.0 {
        return format!("{:.2}", value);
    }

    let whole = value.floor();
    let frac = value - whole;

    if frac < FRACTION_TOLERANCE && whole > 0.0 {
        return format!("{}", whole as i64);
    }
    if 1.0 - frac < FRACTION_TOLERANCE {
        return format!("{}", whole as i64 + 1);
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let nearest = COMMON_FRACTIONS
        .iter()
        .map(|(v, s)| ((frac - v).abs(), *s))
        .min_by(|x, y| x.0.total_cmp(&y.0));

    match nearest {
        Some((distance, text)) if distance <= FRACTION_TOLERANCE => {
            if whole > 0.0 {
                format!("{} {}", whole as i64, text)
            } else {
                text.to_string()
            }
        }
        _ => format!("{:.2}", value),
    }
}
