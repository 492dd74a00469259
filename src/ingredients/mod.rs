//! Ingredient line parsing, unit conversion, list merging and deduplication.

pub mod dedup;
pub mod merge;
pub mod normalize;
pub mod parser;
pub mod units;

pub use dedup::{core_ingredient_key, deduplicate_ingredients};
pub use merge::{additive_merge, merge_ingredient_lists, try_merge_ingredient_lists, MergedIngredient};
pub use normalize::normalize_ingredients;
pub use parser::{parse_ingredient_line, parse_ingredients};
pub use units::{best_common_unit, convert, format_quantity, normalize_unit, UnitCategory};
