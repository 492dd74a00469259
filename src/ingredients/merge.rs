//! Combining two parsed ingredient lists into one shopping list.
//!
//! Entries are keyed by lower-cased name. Compatible units are summed in the
//! best common unit; incompatible ones stay as separate line items whose key
//! carries the unit category, e.g. `sugar (weight)`.

use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use super::units::{
    best_common_unit, convert, format_quantity, normalize_unit, unit_category, units_compatible,
    UnitCategory,
};
use crate::model::{Amount, ParsedIngredient, QuantityRange};

#[derive(Error, Debug, PartialEq)]
pub enum MergeError {
    #[error("non-finite amount for '{0}'")]
    InvalidAmount(String),

    #[error("cannot convert {from} to {to}")]
    Conversion { from: String, to: String },
}

/// An entry of a merged ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedIngredient {
    /// Identity key; the name, plus the unit category when it had to be kept apart
    pub key: String,
    pub name: String,
    pub amount: Amount,
    pub unit: String,
    /// Number of input entries folded into this one
    pub sources: usize,
}

impl MergedIngredient {
    pub fn quantity(&self) -> Option<f64> {
        self.amount.quantity()
    }

    pub fn range(&self) -> Option<QuantityRange> {
        self.amount.as_range()
    }

    /// Scalar used for sorting and estimates; the midpoint for ranges.
    pub fn estimate(&self) -> f64 {
        self.amount.estimate()
    }

    /// Quantity as shown to a user. Ranges keep both bounds.
    pub fn display_quantity(&self) -> String {
        match self.amount {
            Amount::Scalar { quantity } => format_quantity(quantity),
            Amount::Range { min, max } => {
                format!("{}-{}", format_quantity(min), format_quantity(max))
            }
        }
    }

    /// "2 cup flour", "1-2 clove garlic", or just the name when there is no amount.
    pub fn display(&self) -> String {
        let quantity = match self.amount {
            Amount::Scalar { quantity } if quantity == 0.0 => None,
            _ => Some(self.display_quantity()),
        };
        [quantity.as_deref(), Some(self.unit.as_str()), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<&ParsedIngredient> for MergedIngredient {
    fn from(parsed: &ParsedIngredient) -> Self {
        MergedIngredient {
            key: identity_key(&parsed.name),
            name: parsed.name.clone(),
            amount: parsed.amount,
            unit: parsed.unit.clone(),
            sources: 1,
        }
    }
}

fn identity_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Disambiguates entries kept apart from a same-named one. Volume and
/// weight units share one label per category so later compatible items
/// still find them.
fn unit_label(unit: &str) -> String {
    match unit_category(unit) {
        Some(UnitCategory::Volume) => "volume".to_string(),
        Some(UnitCategory::Weight) => "weight".to_string(),
        Some(UnitCategory::Count) => normalize_unit(unit).unwrap_or(unit).to_string(),
        None if unit.trim().is_empty() => "unitless".to_string(),
        None => unit.trim().to_lowercase(),
    }
}

/// Merges two ingredient lists, sorted by name.
///
/// A failure while combining one entry keeps that entry separate. If the
/// whole merge fails, falls back to [`additive_merge`].
pub fn merge_ingredient_lists(
    a: &[ParsedIngredient],
    b: &[ParsedIngredient],
) -> Vec<MergedIngredient> {
    match try_merge_ingredient_lists(a, b) {
        Ok(merged) => merged,
        Err(e) => {
            warn!("Unit-aware merge failed ({}), using additive merge", e);
            additive_merge(a, b)
        }
    }
}

/// Unit-aware merge. Fails only when an input carries a non-finite amount.
pub fn try_merge_ingredient_lists(
    a: &[ParsedIngredient],
    b: &[ParsedIngredient],
) -> Result<Vec<MergedIngredient>, MergeError> {
    if let Some(bad) = a.iter().chain(b).find(|p| !p.amount.is_finite()) {
        return Err(MergeError::InvalidAmount(bad.name.clone()));
    }

    let mut entries: BTreeMap<String, MergedIngredient> = BTreeMap::new();
    for parsed in a.iter().chain(b) {
        absorb(&mut entries, MergedIngredient::from(parsed));
    }

    Ok(sorted(entries.into_values().collect()))
}

/// Sums amounts of entries with the same name and unit, ignoring unit
/// conversion entirely.
pub fn additive_merge(a: &[ParsedIngredient], b: &[ParsedIngredient]) -> Vec<MergedIngredient> {
    let mut entries: BTreeMap<(String, String), MergedIngredient> = BTreeMap::new();
    for parsed in a.iter().chain(b) {
        let item = MergedIngredient::from(parsed);
        let slot = (item.key.clone(), item.unit.to_lowercase());
        let amount = item.amount;
        entries
            .entry(slot)
            .and_modify(|existing| {
                existing.amount = add_amounts(existing.amount, amount);
                existing.sources += 1;
            })
            .or_insert(item);
    }
    sorted(entries.into_values().collect())
}

fn sorted(mut items: Vec<MergedIngredient>) -> Vec<MergedIngredient> {
    items.sort_by(|x, y| x.name.cmp(&y.name).then_with(|| x.key.cmp(&y.key)));
    items
}

fn absorb(entries: &mut BTreeMap<String, MergedIngredient>, item: MergedIngredient) {
    // every entry sharing the name, the plain-name one first
    let candidates: Vec<String> = entries
        .iter()
        .filter(|(_, existing)| identity_key(&existing.name) == item.key)
        .map(|(key, _)| key.clone())
        .collect();

    for key in candidates {
        match combine(&entries[&key], &item) {
            Ok(Some(merged)) => {
                entries.insert(key, merged);
                return;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(
                    "Could not merge '{}' into '{}', keeping it separate: {}",
                    item.name, key, e
                );
            }
        }
    }

    let label = unit_label(&item.unit);
    let mut key = item.key.clone();
    let mut attempt = 0;
    while entries.contains_key(&key) {
        attempt += 1;
        key = if attempt == 1 {
            format!("{} ({})", item.key, label)
        } else {
            format!("{} ({}) #{}", item.key, label, attempt)
        };
    }
    if attempt > 0 {
        debug!("Keeping '{}' apart as '{}'", item.name, key);
    }

    let mut item = item;
    item.key = key.clone();
    entries.insert(key, item);
}

/// Combines two entries with the same key. `Ok(None)` means the units
/// cannot be summed and the entries must stay separate.
fn combine(
    existing: &MergedIngredient,
    item: &MergedIngredient,
) -> Result<Option<MergedIngredient>, MergeError> {
    if !units_compatible(&existing.unit, &item.unit) {
        return Ok(None);
    }

    let (unit, left, right) = if existing.unit.is_empty() && item.unit.is_empty() {
        (String::new(), existing.amount, item.amount)
    } else {
        let total_in_existing = existing.estimate()
            + convert(item.estimate(), &item.unit, &existing.unit).unwrap_or(item.estimate());
        match best_common_unit(&existing.unit, &item.unit, total_in_existing) {
            Some(best) => {
                let left = scale(existing.amount, &existing.unit, best)?;
                let right = scale(item.amount, &item.unit, best)?;
                (best.to_string(), left, right)
            }
            // Same unrecognized unit on both sides
            None => (existing.unit.clone(), existing.amount, item.amount),
        }
    };

    let amount = add_amounts(left, right);
    if !amount.is_finite() {
        return Err(MergeError::InvalidAmount(existing.name.clone()));
    }

    Ok(Some(MergedIngredient {
        key: existing.key.clone(),
        name: existing.name.clone(),
        amount,
        unit,
        sources: existing.sources + item.sources,
    }))
}

fn scale(amount: Amount, from: &str, to: &str) -> Result<Amount, MergeError> {
    let factor = convert(1.0, from, to).ok_or_else(|| MergeError::Conversion {
        from: from.to_string(),
        to: to.to_string(),
    })?;
    Ok(amount.map(|v| v * factor))
}

fn add_amounts(left: Amount, right: Amount) -> Amount {
    match (left, right) {
        (Amount::Scalar { quantity: a }, Amount::Scalar { quantity: b }) => Amount::scalar(a + b),
        (Amount::Range { min: a, max: b }, Amount::Range { min: c, max: d }) => Amount::Range {
            min: a + c,
            max: b + d,
        },
        (Amount::Range { min, max }, Amount::Scalar { quantity })
        | (Amount::Scalar { quantity }, Amount::Range { min, max }) => Amount::Range {
            min: min + quantity,
            max: max + quantity,
        },
    }
}
