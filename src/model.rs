use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a block of raw text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    Caption,
    Description,
    Transcript,
    FrameAnalysis,
}

impl SourceKind {
    /// Caption-like text needs explicit cooking structure before anything
    /// is extracted from it. Transcripts have already been through the
    /// content classifier.
    pub fn is_strict(&self) -> bool {
        matches!(self, SourceKind::Caption | SourceKind::Description)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Caption => "caption",
            SourceKind::Description => "description",
            SourceKind::Transcript => "transcript",
            SourceKind::FrameAnalysis => "frame-analysis",
        };
        write!(f, "{}", name)
    }
}

/// Text produced by an acquisition collaborator, discarded after extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct RawContent {
    pub text: String,
    pub source_kind: SourceKind,
}

impl RawContent {
    pub fn new(text: impl Into<String>, source_kind: SourceKind) -> Self {
        Self {
            text: text.into(),
            source_kind,
        }
    }
}

/// Unparsed ingredient and instruction lines. All-empty is a valid value
/// meaning "no recipe in this text".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecipe {
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl ExtractedRecipe {
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty() && self.instructions.is_empty()
    }
}

/// Closed interval of an ingredient amount, e.g. "2 to 3 cloves".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuantityRange {
    pub min: f64,
    pub max: f64,
}

impl QuantityRange {
    /// Builds a range with the endpoints ordered.
    pub fn new(a: f64, b: f64) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// An ingredient amount: exactly one of a scalar or a range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Amount {
    Scalar { quantity: f64 },
    Range { min: f64, max: f64 },
}

impl Amount {
    pub fn scalar(quantity: f64) -> Self {
        Amount::Scalar { quantity }
    }

    pub fn range(range: QuantityRange) -> Self {
        Amount::Range {
            min: range.min,
            max: range.max,
        }
    }

    /// Scalar quantity, `None` for ranges.
    pub fn quantity(&self) -> Option<f64> {
        match self {
            Amount::Scalar { quantity } => Some(*quantity),
            Amount::Range { .. } => None,
        }
    }

    /// Range bounds, `None` for scalars.
    pub fn as_range(&self) -> Option<QuantityRange> {
        match self {
            Amount::Scalar { .. } => None,
            Amount::Range { min, max } => Some(QuantityRange {
                min: *min,
                max: *max,
            }),
        }
    }

    /// Scalar value used for sorting and estimates. Ranges use their midpoint.
    pub fn estimate(&self) -> f64 {
        match self {
            Amount::Scalar { quantity } => *quantity,
            Amount::Range { min, max } => (min + max) / 2.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Amount::Scalar { quantity } => quantity.is_finite(),
            Amount::Range { min, max } => min.is_finite() && max.is_finite(),
        }
    }

    /// Applies `f` to every numeric component.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        match self {
            Amount::Scalar { quantity } => Amount::Scalar {
                quantity: f(quantity),
            },
            Amount::Range { min, max } => Amount::Range {
                min: f(min),
                max: f(max),
            },
        }
    }
}

/// One structured ingredient line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    pub name: String,
    pub amount: Amount,
    /// Canonical unit name, empty when the line has no unit.
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preparation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub confidence: f32,
    pub original: String,
}

impl ParsedIngredient {
    pub fn quantity(&self) -> Option<f64> {
        self.amount.quantity()
    }

    pub fn range(&self) -> Option<QuantityRange> {
        self.amount.as_range()
    }

    pub fn has_unit(&self) -> bool {
        !self.unit.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_orders_endpoints() {
        let range = QuantityRange::new(3.0, 2.0);
        assert_eq!(range.min, 2.0);
        assert_eq!(range.max, 3.0);
        assert_eq!(range.midpoint(), 2.5);
    }

    #[test]
    fn test_amount_accessors_are_exclusive() {
        let scalar = Amount::scalar(2.0);
        assert_eq!(scalar.quantity(), Some(2.0));
        assert!(scalar.as_range().is_none());

        let range = Amount::range(QuantityRange::new(1.0, 2.0));
        assert!(range.quantity().is_none());
        assert_eq!(range.estimate(), 1.5);
    }

    #[test]
    fn test_extracted_recipe_deserializes_partial_json() {
        let recipe: ExtractedRecipe = serde_json::from_str(r#"{"ingredients": ["salt"]}"#).unwrap();
        assert_eq!(recipe.ingredients, vec!["salt"]);
        assert!(recipe.instructions.is_empty());
        assert!(!recipe.is_empty());
    }

    #[test]
    fn test_caption_sources_are_strict() {
        assert!(SourceKind::Caption.is_strict());
        assert!(SourceKind::Description.is_strict());
        assert!(!SourceKind::Transcript.is_strict());
        assert!(!SourceKind::FrameAnalysis.is_strict());
    }
}
