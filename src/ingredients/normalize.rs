use futures::future::join_all;
use log::{info, warn};

use super::parser::parse_ingredient_line;
use crate::model::ParsedIngredient;
use crate::services::TextService;

/// Structures a batch of ingredient lines with the text service, one
/// concurrent call per line.
///
/// A line whose call fails falls back to the local parser; the batch itself
/// never fails. Output order matches input order.
pub async fn normalize_ingredients<S: AsRef<str>>(
    service: &dyn TextService,
    lines: &[S],
) -> Vec<ParsedIngredient> {
    let calls = lines.iter().map(|line| {
        let line = line.as_ref();
        async move {
            match service.normalize_ingredient(line).await {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!("Normalizing '{}' failed ({}), parsing locally", line, e);
                    parse_ingredient_line(line)
                }
            }
        }
    });

    let parsed = join_all(calls).await;
    info!("Normalized {} ingredient lines", parsed.len());
    parsed
}
