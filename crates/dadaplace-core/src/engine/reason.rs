//! Human-readable recommendation reasons.

use super::filter::TemperatureBand;
use super::score::distinct_colors;
use crate::types::{ClothingItem, OutfitRequest};

/// Separator between reason phrases.
pub const REASON_SEPARATOR: &str = "; ";

/// Phrase describing how an outfit suits the weather band.
#[must_use]
pub fn band_phrase(band: TemperatureBand) -> &'static str {
    match band {
        TemperatureBand::Cold => "Suited to cold weather, keeps you warm",
        TemperatureBand::Hot => "Suited to hot weather, light and breathable",
        TemperatureBand::Mild => "Comfortable for today's temperature",
    }
}

/// Explain a recommendation in a few fixed phrases.
#[must_use]
pub fn explain(items: &[ClothingItem], request: &OutfitRequest) -> String {
    let mut phrases = vec![
        band_phrase(TemperatureBand::from_celsius(request.temperature)).to_string(),
        format!("Fits the dress code for {}", request.occasion),
    ];
    if distinct_colors(items) <= 3 {
        phrases.push("Harmonious colors with clear layering".to_string());
    }
    phrases.push("Consistent overall style".to_string());
    phrases.join(REASON_SEPARATOR)
}
