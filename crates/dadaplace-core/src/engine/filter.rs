//! Candidate filtering.
//!
//! Narrows the catalog to items that fit the weather and the occasion, or
//! to items that can be worn next to a chosen starting item.

use crate::primitives::{COLD_BELOW_CELSIUS, HOT_ABOVE_CELSIUS, NEUTRAL_COLORS};
use crate::types::{ClothingItem, Occasion, Season};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// TEMPERATURE BAND
// =============================================================================

/// Coarse weather bucket derived from a Celsius reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureBand {
    /// Strictly below 10°C.
    Cold,
    /// 10°C to 25°C inclusive.
    Mild,
    /// Strictly above 25°C.
    Hot,
}

impl TemperatureBand {
    #[must_use]
    pub fn from_celsius(temperature: i32) -> Self {
        if temperature < COLD_BELOW_CELSIUS {
            Self::Cold
        } else if temperature > HOT_ABOVE_CELSIUS {
            Self::Hot
        } else {
            Self::Mild
        }
    }

    /// The two seasons whose items suit this band.
    #[must_use]
    pub fn seasons(&self) -> [Season; 2] {
        match self {
            Self::Cold => [Season::Winter, Season::Autumn],
            Self::Hot => [Season::Summer, Season::Spring],
            Self::Mild => [Season::Spring, Season::Autumn],
        }
    }

    /// Check whether an item carries one of the band's seasons.
    #[must_use]
    pub fn admits(&self, item: &ClothingItem) -> bool {
        self.seasons().iter().any(|s| item.has_season(*s))
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Mild => "mild",
            Self::Hot => "hot",
        }
    }
}

impl fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// FILTERS
// =============================================================================

/// Items wearable at `temperature` for `occasion`, in input order.
///
/// Casual items are always acceptable, whatever the occasion.
#[must_use]
pub fn filter_candidates(
    items: &[ClothingItem],
    temperature: i32,
    occasion: Occasion,
) -> Vec<ClothingItem> {
    let band = TemperatureBand::from_celsius(temperature);
    items
        .iter()
        .filter(|item| band.admits(item))
        .filter(|item| item.has_occasion(occasion) || item.has_occasion(Occasion::Casual))
        .cloned()
        .collect()
}

/// Items that can complete an outfit around `start`, in input order.
///
/// Drops the starting item itself and every item of its category. The rest
/// must share an occasion with the starting item (or be casual) and have a
/// compatible color. Temperature is not considered here.
#[must_use]
pub fn filter_compatible(items: &[ClothingItem], start: &ClothingItem) -> Vec<ClothingItem> {
    items
        .iter()
        .filter(|item| item.id != start.id && item.category != start.category)
        .filter(|item| {
            item.occasions.iter().any(|o| start.has_occasion(*o))
                || item.has_occasion(Occasion::Casual)
        })
        .filter(|item| is_color_compatible(&item.base_color, &start.base_color))
        .cloned()
        .collect()
}

/// Check whether a color is one of the neutrals (case-insensitive).
#[must_use]
pub fn is_neutral(color: &str) -> bool {
    let color = color.trim();
    NEUTRAL_COLORS.iter().any(|n| n.eq_ignore_ascii_case(color))
}

/// Color compatibility between two items.
///
/// Neutrals go with everything and a color goes with itself. There is no
/// palette model yet, so any other pairing is accepted as well.
#[must_use]
pub fn is_color_compatible(a: &str, b: &str) -> bool {
    if is_neutral(a) || is_neutral(b) {
        return true;
    }
    if a.trim().eq_ignore_ascii_case(b.trim()) {
        return true;
    }
    // TODO: reject clashing pairs once items carry a palette family.
    true
}

// =============================================================================
// TESTS
// =============================================================================
