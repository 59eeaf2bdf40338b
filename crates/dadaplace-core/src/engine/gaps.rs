//! Wardrobe gap analysis.
//!
//! Reports what is missing for basic outfits and for the requested occasion,
//! with purchase suggestions. Gaps come back highest priority first.

use crate::primitives::{
    BASIC_BOTTOMS, BASIC_TOPS, BOTTOM_GAP_PRIORITY, MIN_ITEMS_PER_OCCASION, OCCASION_GAP_PRIORITY,
    TOP_GAP_PRIORITY,
};
use crate::types::{Category, ClothingGap, ClothingItem, Occasion};

/// Suggested purchases for an occasion with too few items.
#[must_use]
pub fn occasion_suggestions(occasion: Occasion) -> &'static [&'static str] {
    match occasion {
        Occasion::Work => &["shirt", "blazer", "dress trousers"],
        Occasion::Sport => &["sports T-shirt", "track pants", "sneakers"],
        Occasion::Formal => &["dress shirt", "suit", "leather shoes"],
        Occasion::Date => &["dress", "heels", "small bag"],
        Occasion::Casual | Occasion::Interview | Occasion::Fitness => {
            &["T-shirt", "jeans", "casual shoes"]
        }
    }
}

fn suggestions(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| (*s).to_string()).collect()
}

/// Find gaps in `items` for `occasion`.
///
/// Only items tagged with exactly this occasion count towards it; casual
/// items do not fill a work gap.
#[must_use]
pub fn find_gaps(items: &[ClothingItem], occasion: Occasion) -> Vec<ClothingGap> {
    let has = |category: Category| items.iter().any(|i| i.category == category);
    let mut gaps = Vec::new();

    if !has(Category::Top) {
        gaps.push(ClothingGap {
            category: Category::Top,
            description: "Missing basic tops".to_string(),
            recommended_items: suggestions(BASIC_TOPS),
            priority: TOP_GAP_PRIORITY,
        });
    }
    if !has(Category::Bottom) {
        gaps.push(ClothingGap {
            category: Category::Bottom,
            description: "Missing basic bottoms".to_string(),
            recommended_items: suggestions(BASIC_BOTTOMS),
            priority: BOTTOM_GAP_PRIORITY,
        });
    }

    let tagged = items.iter().filter(|i| i.has_occasion(occasion)).count();
    if tagged < MIN_ITEMS_PER_OCCASION {
        gaps.push(ClothingGap {
            category: Category::Top,
            description: format!("Missing clothes for {occasion}"),
            recommended_items: suggestions(occasion_suggestions(occasion)),
            priority: OCCASION_GAP_PRIORITY,
        });
    }

    gaps.sort_by(|a, b| b.priority.cmp(&a.priority));
    gaps
}
