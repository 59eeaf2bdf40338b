//! Combination generation.
//!
//! Builds candidate outfits by walking the first few items of each category
//! in catalog order. This is a bounded enumeration, not a search: it never
//! looks past the caps in [`crate::primitives`] and makes no attempt at
//! variety.

use crate::primitives::{
    MAX_BOTTOMS, MAX_COMBINATIONS, MAX_COMPLETING_PIECES, MAX_SHOES, MAX_STARTING_COMBINATIONS,
    MAX_TOPS,
};
use crate::types::{Category, ClothingItem};

/// One candidate outfit, items in wearing order (top, bottom, shoes, extras).
pub type Combination = Vec<ClothingItem>;

/// Candidates split by category, each keeping input order.
#[derive(Debug, Default)]
struct Grouped<'a> {
    tops: Vec<&'a ClothingItem>,
    bottoms: Vec<&'a ClothingItem>,
    shoes: Vec<&'a ClothingItem>,
    accessories: Vec<&'a ClothingItem>,
}

impl<'a> Grouped<'a> {
    fn new(items: &'a [ClothingItem]) -> Self {
        let mut grouped = Self::default();
        for item in items {
            match item.category {
                Category::Top => grouped.tops.push(item),
                Category::Bottom => grouped.bottoms.push(item),
                Category::Shoes => grouped.shoes.push(item),
                Category::Accessory => grouped.accessories.push(item),
            }
        }
        grouped
    }
}

fn owned(pieces: &[&ClothingItem]) -> Combination {
    pieces.iter().map(|item| (*item).clone()).collect()
}

/// Top × bottom × shoes combinations, with the first accessory appended
/// to each when the candidates include one. At most
/// [`MAX_COMBINATIONS`].
#[must_use]
pub fn generate_combinations(candidates: &[ClothingItem]) -> Vec<Combination> {
    let grouped = Grouped::new(candidates);
    let accessory = grouped.accessories.first().copied();

    let mut combinations = Vec::new();
    for top in grouped.tops.iter().take(MAX_TOPS) {
        for bottom in grouped.bottoms.iter().take(MAX_BOTTOMS) {
            for shoe in grouped.shoes.iter().take(MAX_SHOES) {
                if combinations.len() >= MAX_COMBINATIONS {
                    return combinations;
                }
                let mut pieces = vec![*top, *bottom, *shoe];
                pieces.extend(accessory);
                combinations.push(owned(&pieces));
            }
        }
    }
    combinations
}

/// Combinations that include `start`, completed from `compatible`.
///
/// The missing categories depend on what the starting item is:
/// a top needs bottoms and shoes, a bottom needs tops and shoes, and shoes
/// or an accessory need a top and a bottom. At most
/// [`MAX_STARTING_COMBINATIONS`].
#[must_use]
pub fn generate_starting_combinations(
    start: &ClothingItem,
    compatible: &[ClothingItem],
) -> Vec<Combination> {
    let grouped = Grouped::new(compatible);

    let mut combinations = Vec::new();
    match start.category {
        Category::Top => {
            for bottom in grouped.bottoms.iter().take(MAX_BOTTOMS) {
                for shoe in grouped.shoes.iter().take(MAX_SHOES) {
                    combinations.push(owned(&[start, *bottom, *shoe]));
                }
            }
        }
        Category::Bottom => {
            for top in grouped.tops.iter().take(MAX_TOPS) {
                for shoe in grouped.shoes.iter().take(MAX_SHOES) {
                    combinations.push(owned(&[*top, start, *shoe]));
                }
            }
        }
        Category::Shoes | Category::Accessory => {
            for top in grouped.tops.iter().take(MAX_COMPLETING_PIECES) {
                for bottom in grouped.bottoms.iter().take(MAX_COMPLETING_PIECES) {
                    combinations.push(owned(&[*top, *bottom, start]));
                }
            }
        }
    }
    combinations.truncate(MAX_STARTING_COMBINATIONS);
    combinations
}

// =============================================================================
// TESTS
// =============================================================================
