//! Outfit scoring.
//!
//! Three integer heuristics on a 0-10 scale. None of them looks at the
//! wearer; they only read the items' tags, volume and color.

use super::filter::TemperatureBand;
use crate::primitives::{BASE_SCORE, COOL_VOLUME_BELOW, MAX_SCORE, MIN_SCORE, WARM_VOLUME_ABOVE};
use crate::types::{ClothingItem, Occasion, OutfitRequest, OutfitScore, Season};
use std::collections::BTreeSet;

fn clamp_score(raw: i32) -> u8 {
    u8::try_from(raw.clamp(MIN_SCORE, MAX_SCORE)).unwrap_or(0)
}

/// Number of distinct base colors, compared as exact strings.
#[must_use]
pub fn distinct_colors(items: &[ClothingItem]) -> usize {
    items
        .iter()
        .map(|item| item.base_color.as_str())
        .collect::<BTreeSet<_>>()
        .len()
}

/// How well the items suit the temperature.
///
/// Starts at 5. In the cold each winter or bulky item adds 2, in the heat
/// each summer or light item adds 2, in mild weather each spring or autumn
/// item adds 1.
#[must_use]
pub fn weather_score(items: &[ClothingItem], temperature: i32) -> u8 {
    let band = TemperatureBand::from_celsius(temperature);
    let mut score = BASE_SCORE;
    for item in items {
        let bonus = match band {
            TemperatureBand::Cold
                if item.has_season(Season::Winter) || item.volume > WARM_VOLUME_ABOVE =>
            {
                2
            }
            TemperatureBand::Hot
                if item.has_season(Season::Summer) || item.volume < COOL_VOLUME_BELOW =>
            {
                2
            }
            TemperatureBand::Mild
                if item.has_season(Season::Spring) || item.has_season(Season::Autumn) =>
            {
                1
            }
            _ => 0,
        };
        score = score.saturating_add(bonus);
    }
    clamp_score(score)
}

/// Fewer colors read as more coordinated: 8 for up to three, 6 for four,
/// 4 beyond that.
#[must_use]
pub fn color_score(items: &[ClothingItem]) -> u8 {
    match distinct_colors(items) {
        0..=3 => 8,
        4 => 6,
        _ => 4,
    }
}

/// Starts at 5 and adds 2 per item tagged with the target occasion.
#[must_use]
pub fn style_score(items: &[ClothingItem], occasion: Occasion) -> u8 {
    let tagged = items.iter().filter(|i| i.has_occasion(occasion)).count();
    let bonus = i32::try_from(tagged).unwrap_or(i32::MAX).saturating_mul(2);
    clamp_score(BASE_SCORE.saturating_add(bonus))
}

/// All three sub-scores for one outfit.
#[must_use]
pub fn score_outfit(items: &[ClothingItem], request: &OutfitRequest) -> OutfitScore {
    OutfitScore::new(
        weather_score(items, request.temperature),
        color_score(items),
        style_score(items, request.occasion),
    )
}

/// Sort scored outfits by total, best first.
///
/// The sort is stable, so equal totals keep generation order.
pub fn rank<T>(scored: &mut [(T, OutfitScore)]) {
    scored.sort_by(|(_, a), (_, b)| b.total().cmp(&a.total()));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn piece(color: &str) -> ClothingItem {
        ClothingItem::new(Category::Top, "piece", color)
    }

    #[test]
    fn cold_rewards_winter_or_bulk() {
        let items = vec![
            piece("a").with_seasons([Season::Winter]),
            piece("b").with_volume(4),
            piece("c").with_volume(3),
        ];
        assert_eq!(weather_score(&items, 0), 9);
    }

    #[test]
    fn hot_rewards_summer_or_light() {
        let items = vec![
            piece("a").with_seasons([Season::Summer]),
            piece("b").with_volume(1),
            piece("c").with_volume(2),
        ];
        assert_eq!(weather_score(&items, 30), 9);
    }

    #[test]
    fn mild_rewards_spring_and_autumn() {
        let items = vec![
            piece("a").with_seasons([Season::Spring]),
            piece("b").with_seasons([Season::Autumn]),
            piece("c").with_seasons([Season::Winter]),
        ];
        assert_eq!(weather_score(&items, 18), 7);
    }

    #[test]
    fn weather_score_is_clamped() {
        let items: Vec<_> = (0..6)
            .map(|_| piece("x").with_seasons([Season::Winter]))
            .collect();
        assert_eq!(weather_score(&items, -5), 10);
        assert_eq!(weather_score(&[], -5), 5);
    }

    #[test]
    fn color_thresholds() {
        let three: Vec<_> = ["a", "b", "c"].iter().map(|c| piece(c)).collect();
        let four: Vec<_> = ["a", "b", "c", "d"].iter().map(|c| piece(c)).collect();
        let five: Vec<_> = ["a", "b", "c", "d", "e"].iter().map(|c| piece(c)).collect();
        assert_eq!(color_score(&three), 8);
        assert_eq!(color_score(&four), 6);
        assert_eq!(color_score(&five), 4);
        assert_eq!(color_score(&[]), 8);
    }

    #[test]
    fn colors_compare_exactly() {
        let items = vec![piece("Navy"), piece("navy"), piece("red"), piece("blue")];
        assert_eq!(distinct_colors(&items), 4);
        assert_eq!(color_score(&items), 6);

        let same = vec![piece("navy"), piece("navy"), piece("red")];
        assert_eq!(distinct_colors(&same), 2);
    }

    #[test]
    fn style_counts_target_occasion_only() {
        let items = vec![
            piece("a").with_occasions([Occasion::Work]),
            piece("b").with_occasions([Occasion::Work, Occasion::Casual]),
            piece("c").with_occasions([Occasion::Casual]),
        ];
        assert_eq!(style_score(&items, Occasion::Work), 9);
        assert_eq!(style_score(&items, Occasion::Formal), 5);

        let many: Vec<_> = (0..4)
            .map(|_| piece("x").with_occasions([Occasion::Work]))
            .collect();
        assert_eq!(style_score(&many, Occasion::Work), 10);
    }

    #[test]
    fn rank_is_stable_and_descending() {
        let mut scored = vec![
            ("first", OutfitScore::new(5, 5, 5)),
            ("second", OutfitScore::new(9, 8, 9)),
            ("third", OutfitScore::new(5, 5, 5)),
        ];
        rank(&mut scored);
        let order: Vec<_> = scored.iter().map(|(name, _)| *name).collect();
        assert_eq!(order, vec!["second", "first", "third"]);
    }
}
