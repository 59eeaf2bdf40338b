//! # Text Reports
//!
//! Plain-text renderings for the CLI. JSON mode bypasses this module and
//! prints the records with serde_json.

use dadaplace_core::{
    ClothingGap, ClothingItem, Comment, CommunityPost, OutfitLook, UserProfile, WardrobeStats,
};

const RULE_TOP: &str = "┌─────────────────────────────────────┐\n";
const RULE_MID: &str = "├─────────────────────────────────────┤\n";
const RULE_END: &str = "└─────────────────────────────────────┘\n";

fn or_dash(text: &str) -> &str {
    if text.is_empty() { "-" } else { text }
}

fn join_tags<T: std::fmt::Display>(tags: impl IntoIterator<Item = T>) -> String {
    let joined = tags
        .into_iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

/// One line per item: id, category, sub-category, color and flags.
pub fn item_line(item: &ClothingItem) -> String {
    let mut line = format!(
        "#{:<4} {:<9} {} ({})",
        item.id, item.category, item.sub_category, item.base_color
    );
    if item.is_favorite {
        line.push_str(" ★");
    }
    if item.worn_count > 0 {
        line.push_str(&format!(" worn {}x", item.worn_count));
    }
    line
}

/// Full detail of one item.
pub fn item_detail(item: &ClothingItem) -> String {
    let mut out = String::new();
    out.push_str(&format!("Item #{}\n", item.id));
    out.push_str(&format!("  Category:    {}\n", item.category));
    out.push_str(&format!("  Kind:        {}\n", or_dash(&item.sub_category)));
    out.push_str(&format!("  Color:       {}\n", or_dash(&item.base_color)));
    out.push_str(&format!("  Seasons:     {}\n", join_tags(&item.seasons)));
    out.push_str(&format!("  Occasions:   {}\n", join_tags(&item.occasions)));
    out.push_str(&format!("  Volume:      {}\n", item.volume));
    out.push_str(&format!("  Brand:       {}\n", or_dash(&item.brand)));
    out.push_str(&format!("  Note:        {}\n", or_dash(&item.note)));
    if let Some(cents) = item.buy_price_cents {
        out.push_str(&format!("  Price:       {}.{:02}\n", cents / 100, cents % 100));
    }
    out.push_str(&format!("  Favorite:    {}\n", item.is_favorite));
    out.push_str(&format!("  Worn:        {}\n", item.worn_count));
    if !item.image_uri.is_empty() {
        out.push_str(&format!("  Image:       {}\n", item.image_uri));
    }
    out
}

/// A look in a box: name, scores, reason and resolved items.
pub fn look_to_text(look: &OutfitLook, items: &[ClothingItem]) -> String {
    let score = look.score();
    let mut out = String::new();
    out.push_str(RULE_TOP);
    if look.id.0 == 0 {
        out.push_str(&format!("│ {}\n", look.name));
    } else {
        out.push_str(&format!("│ #{} {}\n", look.id, look.name));
    }
    out.push_str(&format!(
        "│ weather {} · color {} · style {} · overall {}\n",
        score.weather_match,
        score.color_harmony,
        score.style_consistency,
        score.overall()
    ));
    out.push_str(RULE_MID);
    if items.is_empty() {
        out.push_str("│ - (no items)\n");
    } else {
        for item in items {
            out.push_str(&format!("│ - {}\n", item_line(item)));
        }
    }
    if !look.recommendation_reason.is_empty() {
        out.push_str(RULE_MID);
        for phrase in look.recommendation_reason.split("; ") {
            out.push_str(&format!("│ {}\n", phrase));
        }
    }
    out.push_str(RULE_END);
    out
}

pub fn gaps_to_text(gaps: &[ClothingGap]) -> String {
    let mut out = String::new();
    out.push_str(RULE_TOP);
    out.push_str("│ WARDROBE GAPS                       │\n");
    out.push_str(RULE_MID);
    if gaps.is_empty() {
        out.push_str("│ - (none)                            │\n");
    } else {
        for gap in gaps {
            out.push_str(&format!(
                "│ [{}] {}: {}\n",
                gap.priority,
                gap.description,
                gap.recommended_items.join(", ")
            ));
        }
    }
    out.push_str(RULE_END);
    out
}

pub fn stats_to_text(stats: &WardrobeStats, backend: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("Backend:    {}\n", backend));
    out.push_str(&format!("Items:      {}\n", stats.item_count));
    for (category, count) in &stats.by_category {
        out.push_str(&format!("  {:<10} {}\n", category.as_str(), count));
    }
    out.push_str(&format!("Favorites:  {}\n", stats.favorite_count));
    out.push_str(&format!("Total worn: {}\n", stats.total_worn));
    if let Some(id) = stats.most_worn {
        out.push_str(&format!("Most worn:  #{}\n", id));
    }
    out.push_str(&format!("Looks:      {}\n", stats.look_count));
    out.push_str(&format!("Posts:      {}\n", stats.post_count));
    out
}

pub fn post_to_text(post: &CommunityPost) -> String {
    let mut out = format!("Post #{} by user {}\n", post.id, post.user_id);
    out.push_str(&format!("  {}\n", post.content));
    if !post.topics.is_empty() {
        out.push_str(&format!("  topics: {}\n", join_tags(&post.topics)));
    }
    out.push_str(&format!(
        "  ♥ {}  ☆ {}  ✎ {}  ↗ {}\n",
        post.like_count, post.favorite_count, post.comment_count, post.share_count
    ));
    out
}

pub fn comment_line(comment: &Comment) -> String {
    match comment.parent_comment_id {
        Some(parent) => format!(
            "  #{} user {} (reply to #{}): {}",
            comment.id, comment.user_id, parent, comment.content
        ),
        None => format!("#{} user {}: {}", comment.id, comment.user_id, comment.content),
    }
}

pub fn profile_to_text(profile: &UserProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!("Nickname: {}\n", or_dash(&profile.nickname)));
    out.push_str(&format!("Gender:   {}\n", profile.gender));
    if let Some(height) = profile.height_cm {
        out.push_str(&format!("Height:   {} cm\n", height));
    }
    if let Some(grams) = profile.weight_grams {
        out.push_str(&format!("Weight:   {}.{} kg\n", grams / 1000, (grams % 1000) / 100));
    }
    out.push_str(&format!("Skin:     {}\n", profile.skin_tone));
    out.push_str(&format!("Style:    {}\n", profile.style_preference));
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dadaplace_core::{Category, ItemId, LookId, Season};

    #[test]
    fn item_line_shows_flags() {
        let mut item = ClothingItem::new(Category::Top, "hoodie", "gray");
        item.id = ItemId(7);
        item.is_favorite = true;
        item.worn_count = 3;
        let line = item_line(&item);
        assert!(line.starts_with("#7"));
        assert!(line.contains("hoodie (gray)"));
        assert!(line.contains("★"));
        assert!(line.contains("worn 3x"));
    }

    #[test]
    fn item_detail_lists_tags() {
        let item = ClothingItem::new(Category::Bottom, "jeans", "blue")
            .with_seasons([Season::Autumn, Season::Winter]);
        let text = item_detail(&item);
        assert!(text.contains("autumn, winter"));
        assert!(text.contains("Brand:       -"));
    }

    #[test]
    fn look_box_splits_reason() {
        let look = OutfitLook {
            id: LookId(2),
            name: "Work outfit".to_string(),
            recommendation_reason: "first; second".to_string(),
            weather_match: 7,
            color_harmony: 8,
            style_consistency: 9,
            ..OutfitLook::default()
        };
        let text = look_to_text(&look, &[]);
        assert!(text.contains("#2 Work outfit"));
        assert!(text.contains("overall 8"));
        assert!(text.contains("│ first\n"));
        assert!(text.contains("│ second\n"));
        assert!(text.contains("(no items)"));
    }

    #[test]
    fn empty_gaps_render_none() {
        assert!(gaps_to_text(&[]).contains("(none)"));
    }
}
