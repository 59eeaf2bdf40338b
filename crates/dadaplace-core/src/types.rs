//! # Domain Types
//!
//! Records stored in the wardrobe and the values the engine passes around.
//!
//! Identifiers are `u64` newtypes assigned by the store. Timestamps are unix
//! seconds taken from a [`crate::Clock`]. No field is a float: prices are
//! cents, weights are grams and image positions are basis points.

use crate::error::DadaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// IDENTIFIERS
// =============================================================================

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Identifier of a clothing item.
    ItemId
);
id_type!(
    /// Identifier of a saved outfit look.
    LookId
);
id_type!(
    /// Identifier of a user profile. `UserId(0)` marks generated content.
    UserId
);
id_type!(
    /// Identifier of a community post.
    PostId
);
id_type!(
    /// Identifier of a comment.
    CommentId
);

// =============================================================================
// TAG ENUMS
// =============================================================================

/// Declares a closed tag enum with a stable lowercase name.
///
/// Parsing is case-insensitive and also accepts the variant name with
/// spaces, dashes or underscores removed.
macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $what:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// Stable lowercase name.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $text ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DadaError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted: String = s
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, ' ' | '-' | '_'))
                    .flat_map(char::to_lowercase)
                    .collect();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().replace('_', "") == wanted)
                    .ok_or_else(|| {
                        DadaError::InvalidArgument(format!("unknown {}: {}", $what, s))
                    })
            }
        }
    };
}

tag_enum!(
    /// Top-level clothing category.
    Category, "category" {
        #[default]
        Top => "top",
        Bottom => "bottom",
        Shoes => "shoes",
        Accessory => "accessory",
    }
);

tag_enum!(
    /// Season tag.
    Season, "season" {
        #[default]
        Spring => "spring",
        Summer => "summer",
        Autumn => "autumn",
        Winter => "winter",
    }
);

tag_enum!(
    /// Occasion tag. `Casual` doubles as a wildcard during filtering.
    Occasion, "occasion" {
        Work => "work",
        Sport => "sport",
        #[default]
        Casual => "casual",
        Formal => "formal",
        Date => "date",
        Interview => "interview",
        Fitness => "fitness",
    }
);

tag_enum!(
    /// Preferred dressing style.
    StylePreference, "style" {
        #[default]
        Unset => "unset",
        Minimal => "minimal",
        Casual => "casual",
        Business => "business",
        Fashion => "fashion",
        Sporty => "sporty",
        Vintage => "vintage",
        Sweet => "sweet",
        Cool => "cool",
    }
);

tag_enum!(
    /// Gender recorded on a profile.
    Gender, "gender" {
        #[default]
        Unset => "unset",
        Male => "male",
        Female => "female",
    }
);

tag_enum!(
    /// Skin tone recorded on a profile.
    SkinTone, "skin tone" {
        #[default]
        Unset => "unset",
        Light => "light",
        Medium => "medium",
        Dark => "dark",
    }
);

tag_enum!(
    /// Moderation status of a community post.
    PostStatus, "post status" {
        #[default]
        Pending => "pending",
        Published => "published",
        Hidden => "hidden",
        Deleted => "deleted",
    }
);

// =============================================================================
// CLOTHING ITEM
// =============================================================================

/// A single piece of clothing in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClothingItem {
    pub id: ItemId,
    pub category: Category,
    /// Free-text kind within the category ("hoodie", "sneakers").
    pub sub_category: String,
    pub base_color: String,
    pub seasons: BTreeSet<Season>,
    pub occasions: BTreeSet<Occasion>,
    /// Thickness on a small integer scale; doubles as a warmth proxy.
    pub volume: u32,
    pub is_favorite: bool,
    pub worn_count: u32,
    pub image_uri: String,
    pub crop_uri: String,
    pub brand: String,
    pub note: String,
    pub buy_price_cents: Option<u64>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl ClothingItem {
    /// Create an untagged item. The id is assigned when the item is added.
    #[must_use]
    pub fn new(
        category: Category,
        sub_category: impl Into<String>,
        base_color: impl Into<String>,
    ) -> Self {
        Self {
            category,
            sub_category: sub_category.into(),
            base_color: base_color.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seasons(mut self, seasons: impl IntoIterator<Item = Season>) -> Self {
        self.seasons = seasons.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_occasions(mut self, occasions: impl IntoIterator<Item = Occasion>) -> Self {
        self.occasions = occasions.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_volume(mut self, volume: u32) -> Self {
        self.volume = volume;
        self
    }

    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = brand.into();
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Check whether the item carries a season tag.
    #[must_use]
    pub fn has_season(&self, season: Season) -> bool {
        self.seasons.contains(&season)
    }

    /// Check whether the item carries an occasion tag.
    #[must_use]
    pub fn has_occasion(&self, occasion: Occasion) -> bool {
        self.occasions.contains(&occasion)
    }
}

// =============================================================================
// OUTFITS
// =============================================================================

/// Context for a single recommendation call. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitRequest {
    /// Today's temperature in °C.
    pub temperature: i32,
    pub occasion: Occasion,
    #[serde(default)]
    pub starting_item_id: Option<ItemId>,
    #[serde(default)]
    pub preferred_style: Option<StylePreference>,
}

impl OutfitRequest {
    #[must_use]
    pub fn new(temperature: i32, occasion: Occasion) -> Self {
        Self {
            temperature,
            occasion,
            starting_item_id: None,
            preferred_style: None,
        }
    }

    #[must_use]
    pub fn starting_from(mut self, item: ItemId) -> Self {
        self.starting_item_id = Some(item);
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: StylePreference) -> Self {
        self.preferred_style = Some(style);
        self
    }
}

/// Heuristic sub-scores of an outfit, each in `0..=10`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitScore {
    pub weather_match: u8,
    pub color_harmony: u8,
    pub style_consistency: u8,
}

impl OutfitScore {
    /// Build a score, clamping each part to `0..=10`.
    #[must_use]
    pub fn new(weather_match: u8, color_harmony: u8, style_consistency: u8) -> Self {
        let max = crate::primitives::MAX_SCORE as u8;
        Self {
            weather_match: weather_match.min(max),
            color_harmony: color_harmony.min(max),
            style_consistency: style_consistency.min(max),
        }
    }

    /// Sum of the three sub-scores. Used for ranking.
    #[must_use]
    pub fn total(&self) -> u16 {
        self.weather_match as u16 + self.color_harmony as u16 + self.style_consistency as u16
    }

    /// Integer-truncated mean of the three sub-scores.
    #[must_use]
    pub fn overall(&self) -> u8 {
        (self.total() / 3) as u8
    }
}

/// A generated or saved outfit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutfitLook {
    pub id: LookId,
    pub name: String,
    pub description: String,
    pub image_uri: String,
    /// Items in wearing order (top, bottom, shoes, accessory).
    pub item_ids: Vec<ItemId>,
    pub temperature: Option<i32>,
    pub occasions: Vec<Occasion>,
    pub recommendation_reason: String,
    pub weather_match: u8,
    pub color_harmony: u8,
    pub style_consistency: u8,
    pub is_public: bool,
    /// `UserId(0)` for engine-generated looks.
    pub creator_user_id: UserId,
    pub created_at: u64,
    pub updated_at: u64,
}

impl OutfitLook {
    /// The look's sub-scores as an [`OutfitScore`].
    #[must_use]
    pub fn score(&self) -> OutfitScore {
        OutfitScore::new(
            self.weather_match,
            self.color_harmony,
            self.style_consistency,
        )
    }

    /// Clamp the stored sub-scores to `0..=10`.
    #[must_use]
    pub fn with_clamped_scores(mut self) -> Self {
        let score = self.score();
        self.weather_match = score.weather_match;
        self.color_harmony = score.color_harmony;
        self.style_consistency = score.style_consistency;
        self
    }

    /// Check whether the look was produced by the engine.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.creator_user_id == UserId(0)
    }
}

/// A hole in the wardrobe with purchase suggestions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingGap {
    pub category: Category,
    pub description: String,
    pub recommended_items: Vec<String>,
    /// 1 (nice to have) to 10 (urgent).
    pub priority: u8,
}

// =============================================================================
// PROFILE AND COMMUNITY
// =============================================================================

/// The local user's profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub id: UserId,
    pub avatar: String,
    pub nickname: String,
    pub gender: Gender,
    pub height_cm: Option<u32>,
    pub weight_grams: Option<u32>,
    pub skin_tone: SkinTone,
    pub style_preference: StylePreference,
    pub created_at: u64,
    pub updated_at: u64,
}

/// An item pinned on a post image. Positions are basis points (0..=10000).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedItem {
    pub item_id: ItemId,
    pub x_bp: u16,
    pub y_bp: u16,
}

impl TaggedItem {
    /// Pin an item, clamping positions to the image.
    #[must_use]
    pub fn new(item_id: ItemId, x_bp: u16, y_bp: u16) -> Self {
        Self {
            item_id,
            x_bp: x_bp.min(10_000),
            y_bp: y_bp.min(10_000),
        }
    }
}

/// A post in the local community feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityPost {
    pub id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub image_uris: Vec<String>,
    pub outfit_look_id: Option<LookId>,
    pub tagged_items: Vec<TaggedItem>,
    pub topics: Vec<String>,
    pub like_count: u32,
    pub favorite_count: u32,
    pub comment_count: u32,
    pub share_count: u32,
    pub status: PostStatus,
    pub created_at: u64,
    pub updated_at: u64,
}

impl CommunityPost {
    #[must_use]
    pub fn new(user_id: UserId, content: impl Into<String>) -> Self {
        Self {
            user_id,
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_topics(mut self, topics: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.topics = topics.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_tagged_items(mut self, tagged: impl IntoIterator<Item = TaggedItem>) -> Self {
        self.tagged_items = tagged.into_iter().collect();
        self
    }

    /// Check whether the post shows up in feeds.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.status == PostStatus::Published
    }
}

/// A comment on a post, optionally replying to another comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub user_id: UserId,
    pub content: String,
    pub parent_comment_id: Option<CommentId>,
    pub created_at: u64,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_parsing_is_case_insensitive() {
        assert_eq!("TOP".parse::<Category>().ok(), Some(Category::Top));
        assert_eq!(" Winter ".parse::<Season>().ok(), Some(Season::Winter));
        assert_eq!("interview".parse::<Occasion>().ok(), Some(Occasion::Interview));
    }

    #[test]
    fn tag_parsing_rejects_unknown() {
        let err = "pajamas".parse::<Category>();
        assert!(matches!(err, Err(DadaError::InvalidArgument(_))));
    }

    #[test]
    fn score_overall_truncates() {
        let score = OutfitScore::new(9, 8, 6);
        assert_eq!(score.total(), 23);
        assert_eq!(score.overall(), 7);
    }

    #[test]
    fn score_clamps_parts() {
        let score = OutfitScore::new(42, 10, 0);
        assert_eq!(score.weather_match, 10);
        assert_eq!(score.overall(), 6);
    }

    #[test]
    fn builder_collects_tags() {
        let item = ClothingItem::new(Category::Top, "hoodie", "Gray")
            .with_seasons([Season::Winter, Season::Autumn, Season::Winter])
            .with_occasions([Occasion::Casual]);

        assert_eq!(item.seasons.len(), 2);
        assert!(item.has_season(Season::Autumn));
        assert!(item.has_occasion(Occasion::Casual));
        assert_eq!(item.base_color, "Gray");
    }

    #[test]
    fn tagged_item_positions_are_clamped() {
        let tag = TaggedItem::new(ItemId(1), 12_000, 500);
        assert_eq!(tag.x_bp, 10_000);
        assert_eq!(tag.y_bp, 500);
    }

    #[test]
    fn enum_json_is_snake_case() {
        let json = serde_json::to_string(&StylePreference::Business).ok();
        assert_eq!(json.as_deref(), Some("\"business\""));
    }
}
