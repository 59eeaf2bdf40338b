//! # Primitives
//!
//! Fixed bounds and lookup tables used by the engine.
//!
//! These are heuristics, not measurements. Changing any of them changes
//! which looks get recommended, so they live in one place.

/// Temperatures strictly below this are cold (°C).
pub const COLD_BELOW_CELSIUS: i32 = 10;

/// Temperatures strictly above this are hot (°C).
pub const HOT_ABOVE_CELSIUS: i32 = 25;

/// Lowest possible sub-score.
pub const MIN_SCORE: i32 = 0;

/// Highest possible sub-score.
pub const MAX_SCORE: i32 = 10;

/// Starting value for the weather and style heuristics.
pub const BASE_SCORE: i32 = 5;

/// Items with volume above this count as warm enough for cold weather.
pub const WARM_VOLUME_ABOVE: u32 = 3;

/// Items with volume below this count as cool enough for hot weather.
pub const COOL_VOLUME_BELOW: u32 = 2;

// =============================================================================
// COMBINATION CAPS
// =============================================================================

/// Tops considered in standard generation.
pub const MAX_TOPS: usize = 3;

/// Bottoms considered in standard generation.
pub const MAX_BOTTOMS: usize = 3;

/// Shoes considered in standard generation.
pub const MAX_SHOES: usize = 2;

/// Upper bound on standard combinations.
pub const MAX_COMBINATIONS: usize = 10;

/// Upper bound on starting-item combinations.
pub const MAX_STARTING_COMBINATIONS: usize = 5;

/// Tops and bottoms considered when the starting item is shoes or an accessory.
pub const MAX_COMPLETING_PIECES: usize = 2;

/// Looks returned by a standard recommendation.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Looks returned by a starting-item recommendation.
pub const MAX_STARTING_RECOMMENDATIONS: usize = 3;

// =============================================================================
// COLORS
// =============================================================================

/// Colors that go with everything.
pub const NEUTRAL_COLORS: &[&str] = &["white", "black", "gray", "grey", "beige", "khaki"];

// =============================================================================
// GAP ANALYSIS
// =============================================================================

/// Priority of a missing-tops gap.
pub const TOP_GAP_PRIORITY: u8 = 10;

/// Priority of a missing-bottoms gap.
pub const BOTTOM_GAP_PRIORITY: u8 = 9;

/// Priority of a thin-occasion gap.
pub const OCCASION_GAP_PRIORITY: u8 = 8;

/// An occasion with fewer tagged items than this is reported as a gap.
pub const MIN_ITEMS_PER_OCCASION: usize = 3;

/// Suggested purchases when the wardrobe has no tops.
pub const BASIC_TOPS: &[&str] = &["white T-shirt", "basic shirt", "knit sweater"];

/// Suggested purchases when the wardrobe has no bottoms.
pub const BASIC_BOTTOMS: &[&str] = &["jeans", "chinos", "skirt"];

/// Placeholder returned by the virtual model renderer.
pub const VIRTUAL_MODEL_PLACEHOLDER: &str = "/assets/virtual_model_placeholder.png";
