//! # Recommendation Engine
//!
//! Turns a request (temperature, occasion, optional starting item) into a
//! ranked list of outfit looks.
//!
//! The pipeline is fixed:
//!
//! ```text
//! catalog ──filter──> candidates ──combine──> combinations ──score──> ranked looks
//! ```
//!
//! Each stage is a pure function over item slices, so the engine itself only
//! reads the store and assembles [`OutfitLook`] records. Generated looks are
//! not persisted; callers save the ones they want to keep.

pub mod combine;
pub mod filter;
pub mod gaps;
pub mod reason;
pub mod score;

pub use combine::Combination;
pub use filter::TemperatureBand;

use crate::error::{DadaError, Result};
use crate::primitives::{MAX_RECOMMENDATIONS, MAX_STARTING_RECOMMENDATIONS};
use crate::store::WardrobeStore;
use crate::types::{
    ClothingGap, ClothingItem, ItemId, Occasion, OutfitLook, OutfitRequest, OutfitScore, UserId,
};
use crate::wardrobe::{logged, newest_first};
use tracing::{debug, error, info};

/// Title-case label of an occasion ("Work", "Interview").
fn occasion_label(occasion: Occasion) -> String {
    let name = occasion.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Read-only recommendation engine over a wardrobe store.
#[derive(Debug)]
pub struct RecommendationEngine<'a, S: WardrobeStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: WardrobeStore + ?Sized> RecommendationEngine<'a, S> {
    #[must_use]
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Catalog in engine order: newest first.
    fn catalog(&self, operation: &'static str) -> Result<Vec<ClothingItem>> {
        let mut items = logged(operation, self.store.items())?;
        newest_first(&mut items);
        Ok(items)
    }

    /// Recommend looks for a temperature and occasion.
    ///
    /// At most [`MAX_RECOMMENDATIONS`] looks, best total score first. An
    /// empty catalog, or one missing tops, bottoms or shoes for the band,
    /// yields an empty list.
    pub fn generate_recommendations(&self, request: &OutfitRequest) -> Result<Vec<OutfitLook>> {
        info!(
            temperature = request.temperature,
            occasion = %request.occasion,
            "generating outfit recommendations"
        );
        let items = self.catalog("generate_recommendations")?;
        let candidates = filter::filter_candidates(&items, request.temperature, request.occasion);
        let combinations = combine::generate_combinations(&candidates);
        debug!(
            catalog = items.len(),
            candidates = candidates.len(),
            combinations = combinations.len(),
            "built combinations"
        );

        let name = format!("{} outfit", occasion_label(request.occasion));
        let looks = self.assemble(
            combinations,
            MAX_RECOMMENDATIONS,
            request,
            &name,
            "Recommended outfit",
        );
        info!(count = looks.len(), "generated outfit recommendations");
        Ok(looks)
    }

    /// Recommend looks that include a chosen item.
    ///
    /// At most [`MAX_STARTING_RECOMMENDATIONS`] looks. Fails with
    /// [`DadaError::InvalidArgument`] when the item does not exist.
    pub fn generate_from_starting_item(
        &self,
        start_id: ItemId,
        request: &OutfitRequest,
    ) -> Result<Vec<OutfitLook>> {
        info!(item = %start_id, "generating outfits around starting item");
        let Some(start) = logged("generate_from_starting_item", self.store.get_item(start_id))?
        else {
            let err = DadaError::InvalidArgument(format!("starting item not found: {start_id}"));
            error!(item = %start_id, error = %err, "cannot build outfit");
            return Err(err);
        };

        let items = self.catalog("generate_from_starting_item")?;
        let compatible = filter::filter_compatible(&items, &start);
        let combinations = combine::generate_starting_combinations(&start, &compatible);
        debug!(
            compatible = compatible.len(),
            combinations = combinations.len(),
            "built starting-item combinations"
        );

        let name = format!("Built around {}", start.sub_category);
        let looks = self.assemble(
            combinations,
            MAX_STARTING_RECOMMENDATIONS,
            request,
            &name,
            "Outfit built around a chosen item",
        );
        info!(count = looks.len(), "generated starting-item outfits");
        Ok(looks)
    }

    /// Report what the wardrobe lacks, highest priority first.
    pub fn analyze_gaps(&self, request: &OutfitRequest) -> Result<Vec<ClothingGap>> {
        let items = self.catalog("analyze_gaps")?;
        let found = gaps::find_gaps(&items, request.occasion);
        info!(gaps = found.len(), occasion = %request.occasion, "analyzed wardrobe gaps");
        Ok(found)
    }

    /// Score an arbitrary set of items against a request.
    #[must_use]
    pub fn score(&self, items: &[ClothingItem], request: &OutfitRequest) -> OutfitScore {
        score::score_outfit(items, request)
    }

    /// Explain why a set of items suits a request.
    #[must_use]
    pub fn explain_reason(&self, items: &[ClothingItem], request: &OutfitRequest) -> String {
        reason::explain(items, request)
    }

    /// Score the first `limit` combinations, rank them and build looks.
    fn assemble(
        &self,
        mut combinations: Vec<Combination>,
        limit: usize,
        request: &OutfitRequest,
        name: &str,
        description: &str,
    ) -> Vec<OutfitLook> {
        combinations.truncate(limit);
        let mut scored: Vec<_> = combinations
            .into_iter()
            .map(|items| {
                let score = self.score(&items, request);
                (items, score)
            })
            .collect();
        score::rank(&mut scored);

        scored
            .into_iter()
            .map(|(items, score)| OutfitLook {
                name: name.to_string(),
                description: description.to_string(),
                item_ids: items.iter().map(|i| i.id).collect(),
                temperature: Some(request.temperature),
                occasions: vec![request.occasion],
                recommendation_reason: self.explain_reason(&items, request),
                weather_match: score.weather_match,
                color_harmony: score.color_harmony,
                style_consistency: score.style_consistency,
                is_public: false,
                creator_user_id: UserId(0),
                ..OutfitLook::default()
            })
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
