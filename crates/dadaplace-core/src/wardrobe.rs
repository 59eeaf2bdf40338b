//! # Wardrobe Service
//!
//! The session object of DaDaPlace: a store backend plus a clock.
//!
//! Every catalog mutation goes through here so timestamps are stamped in one
//! place and every operation is logged. Store failures are logged with
//! `error!` and handed back to the caller unchanged; there is no retry.

use crate::clock::{Clock, SystemClock};
use crate::engine::RecommendationEngine;
use crate::error::Result;
use crate::store::WardrobeStore;
use crate::types::{
    Category, ClothingGap, ClothingItem, ItemId, LookId, Occasion, OutfitLook, OutfitRequest,
    Season, UserProfile,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, error, info};

/// Log a failed operation and pass the result through untouched.
pub(crate) fn logged<T>(operation: &'static str, result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        error!(operation, error = %err, "wardrobe operation failed");
    }
    result
}

/// Newest first: `created_at` descending, then id descending.
pub(crate) fn newest_first(items: &mut [ClothingItem]) {
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

// =============================================================================
// ITEM QUERY
// =============================================================================

/// Combined catalog filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemQuery {
    /// Case-insensitive substring of sub-category, brand, note or color.
    pub keyword: Option<String>,
    pub category: Option<Category>,
    pub season: Option<Season>,
    pub occasion: Option<Occasion>,
    /// Case-insensitive substring of the base color.
    pub color: Option<String>,
    pub favorites_only: bool,
}

impl ItemQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn season(mut self, season: Season) -> Self {
        self.season = Some(season);
        self
    }

    #[must_use]
    pub fn occasion(mut self, occasion: Occasion) -> Self {
        self.occasion = Some(occasion);
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn favorites_only(mut self) -> Self {
        self.favorites_only = true;
        self
    }

    /// Check an item against every set filter.
    #[must_use]
    pub fn matches(&self, item: &ClothingItem) -> bool {
        if let Some(keyword) = self.keyword.as_deref().map(str::trim)
            && !keyword.is_empty()
            && !matches_keyword(item, keyword)
        {
            return false;
        }
        if self.category.is_some_and(|c| item.category != c) {
            return false;
        }
        if self.season.is_some_and(|s| !item.has_season(s)) {
            return false;
        }
        if self.occasion.is_some_and(|o| !item.has_occasion(o)) {
            return false;
        }
        if let Some(color) = self.color.as_deref()
            && !contains_ignore_case(&item.base_color, color)
        {
            return false;
        }
        !self.favorites_only || item.is_favorite
    }
}

pub(crate) fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn matches_keyword(item: &ClothingItem, keyword: &str) -> bool {
    [&item.sub_category, &item.brand, &item.note, &item.base_color]
        .iter()
        .any(|field| contains_ignore_case(field, keyword))
}

// =============================================================================
// STATISTICS
// =============================================================================

/// Counts shown by `status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardrobeStats {
    pub item_count: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub favorite_count: usize,
    pub total_worn: u64,
    pub most_worn: Option<ItemId>,
    pub look_count: usize,
    pub post_count: usize,
}

// =============================================================================
// WARDROBE
// =============================================================================

/// A wardrobe session over a store backend.
#[derive(Debug)]
pub struct Wardrobe<S: WardrobeStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: WardrobeStore> Wardrobe<S, SystemClock> {
    /// Open a session using the system clock.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: WardrobeStore, C: Clock> Wardrobe<S, C> {
    #[must_use]
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    pub(crate) fn now(&self) -> u64 {
        self.clock.now_secs()
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// Add an item to the catalog and return it with its new id.
    pub fn add_item(&mut self, mut item: ClothingItem) -> Result<ClothingItem> {
        let now = self.now();
        item.created_at = now;
        item.updated_at = now;
        let id = logged("add_item", self.store.insert_item(item.clone()))?;
        item.id = id;
        info!(item = %id, category = %item.category, "added clothing item");
        Ok(item)
    }

    pub fn get_item(&self, id: ItemId) -> Result<Option<ClothingItem>> {
        logged("get_item", self.store.get_item(id))
    }

    /// Replace an item's fields. `None` if the id is unknown.
    ///
    /// The creation time of the stored item is kept.
    pub fn update_item(&mut self, mut item: ClothingItem) -> Result<Option<ClothingItem>> {
        let Some(existing) = self.get_item(item.id)? else {
            debug!(item = %item.id, "update of unknown item ignored");
            return Ok(None);
        };
        item.created_at = existing.created_at;
        item.updated_at = self.now();
        if !logged("update_item", self.store.put_item(item.clone()))? {
            return Ok(None);
        }
        info!(item = %item.id, "updated clothing item");
        Ok(Some(item))
    }

    /// Delete an item. `false` if the id is unknown.
    pub fn delete_item(&mut self, id: ItemId) -> Result<bool> {
        let removed = logged("delete_item", self.store.remove_item(id))?;
        if removed {
            info!(item = %id, "deleted clothing item");
        }
        Ok(removed)
    }

    /// The whole catalog, newest first.
    pub fn all_items(&self) -> Result<Vec<ClothingItem>> {
        let mut items = logged("all_items", self.store.items())?;
        newest_first(&mut items);
        Ok(items)
    }

    /// Items matching a query, newest first.
    pub fn find_items(&self, query: &ItemQuery) -> Result<Vec<ClothingItem>> {
        let mut items = self.all_items()?;
        items.retain(|item| query.matches(item));
        debug!(?query, matched = items.len(), "filtered catalog");
        Ok(items)
    }

    pub fn items_by_category(&self, category: Category) -> Result<Vec<ClothingItem>> {
        self.find_items(&ItemQuery::new().category(category))
    }

    pub fn items_by_season(&self, season: Season) -> Result<Vec<ClothingItem>> {
        self.find_items(&ItemQuery::new().season(season))
    }

    pub fn items_by_occasion(&self, occasion: Occasion) -> Result<Vec<ClothingItem>> {
        self.find_items(&ItemQuery::new().occasion(occasion))
    }

    /// Items whose base color contains `color` (case-insensitive).
    pub fn items_by_color(&self, color: &str) -> Result<Vec<ClothingItem>> {
        self.find_items(&ItemQuery::new().color(color))
    }

    /// Keyword search over sub-category, brand, note and color.
    pub fn search(&self, keyword: &str) -> Result<Vec<ClothingItem>> {
        self.find_items(&ItemQuery::new().keyword(keyword))
    }

    pub fn favorite_items(&self) -> Result<Vec<ClothingItem>> {
        self.find_items(&ItemQuery::new().favorites_only())
    }

    /// Flip the favorite flag. `false` if the id is unknown.
    pub fn toggle_favorite(&mut self, id: ItemId) -> Result<bool> {
        let Some(mut item) = self.get_item(id)? else {
            return Ok(false);
        };
        item.is_favorite = !item.is_favorite;
        item.updated_at = self.now();
        let favorite = item.is_favorite;
        let stored = logged("toggle_favorite", self.store.put_item(item))?;
        if stored {
            info!(item = %id, favorite, "toggled favorite");
        }
        Ok(stored)
    }

    /// Count one more wear. `false` if the id is unknown.
    pub fn increment_worn_count(&mut self, id: ItemId) -> Result<bool> {
        let Some(mut item) = self.get_item(id)? else {
            return Ok(false);
        };
        item.worn_count = item.worn_count.saturating_add(1);
        item.updated_at = self.now();
        let worn = item.worn_count;
        let stored = logged("increment_worn_count", self.store.put_item(item))?;
        if stored {
            info!(item = %id, worn, "incremented worn count");
        }
        Ok(stored)
    }

    // -------------------------------------------------------------------------
    // Looks
    // -------------------------------------------------------------------------

    /// Persist a look (generated or hand-made) and return it with its id.
    ///
    /// Sub-scores above 10 are clamped before storing.
    pub fn save_look(&mut self, look: OutfitLook) -> Result<OutfitLook> {
        let mut look = look.with_clamped_scores();
        let now = self.now();
        look.created_at = now;
        look.updated_at = now;
        let id = logged("save_look", self.store.insert_look(look.clone()))?;
        look.id = id;
        info!(look = %id, items = look.item_ids.len(), "saved outfit look");
        Ok(look)
    }

    /// Saved looks, newest first.
    pub fn all_looks(&self) -> Result<Vec<OutfitLook>> {
        let mut looks = logged("all_looks", self.store.looks())?;
        looks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(looks)
    }

    pub fn get_look(&self, id: LookId) -> Result<Option<OutfitLook>> {
        logged("get_look", self.store.get_look(id))
    }

    pub fn delete_look(&mut self, id: LookId) -> Result<bool> {
        let removed = logged("delete_look", self.store.remove_look(id))?;
        if removed {
            info!(look = %id, "deleted outfit look");
        }
        Ok(removed)
    }

    /// Resolve a look's item ids, skipping items deleted since it was saved.
    pub fn look_items(&self, look: &OutfitLook) -> Result<Vec<ClothingItem>> {
        let mut items = Vec::with_capacity(look.item_ids.len());
        for id in &look.item_ids {
            if let Some(item) = self.get_item(*id)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    // -------------------------------------------------------------------------
    // Profile
    // -------------------------------------------------------------------------

    pub fn profile(&self) -> Result<Option<UserProfile>> {
        logged("profile", self.store.profile())
    }

    /// Create or replace the profile, keeping the original creation time.
    pub fn save_profile(&mut self, mut profile: UserProfile) -> Result<UserProfile> {
        let now = self.now();
        profile.created_at = match self.profile()? {
            Some(existing) => existing.created_at,
            None => now,
        };
        profile.updated_at = now;
        logged("save_profile", self.store.put_profile(profile.clone()))?;
        info!(nickname = %profile.nickname, "saved user profile");
        Ok(profile)
    }

    // -------------------------------------------------------------------------
    // Engine
    // -------------------------------------------------------------------------

    /// A recommendation engine reading this wardrobe's catalog.
    #[must_use]
    pub fn engine(&self) -> RecommendationEngine<'_, S> {
        RecommendationEngine::new(&self.store)
    }

    pub fn recommend(&self, request: &OutfitRequest) -> Result<Vec<OutfitLook>> {
        match request.starting_item_id {
            Some(start) => self.engine().generate_from_starting_item(start, request),
            None => self.engine().generate_recommendations(request),
        }
    }

    pub fn analyze_gaps(&self, request: &OutfitRequest) -> Result<Vec<ClothingGap>> {
        self.engine().analyze_gaps(request)
    }

    // -------------------------------------------------------------------------
    // Stats
    // -------------------------------------------------------------------------

    pub fn stats(&self) -> Result<WardrobeStats> {
        let items = logged("stats", self.store.items())?;
        let mut stats = WardrobeStats {
            item_count: items.len(),
            look_count: logged("stats", self.store.looks())?.len(),
            post_count: logged("stats", self.store.posts())?
                .iter()
                .filter(|p| p.is_visible())
                .count(),
            ..WardrobeStats::default()
        };
        let mut most_worn: Option<(u32, ItemId)> = None;
        for item in &items {
            *stats.by_category.entry(item.category).or_default() += 1;
            if item.is_favorite {
                stats.favorite_count += 1;
            }
            stats.total_worn = stats.total_worn.saturating_add(item.worn_count as u64);
            if item.worn_count > 0 && most_worn.is_none_or(|(count, _)| item.worn_count > count) {
                most_worn = Some((item.worn_count, item.id));
            }
        }
        stats.most_worn = most_worn.map(|(_, id)| id);
        Ok(stats)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;

    fn wardrobe() -> Wardrobe<MemoryStore, ManualClock> {
        Wardrobe::with_clock(MemoryStore::new(), ManualClock::new(1_000))
    }

    fn stocked() -> Wardrobe<MemoryStore, ManualClock> {
        let mut w = wardrobe();
        w.add_item(
            ClothingItem::new(Category::Top, "oxford shirt", "White")
                .with_brand("Uniqlo")
                .with_seasons([Season::Spring, Season::Autumn])
                .with_occasions([Occasion::Work]),
        )
        .unwrap();
        w.clock().advance(10);
        w.add_item(
            ClothingItem::new(Category::Bottom, "jeans", "Navy Blue")
                .with_note("slightly faded")
                .with_seasons([Season::Autumn, Season::Winter])
                .with_occasions([Occasion::Casual]),
        )
        .unwrap();
        w.clock().advance(10);
        w.add_item(
            ClothingItem::new(Category::Shoes, "sneakers", "white")
                .with_seasons([Season::Summer])
                .with_occasions([Occasion::Sport, Occasion::Casual]),
        )
        .unwrap();
        w
    }

    #[test]
    fn add_item_stamps_id_and_time() {
        let mut w = wardrobe();
        let item = w
            .add_item(ClothingItem::new(Category::Top, "tee", "black"))
            .unwrap();
        assert_eq!(item.id, ItemId(1));
        assert_eq!(item.created_at, 1_000);
        assert_eq!(item.updated_at, 1_000);
    }

    #[test]
    fn all_items_newest_first() {
        let w = stocked();
        let ids: Vec<_> = w.all_items().unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![ItemId(3), ItemId(2), ItemId(1)]);
    }

    #[test]
    fn same_timestamp_breaks_ties_by_id() {
        let mut w = wardrobe();
        w.add_item(ClothingItem::new(Category::Top, "a", "red")).unwrap();
        w.add_item(ClothingItem::new(Category::Top, "b", "red")).unwrap();
        let ids: Vec<_> = w.all_items().unwrap().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![ItemId(2), ItemId(1)]);
    }

    #[test]
    fn predicate_queries() {
        let w = stocked();
        assert_eq!(w.items_by_category(Category::Bottom).unwrap().len(), 1);
        assert_eq!(w.items_by_season(Season::Autumn).unwrap().len(), 2);
        assert_eq!(w.items_by_occasion(Occasion::Casual).unwrap().len(), 2);
        assert_eq!(w.items_by_color("WHITE").unwrap().len(), 2);
        assert_eq!(w.items_by_color("blue").unwrap().len(), 1);
    }

    #[test]
    fn search_covers_brand_note_and_color() {
        let w = stocked();
        assert_eq!(w.search("uniqlo").unwrap().len(), 1);
        assert_eq!(w.search("faded").unwrap().len(), 1);
        assert_eq!(w.search("navy").unwrap().len(), 1);
        assert_eq!(w.search("sneak").unwrap().len(), 1);
        assert!(w.search("cashmere").unwrap().is_empty());
    }

    #[test]
    fn combined_query() {
        let w = stocked();
        let query = ItemQuery::new()
            .color("white")
            .occasion(Occasion::Casual);
        let found = w.find_items(&query).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].sub_category, "sneakers");
    }

    #[test]
    fn toggle_favorite_twice_restores_state() {
        let mut w = stocked();
        let before = w.get_item(ItemId(2)).unwrap().unwrap().is_favorite;

        assert!(w.toggle_favorite(ItemId(2)).unwrap());
        assert_eq!(w.favorite_items().unwrap().len(), 1);
        assert!(w.toggle_favorite(ItemId(2)).unwrap());

        let after = w.get_item(ItemId(2)).unwrap().unwrap().is_favorite;
        assert_eq!(before, after);
    }

    #[test]
    fn missing_ids_report_false_or_none() {
        let mut w = stocked();
        assert!(!w.toggle_favorite(ItemId(99)).unwrap());
        assert!(!w.increment_worn_count(ItemId(99)).unwrap());
        assert!(!w.delete_item(ItemId(99)).unwrap());
        assert!(w.get_item(ItemId(99)).unwrap().is_none());

        let mut ghost = ClothingItem::new(Category::Top, "ghost", "white");
        ghost.id = ItemId(99);
        assert!(w.update_item(ghost).unwrap().is_none());
    }

    #[test]
    fn update_keeps_creation_time() {
        let mut w = stocked();
        w.clock().advance(500);
        let mut item = w.get_item(ItemId(1)).unwrap().unwrap();
        item.note = "needs ironing".to_string();
        item.created_at = 0;

        let updated = w.update_item(item).unwrap().unwrap();
        assert_eq!(updated.created_at, 1_000);
        assert_eq!(updated.updated_at, 1_520);
        assert_eq!(
            w.get_item(ItemId(1)).unwrap().map(|i| i.note),
            Some("needs ironing".to_string())
        );
    }

    #[test]
    fn worn_count_and_stats() {
        let mut w = stocked();
        w.increment_worn_count(ItemId(2)).unwrap();
        w.increment_worn_count(ItemId(2)).unwrap();
        w.increment_worn_count(ItemId(3)).unwrap();
        w.toggle_favorite(ItemId(1)).unwrap();

        let stats = w.stats().unwrap();
        assert_eq!(stats.item_count, 3);
        assert_eq!(stats.by_category.get(&Category::Top), Some(&1));
        assert_eq!(stats.favorite_count, 1);
        assert_eq!(stats.total_worn, 3);
        assert_eq!(stats.most_worn, Some(ItemId(2)));
    }

    #[test]
    fn looks_roundtrip() {
        let mut w = stocked();
        let look = OutfitLook {
            name: "Monday".to_string(),
            item_ids: vec![ItemId(1), ItemId(2), ItemId(3)],
            ..OutfitLook::default()
        };
        let saved = w.save_look(look).unwrap();
        assert_eq!(saved.id, LookId(1));
        assert_eq!(w.all_looks().unwrap().len(), 1);

        w.delete_item(ItemId(2)).unwrap();
        let items = w.look_items(&saved).unwrap();
        assert_eq!(items.len(), 2);

        assert!(w.delete_look(saved.id).unwrap());
        assert!(!w.delete_look(saved.id).unwrap());
    }

    #[test]
    fn saved_look_scores_are_clamped() {
        let mut w = stocked();
        let look = OutfitLook {
            name: "Loud".to_string(),
            item_ids: vec![ItemId(1)],
            weather_match: 200,
            color_harmony: 11,
            style_consistency: 7,
            ..OutfitLook::default()
        };
        let saved = w.save_look(look).unwrap();
        assert_eq!(saved.weather_match, 10);

        let stored = w.get_look(saved.id).unwrap().unwrap();
        assert_eq!(stored.weather_match, 10);
        assert_eq!(stored.color_harmony, 10);
        assert_eq!(stored.style_consistency, 7);
    }

    #[test]
    fn profile_keeps_creation_time() {
        let mut w = wardrobe();
        let first = w
            .save_profile(UserProfile {
                nickname: "first".to_string(),
                ..UserProfile::default()
            })
            .unwrap();
        w.clock().advance(60);
        let second = w
            .save_profile(UserProfile {
                nickname: "second".to_string(),
                ..UserProfile::default()
            })
            .unwrap();
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.updated_at, 1_060);
        assert_eq!(w.profile().unwrap().map(|p| p.nickname), Some("second".to_string()));
    }
}
