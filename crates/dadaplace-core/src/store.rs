//! # Wardrobe Store
//!
//! The persistence boundary of the wardrobe.
//!
//! Stores only know about primary keys and full scans. Predicate filters
//! (category, season, keyword...) are evaluated by [`crate::Wardrobe`] on
//! top of a scan, which is plenty for catalogs of a few hundred items.
//!
//! Two backends exist:
//! - [`MemoryStore`]: `BTreeMap`s, persisted as a snapshot file
//! - [`crate::RedbStore`]: redb tables, one write transaction per mutation

use crate::error::Result;
use crate::formats::{self, WardrobeSnapshot};
use crate::storage::RedbStore;
use crate::types::{
    ClothingItem, Comment, CommentId, CommunityPost, ItemId, LookId, OutfitLook, PostId,
    UserProfile,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// ID COUNTERS
// =============================================================================

/// Next identifier to hand out for each record kind.
///
/// Identifiers start at 1 and are never reused, even after a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdCounters {
    pub next_item: u64,
    pub next_look: u64,
    pub next_post: u64,
    pub next_comment: u64,
}

impl Default for IdCounters {
    fn default() -> Self {
        Self {
            next_item: 1,
            next_look: 1,
            next_post: 1,
            next_comment: 1,
        }
    }
}

/// Record kinds that draw ids from [`IdCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RecordKind {
    Item,
    Look,
    Post,
    Comment,
}

impl IdCounters {
    /// Take the next id for a record kind and bump its counter.
    pub(crate) fn allocate(&mut self, kind: RecordKind) -> u64 {
        let counter = match kind {
            RecordKind::Item => &mut self.next_item,
            RecordKind::Look => &mut self.next_look,
            RecordKind::Post => &mut self.next_post,
            RecordKind::Comment => &mut self.next_comment,
        };
        let id = (*counter).max(1);
        *counter = id.saturating_add(1);
        id
    }
}

// =============================================================================
// STORE TRAIT
// =============================================================================

/// Record-level access to a wardrobe.
///
/// Missing records are `Ok(None)` / `Ok(false)`. Errors are reserved for
/// backend failures.
pub trait WardrobeStore {
    /// Store a new item under a fresh id and return that id.
    fn insert_item(&mut self, item: ClothingItem) -> Result<ItemId>;

    /// Replace an existing item. Returns `false` if the id is unknown.
    fn put_item(&mut self, item: ClothingItem) -> Result<bool>;

    fn get_item(&self, id: ItemId) -> Result<Option<ClothingItem>>;

    fn remove_item(&mut self, id: ItemId) -> Result<bool>;

    /// All items in ascending id order.
    fn items(&self) -> Result<Vec<ClothingItem>>;

    fn insert_look(&mut self, look: OutfitLook) -> Result<LookId>;

    fn get_look(&self, id: LookId) -> Result<Option<OutfitLook>>;

    fn remove_look(&mut self, id: LookId) -> Result<bool>;

    /// All looks in ascending id order.
    fn looks(&self) -> Result<Vec<OutfitLook>>;

    fn profile(&self) -> Result<Option<UserProfile>>;

    fn put_profile(&mut self, profile: UserProfile) -> Result<()>;

    fn insert_post(&mut self, post: CommunityPost) -> Result<PostId>;

    fn put_post(&mut self, post: CommunityPost) -> Result<bool>;

    fn get_post(&self, id: PostId) -> Result<Option<CommunityPost>>;

    /// All posts in ascending id order.
    fn posts(&self) -> Result<Vec<CommunityPost>>;

    fn insert_comment(&mut self, comment: Comment) -> Result<CommentId>;

    fn get_comment(&self, id: CommentId) -> Result<Option<Comment>>;

    /// All comments in ascending id order.
    fn comments(&self) -> Result<Vec<Comment>>;

    fn id_counters(&self) -> Result<IdCounters>;

    /// Replace the whole content of the store with a snapshot.
    fn restore(&mut self, snapshot: WardrobeSnapshot) -> Result<()>;

    /// Capture the whole content of the store.
    fn snapshot(&self) -> Result<WardrobeSnapshot> {
        Ok(WardrobeSnapshot {
            counters: self.id_counters()?,
            items: self.items()?,
            looks: self.looks()?,
            profile: self.profile()?,
            posts: self.posts()?,
            comments: self.comments()?,
        })
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// `BTreeMap`-backed store. Persisted by writing a snapshot file.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: BTreeMap<ItemId, ClothingItem>,
    looks: BTreeMap<LookId, OutfitLook>,
    profile: Option<UserProfile>,
    posts: BTreeMap<PostId, CommunityPost>,
    comments: BTreeMap<CommentId, Comment>,
    counters: IdCounters,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: WardrobeSnapshot) -> Self {
        let counters = snapshot.safe_counters();
        Self {
            items: snapshot.items.into_iter().map(|i| (i.id, i)).collect(),
            looks: snapshot
                .looks
                .into_iter()
                .map(|l| (l.id, l.with_clamped_scores()))
                .collect(),
            profile: snapshot.profile,
            posts: snapshot.posts.into_iter().map(|p| (p.id, p)).collect(),
            comments: snapshot.comments.into_iter().map(|c| (c.id, c)).collect(),
            counters,
        }
    }

    /// Load a store from a snapshot file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let snapshot = formats::decode_snapshot(&bytes)?;
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write the store to a snapshot file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = formats::encode_snapshot(&self.snapshot()?)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Number of items in the catalog.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }
}

impl WardrobeStore for MemoryStore {
    fn insert_item(&mut self, mut item: ClothingItem) -> Result<ItemId> {
        let id = ItemId(self.counters.allocate(RecordKind::Item));
        item.id = id;
        self.items.insert(id, item);
        Ok(id)
    }

    fn put_item(&mut self, item: ClothingItem) -> Result<bool> {
        match self.items.get_mut(&item.id) {
            Some(slot) => {
                *slot = item;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get_item(&self, id: ItemId) -> Result<Option<ClothingItem>> {
        Ok(self.items.get(&id).cloned())
    }

    fn remove_item(&mut self, id: ItemId) -> Result<bool> {
        Ok(self.items.remove(&id).is_some())
    }

    fn items(&self) -> Result<Vec<ClothingItem>> {
        Ok(self.items.values().cloned().collect())
    }

    fn insert_look(&mut self, mut look: OutfitLook) -> Result<LookId> {
        let id = LookId(self.counters.allocate(RecordKind::Look));
        look.id = id;
        self.looks.insert(id, look);
        Ok(id)
    }

    fn get_look(&self, id: LookId) -> Result<Option<OutfitLook>> {
        Ok(self.looks.get(&id).cloned())
    }

    fn remove_look(&mut self, id: LookId) -> Result<bool> {
        Ok(self.looks.remove(&id).is_some())
    }

    fn looks(&self) -> Result<Vec<OutfitLook>> {
        Ok(self.looks.values().cloned().collect())
    }

    fn profile(&self) -> Result<Option<UserProfile>> {
        Ok(self.profile.clone())
    }

    fn put_profile(&mut self, profile: UserProfile) -> Result<()> {
        self.profile = Some(profile);
        Ok(())
    }

    fn insert_post(&mut self, mut post: CommunityPost) -> Result<PostId> {
        let id = PostId(self.counters.allocate(RecordKind::Post));
        post.id = id;
        self.posts.insert(id, post);
        Ok(id)
    }

    fn put_post(&mut self, post: CommunityPost) -> Result<bool> {
        match self.posts.get_mut(&post.id) {
            Some(slot) => {
                *slot = post;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get_post(&self, id: PostId) -> Result<Option<CommunityPost>> {
        Ok(self.posts.get(&id).cloned())
    }

    fn posts(&self) -> Result<Vec<CommunityPost>> {
        Ok(self.posts.values().cloned().collect())
    }

    fn insert_comment(&mut self, mut comment: Comment) -> Result<CommentId> {
        let id = CommentId(self.counters.allocate(RecordKind::Comment));
        comment.id = id;
        self.comments.insert(id, comment);
        Ok(id)
    }

    fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        Ok(self.comments.get(&id).cloned())
    }

    fn comments(&self) -> Result<Vec<Comment>> {
        Ok(self.comments.values().cloned().collect())
    }

    fn id_counters(&self) -> Result<IdCounters> {
        Ok(self.counters)
    }

    fn restore(&mut self, snapshot: WardrobeSnapshot) -> Result<()> {
        *self = Self::from_snapshot(snapshot);
        Ok(())
    }
}

// =============================================================================
// RUNTIME-SELECTED BACKEND
// =============================================================================

/// A store chosen at runtime (`--backend file|redb`).
#[derive(Debug)]
pub enum StoreBackend {
    Memory(MemoryStore),
    Redb(RedbStore),
}

impl StoreBackend {
    /// Short backend name, as accepted on the command line.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "file",
            Self::Redb(_) => "redb",
        }
    }

    /// Borrow the in-memory store, if that is the active backend.
    #[must_use]
    pub fn as_memory(&self) -> Option<&MemoryStore> {
        match self {
            Self::Memory(store) => Some(store),
            Self::Redb(_) => None,
        }
    }
}

macro_rules! delegate {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            StoreBackend::Memory($store) => $call,
            StoreBackend::Redb($store) => $call,
        }
    };
}

impl WardrobeStore for StoreBackend {
    fn insert_item(&mut self, item: ClothingItem) -> Result<ItemId> {
        delegate!(self, s => s.insert_item(item))
    }

    fn put_item(&mut self, item: ClothingItem) -> Result<bool> {
        delegate!(self, s => s.put_item(item))
    }

    fn get_item(&self, id: ItemId) -> Result<Option<ClothingItem>> {
        delegate!(self, s => s.get_item(id))
    }

    fn remove_item(&mut self, id: ItemId) -> Result<bool> {
        delegate!(self, s => s.remove_item(id))
    }

    fn items(&self) -> Result<Vec<ClothingItem>> {
        delegate!(self, s => s.items())
    }

    fn insert_look(&mut self, look: OutfitLook) -> Result<LookId> {
        delegate!(self, s => s.insert_look(look))
    }

    fn get_look(&self, id: LookId) -> Result<Option<OutfitLook>> {
        delegate!(self, s => s.get_look(id))
    }

    fn remove_look(&mut self, id: LookId) -> Result<bool> {
        delegate!(self, s => s.remove_look(id))
    }

    fn looks(&self) -> Result<Vec<OutfitLook>> {
        delegate!(self, s => s.looks())
    }

    fn profile(&self) -> Result<Option<UserProfile>> {
        delegate!(self, s => s.profile())
    }

    fn put_profile(&mut self, profile: UserProfile) -> Result<()> {
        delegate!(self, s => s.put_profile(profile))
    }

    fn insert_post(&mut self, post: CommunityPost) -> Result<PostId> {
        delegate!(self, s => s.insert_post(post))
    }

    fn put_post(&mut self, post: CommunityPost) -> Result<bool> {
        delegate!(self, s => s.put_post(post))
    }

    fn get_post(&self, id: PostId) -> Result<Option<CommunityPost>> {
        delegate!(self, s => s.get_post(id))
    }

    fn posts(&self) -> Result<Vec<CommunityPost>> {
        delegate!(self, s => s.posts())
    }

    fn insert_comment(&mut self, comment: Comment) -> Result<CommentId> {
        delegate!(self, s => s.insert_comment(comment))
    }

    fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        delegate!(self, s => s.get_comment(id))
    }

    fn comments(&self) -> Result<Vec<Comment>> {
        delegate!(self, s => s.comments())
    }

    fn id_counters(&self) -> Result<IdCounters> {
        delegate!(self, s => s.id_counters())
    }

    fn restore(&mut self, snapshot: WardrobeSnapshot) -> Result<()> {
        delegate!(self, s => s.restore(snapshot))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    #[test]
    fn ids_start_at_one_and_are_not_reused() {
        let mut store = MemoryStore::new();
        let a = store
            .insert_item(ClothingItem::new(Category::Top, "tee", "white"))
            .unwrap();
        let b = store
            .insert_item(ClothingItem::new(Category::Bottom, "jeans", "blue"))
            .unwrap();
        assert_eq!(a, ItemId(1));
        assert_eq!(b, ItemId(2));

        assert!(store.remove_item(b).unwrap());
        let c = store
            .insert_item(ClothingItem::new(Category::Shoes, "boots", "brown"))
            .unwrap();
        assert_eq!(c, ItemId(3));
    }

    #[test]
    fn put_item_on_missing_id_is_false() {
        let mut store = MemoryStore::new();
        let mut item = ClothingItem::new(Category::Top, "tee", "white");
        item.id = ItemId(99);
        assert!(!store.put_item(item).unwrap());
        assert_eq!(store.item_count(), 0);
    }

    #[test]
    fn remove_missing_is_false() {
        let mut store = MemoryStore::new();
        assert!(!store.remove_item(ItemId(1)).unwrap());
        assert!(!store.remove_look(LookId(1)).unwrap());
    }

    #[test]
    fn snapshot_restores_counters() {
        let mut store = MemoryStore::new();
        store
            .insert_item(ClothingItem::new(Category::Top, "tee", "white"))
            .unwrap();
        let snapshot = store.snapshot().unwrap();

        let mut restored = MemoryStore::new();
        restored.restore(snapshot).unwrap();
        let next = restored
            .insert_item(ClothingItem::new(Category::Top, "shirt", "blue"))
            .unwrap();
        assert_eq!(next, ItemId(2));
        assert_eq!(restored.item_count(), 2);
    }

    #[test]
    fn restore_raises_counters_past_existing_ids() {
        let mut coat = ClothingItem::new(Category::Top, "coat", "camel");
        coat.id = ItemId(1);
        let comment = Comment {
            id: CommentId(7),
            ..Comment::default()
        };
        let look = OutfitLook {
            id: LookId(3),
            weather_match: 200,
            ..OutfitLook::default()
        };
        let snapshot = WardrobeSnapshot {
            items: vec![coat],
            looks: vec![look],
            comments: vec![comment],
            ..WardrobeSnapshot::default()
        };

        let mut store = MemoryStore::new();
        store.restore(snapshot).unwrap();
        let added = store
            .insert_item(ClothingItem::new(Category::Bottom, "jeans", "blue"))
            .unwrap();

        assert_eq!(added, ItemId(2));
        assert_eq!(store.item_count(), 2);
        assert_eq!(store.get_item(ItemId(1)).unwrap().unwrap().sub_category, "coat");
        assert_eq!(store.id_counters().unwrap().next_comment, 8);
        assert_eq!(store.id_counters().unwrap().next_look, 4);
        assert_eq!(store.get_look(LookId(3)).unwrap().unwrap().weather_match, 10);
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wardrobe.db");

        let mut store = MemoryStore::new();
        store
            .insert_item(ClothingItem::new(Category::Accessory, "scarf", "red"))
            .unwrap();
        store.save(&path).unwrap();

        let loaded = MemoryStore::load(&path).unwrap();
        assert_eq!(loaded.item_count(), 1);
        assert_eq!(
            loaded.get_item(ItemId(1)).unwrap().map(|i| i.sub_category),
            Some("scarf".to_string())
        );
    }

    #[test]
    fn backend_reports_kind() {
        let backend = StoreBackend::Memory(MemoryStore::new());
        assert_eq!(backend.kind(), "file");
        assert!(backend.as_memory().is_some());
    }
}
