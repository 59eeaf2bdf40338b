//! redb-backed [`WardrobeStore`].
//!
//! One table per record kind keyed by the numeric id, plus a `meta` table
//! holding the id counters and the single user profile. Values are postcard
//! blobs; the tag sets and id lists travel inside them.

use crate::error::Result;
use crate::formats::WardrobeSnapshot;
use crate::store::{IdCounters, RecordKind, WardrobeStore};
use crate::types::{
    ClothingItem, Comment, CommentId, CommunityPost, ItemId, LookId, OutfitLook, PostId,
    UserProfile,
};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::{Path, PathBuf};

type RecordTable = TableDefinition<'static, u64, &'static [u8]>;

const ITEMS: RecordTable = TableDefinition::new("items");
const LOOKS: RecordTable = TableDefinition::new("looks");
const POSTS: RecordTable = TableDefinition::new("posts");
const COMMENTS: RecordTable = TableDefinition::new("comments");
const META: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

const COUNTERS_KEY: &str = "counters";
const PROFILE_KEY: &str = "profile";

/// Wardrobe stored in a redb database file.
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedbStore")
            .field("path", &self.path)
            .finish()
    }
}

impl RedbStore {
    /// Open (or create) a database and make sure every table exists.
    pub fn open(path: &Path) -> Result<Self> {
        let db = Database::create(path)?;
        let txn = db.begin_write()?;
        {
            txn.open_table(ITEMS)?;
            txn.open_table(LOOKS)?;
            txn.open_table(POSTS)?;
            txn.open_table(COMMENTS)?;
            txn.open_table(META)?;
        }
        txn.commit()?;
        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    /// Path of the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_record<T: DeserializeOwned>(&self, table: RecordTable, id: u64) -> Result<Option<T>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(table)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(postcard::from_bytes(guard.value())?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(&self, table: RecordTable) -> Result<Vec<T>> {
        let txn = self.db.begin_read()?;
        let table = txn.open_table(table)?;
        let mut out = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            out.push(postcard::from_bytes(value.value())?);
        }
        Ok(out)
    }

    /// Overwrite a record only if its key is already present.
    fn replace_record<T: Serialize>(&self, table: RecordTable, id: u64, record: &T) -> Result<bool> {
        let bytes = postcard::to_allocvec(record)?;
        let txn = self.db.begin_write()?;
        let replaced = {
            let mut table = txn.open_table(table)?;
            let exists = table.get(id)?.is_some();
            if exists {
                table.insert(id, bytes.as_slice())?;
            }
            exists
        };
        txn.commit()?;
        Ok(replaced)
    }

    fn remove_record(&self, table: RecordTable, id: u64) -> Result<bool> {
        let txn = self.db.begin_write()?;
        let removed = {
            let mut table = txn.open_table(table)?;
            table.remove(id)?.is_some()
        };
        txn.commit()?;
        Ok(removed)
    }

    /// Allocate an id and store the record in the same transaction.
    fn insert_new<T: Serialize>(
        &self,
        table: RecordTable,
        kind: RecordKind,
        assign: fn(&mut T, u64),
        mut record: T,
    ) -> Result<u64> {
        let txn = self.db.begin_write()?;
        let id = {
            let mut meta = txn.open_table(META)?;
            let mut counters: IdCounters = match meta.get(COUNTERS_KEY)? {
                Some(guard) => postcard::from_bytes(guard.value())?,
                None => IdCounters::default(),
            };
            let id = counters.allocate(kind);
            let encoded = postcard::to_allocvec(&counters)?;
            meta.insert(COUNTERS_KEY, encoded.as_slice())?;

            assign(&mut record, id);
            let bytes = postcard::to_allocvec(&record)?;
            let mut records = txn.open_table(table)?;
            records.insert(id, bytes.as_slice())?;
            id
        };
        txn.commit()?;
        Ok(id)
    }

    fn read_meta<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let txn = self.db.begin_read()?;
        let meta = txn.open_table(META)?;
        match meta.get(key)? {
            Some(guard) => Ok(Some(postcard::from_bytes(guard.value())?)),
            None => Ok(None),
        }
    }

    fn write_meta<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = postcard::to_allocvec(value)?;
        let txn = self.db.begin_write()?;
        {
            let mut meta = txn.open_table(META)?;
            meta.insert(key, bytes.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }
}

impl WardrobeStore for RedbStore {
    fn insert_item(&mut self, item: ClothingItem) -> Result<ItemId> {
        self.insert_new(
            ITEMS,
            RecordKind::Item,
            |i: &mut ClothingItem, id| i.id = ItemId(id),
            item,
        )
        .map(ItemId)
    }

    fn put_item(&mut self, item: ClothingItem) -> Result<bool> {
        self.replace_record(ITEMS, item.id.0, &item)
    }

    fn get_item(&self, id: ItemId) -> Result<Option<ClothingItem>> {
        self.read_record(ITEMS, id.0)
    }

    fn remove_item(&mut self, id: ItemId) -> Result<bool> {
        self.remove_record(ITEMS, id.0)
    }

    fn items(&self) -> Result<Vec<ClothingItem>> {
        self.scan(ITEMS)
    }

    fn insert_look(&mut self, look: OutfitLook) -> Result<LookId> {
        self.insert_new(
            LOOKS,
            RecordKind::Look,
            |l: &mut OutfitLook, id| l.id = LookId(id),
            look,
        )
        .map(LookId)
    }

    fn get_look(&self, id: LookId) -> Result<Option<OutfitLook>> {
        self.read_record(LOOKS, id.0)
    }

    fn remove_look(&mut self, id: LookId) -> Result<bool> {
        self.remove_record(LOOKS, id.0)
    }

    fn looks(&self) -> Result<Vec<OutfitLook>> {
        self.scan(LOOKS)
    }

    fn profile(&self) -> Result<Option<UserProfile>> {
        self.read_meta(PROFILE_KEY)
    }

    fn put_profile(&mut self, profile: UserProfile) -> Result<()> {
        self.write_meta(PROFILE_KEY, &profile)
    }

    fn insert_post(&mut self, post: CommunityPost) -> Result<PostId> {
        self.insert_new(
            POSTS,
            RecordKind::Post,
            |p: &mut CommunityPost, id| p.id = PostId(id),
            post,
        )
        .map(PostId)
    }

    fn put_post(&mut self, post: CommunityPost) -> Result<bool> {
        self.replace_record(POSTS, post.id.0, &post)
    }

    fn get_post(&self, id: PostId) -> Result<Option<CommunityPost>> {
        self.read_record(POSTS, id.0)
    }

    fn posts(&self) -> Result<Vec<CommunityPost>> {
        self.scan(POSTS)
    }

    fn insert_comment(&mut self, comment: Comment) -> Result<CommentId> {
        self.insert_new(
            COMMENTS,
            RecordKind::Comment,
            |c: &mut Comment, id| c.id = CommentId(id),
            comment,
        )
        .map(CommentId)
    }

    fn get_comment(&self, id: CommentId) -> Result<Option<Comment>> {
        self.read_record(COMMENTS, id.0)
    }

    fn comments(&self) -> Result<Vec<Comment>> {
        self.scan(COMMENTS)
    }

    fn id_counters(&self) -> Result<IdCounters> {
        Ok(self.read_meta(COUNTERS_KEY)?.unwrap_or_default())
    }

    fn restore(&mut self, snapshot: WardrobeSnapshot) -> Result<()> {
        let txn = self.db.begin_write()?;
        {
            for table in [ITEMS, LOOKS, POSTS, COMMENTS] {
                txn.delete_table(table)?;
            }
            txn.delete_table(META)?;

            let mut items = txn.open_table(ITEMS)?;
            for item in &snapshot.items {
                items.insert(item.id.0, postcard::to_allocvec(item)?.as_slice())?;
            }
            let mut looks = txn.open_table(LOOKS)?;
            for look in &snapshot.looks {
                let look = look.clone().with_clamped_scores();
                looks.insert(look.id.0, postcard::to_allocvec(&look)?.as_slice())?;
            }
            let mut posts = txn.open_table(POSTS)?;
            for post in &snapshot.posts {
                posts.insert(post.id.0, postcard::to_allocvec(post)?.as_slice())?;
            }
            let mut comments = txn.open_table(COMMENTS)?;
            for comment in &snapshot.comments {
                comments.insert(comment.id.0, postcard::to_allocvec(comment)?.as_slice())?;
            }
            let mut meta = txn.open_table(META)?;
            meta.insert(
                COUNTERS_KEY,
                postcard::to_allocvec(&snapshot.safe_counters())?.as_slice(),
            )?;
            if let Some(profile) = &snapshot.profile {
                meta.insert(PROFILE_KEY, postcard::to_allocvec(profile)?.as_slice())?;
            }
        }
        txn.commit()?;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::types::{Category, Occasion, Season};

    fn open_temp() -> (tempfile::TempDir, RedbStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("wardrobe.redb")).unwrap();
        (dir, store)
    }

    #[test]
    fn insert_and_get_item() {
        let (_dir, mut store) = open_temp();
        let item = ClothingItem::new(Category::Top, "shirt", "white")
            .with_seasons([Season::Spring, Season::Autumn])
            .with_occasions([Occasion::Work]);

        let id = store.insert_item(item).unwrap();
        assert_eq!(id, ItemId(1));

        let loaded = store.get_item(id).unwrap().unwrap();
        assert_eq!(loaded.id, id);
        assert!(loaded.has_season(Season::Autumn));
        assert!(loaded.has_occasion(Occasion::Work));
    }

    #[test]
    fn counters_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wardrobe.redb");
        {
            let mut store = RedbStore::open(&path).unwrap();
            store
                .insert_item(ClothingItem::new(Category::Top, "tee", "black"))
                .unwrap();
        }
        let mut store = RedbStore::open(&path).unwrap();
        let next = store
            .insert_item(ClothingItem::new(Category::Bottom, "jeans", "blue"))
            .unwrap();
        assert_eq!(next, ItemId(2));
        assert_eq!(store.items().unwrap().len(), 2);
    }

    #[test]
    fn put_and_remove() {
        let (_dir, mut store) = open_temp();
        let id = store
            .insert_item(ClothingItem::new(Category::Shoes, "boots", "brown"))
            .unwrap();

        let mut item = store.get_item(id).unwrap().unwrap();
        item.worn_count = 3;
        assert!(store.put_item(item).unwrap());
        assert_eq!(store.get_item(id).unwrap().map(|i| i.worn_count), Some(3));

        assert!(store.remove_item(id).unwrap());
        assert!(!store.remove_item(id).unwrap());
        assert!(store.get_item(id).unwrap().is_none());
    }

    #[test]
    fn put_unknown_item_is_false() {
        let (_dir, mut store) = open_temp();
        let mut item = ClothingItem::new(Category::Top, "tee", "white");
        item.id = ItemId(42);
        assert!(!store.put_item(item).unwrap());
        assert!(store.items().unwrap().is_empty());
    }

    #[test]
    fn profile_roundtrip() {
        let (_dir, mut store) = open_temp();
        assert!(store.profile().unwrap().is_none());

        let profile = UserProfile {
            nickname: "mori".to_string(),
            height_cm: Some(165),
            ..UserProfile::default()
        };
        store.put_profile(profile.clone()).unwrap();
        assert_eq!(store.profile().unwrap(), Some(profile));
    }

    #[test]
    fn restore_matches_memory_snapshot() {
        let mut memory = MemoryStore::new();
        memory
            .insert_item(ClothingItem::new(Category::Top, "tee", "white"))
            .unwrap();
        memory
            .insert_item(ClothingItem::new(Category::Bottom, "skirt", "black"))
            .unwrap();
        memory
            .insert_post(CommunityPost::new(crate::types::UserId(1), "hello"))
            .unwrap();
        let snapshot = memory.snapshot().unwrap();

        let (_dir, mut store) = open_temp();
        store
            .insert_item(ClothingItem::new(Category::Shoes, "old", "red"))
            .unwrap();
        store.restore(snapshot.clone()).unwrap();

        assert_eq!(store.snapshot().unwrap(), snapshot);
    }

    #[test]
    fn restore_with_stale_counters_does_not_overwrite() {
        let mut coat = ClothingItem::new(Category::Top, "coat", "camel");
        coat.id = ItemId(1);
        let snapshot = WardrobeSnapshot {
            items: vec![coat],
            ..WardrobeSnapshot::default()
        };

        let (_dir, mut store) = open_temp();
        store.restore(snapshot).unwrap();
        let added = store
            .insert_item(ClothingItem::new(Category::Bottom, "jeans", "blue"))
            .unwrap();

        assert_eq!(added, ItemId(2));
        assert_eq!(store.items().unwrap().len(), 2);
        assert_eq!(store.get_item(ItemId(1)).unwrap().unwrap().sub_category, "coat");
    }
}
