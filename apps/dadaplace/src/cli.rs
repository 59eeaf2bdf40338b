//! # CLI Commands
//!
//! One `cmd_*` function per subcommand. Each opens the wardrobe database,
//! does its work, writes the result to stdout (text or JSON) and saves.
//!
//! Two database backends are supported:
//! - `file`: the whole wardrobe in one binary snapshot, rewritten on save
//! - `redb`: an embedded redb database, written per operation

use crate::report;
use dadaplace_core::formats::{
    WardrobeSnapshot, decode_snapshot, encode_snapshot, snapshot_from_json, snapshot_to_json,
};
use dadaplace_core::stubs;
use dadaplace_core::{
    Category, ClothingItem, CommentId, CommunityPost, DadaError, FeedOrder, Gender, ItemId,
    ItemQuery, LookId, MemoryStore, Occasion, OutfitLook, OutfitRequest, PostId, RedbStore,
    Season, SkinTone, StoreBackend, StylePreference, TaggedItem, UserId, UserProfile, Wardrobe,
    WardrobeStore,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// The single local user that owns posts, comments and the profile.
pub const LOCAL_USER: UserId = UserId(1);

/// Default number of trending topics shown with the feed.
pub const TRENDING_TOPICS: usize = 5;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] DadaError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown backend: {0} (expected file or redb)")]
    UnknownBackend(String),

    #[error("unknown format: {0} (expected binary or json)")]
    UnknownFormat(String),

    #[error("database already exists: {} (use --force to overwrite)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidInput(String),
}

pub type CliResult<T> = Result<T, CliError>;

/// A wardrobe session over a runtime-selected backend.
pub type CliWardrobe = Wardrobe<StoreBackend>;

// =============================================================================
// SESSION HANDLING
// =============================================================================

/// Open the database at `db_path`, creating an empty one if it is missing.
pub fn load_or_create_wardrobe(db_path: &Path, backend: &str) -> CliResult<CliWardrobe> {
    let store = match backend {
        "file" => {
            if db_path.exists() {
                StoreBackend::Memory(MemoryStore::load(db_path)?)
            } else {
                debug!(path = %db_path.display(), "no snapshot yet, starting empty");
                StoreBackend::Memory(MemoryStore::new())
            }
        }
        "redb" => StoreBackend::Redb(RedbStore::open(db_path)?),
        other => return Err(CliError::UnknownBackend(other.to_string())),
    };
    Ok(Wardrobe::new(store))
}

/// Persist the session. The redb backend commits per operation, so only the
/// file backend has anything to write.
pub fn save_wardrobe(wardrobe: &CliWardrobe, db_path: &Path) -> CliResult<()> {
    if let Some(memory) = wardrobe.store().as_memory() {
        memory.save(db_path)?;
        debug!(path = %db_path.display(), "saved wardrobe snapshot");
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_tag<T: FromStr<Err = DadaError>>(text: &str) -> CliResult<T> {
    Ok(text.parse::<T>()?)
}

/// Parse tag values, each of which may itself be a comma-separated list.
pub fn parse_tags<T: FromStr<Err = DadaError> + Ord>(values: &[String]) -> CliResult<BTreeSet<T>> {
    let mut tags = BTreeSet::new();
    for value in values {
        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            tags.insert(parse_tag(part)?);
        }
    }
    Ok(tags)
}

fn require_item(wardrobe: &CliWardrobe, id: u64) -> CliResult<ClothingItem> {
    wardrobe
        .get_item(ItemId(id))?
        .ok_or_else(|| CliError::NotFound(format!("item not found: {id}")))
}

// =============================================================================
// INIT / STATUS
// =============================================================================

/// Create a new empty database.
pub fn cmd_init(db_path: &Path, backend: &str, force: bool) -> CliResult<()> {
    if !matches!(backend, "file" | "redb") {
        return Err(CliError::UnknownBackend(backend.to_string()));
    }
    if db_path.exists() {
        if !force {
            return Err(CliError::AlreadyExists(db_path.to_path_buf()));
        }
        std::fs::remove_file(db_path)?;
    }

    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    save_wardrobe(&wardrobe, db_path)?;
    info!(path = %db_path.display(), backend, "initialized wardrobe database");
    println!("Initialized {} wardrobe at {}", backend, db_path.display());
    Ok(())
}

pub fn cmd_status(db_path: &Path, backend: &str, json: bool) -> CliResult<()> {
    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let stats = wardrobe.stats()?;
    if json {
        print_json(&serde_json::json!({
            "backend": wardrobe.store().kind(),
            "stats": stats,
        }))
    } else {
        print!("{}", report::stats_to_text(&stats, wardrobe.store().kind()));
        Ok(())
    }
}

// =============================================================================
// ITEMS
// =============================================================================

/// Fields for `add`. Category and color may be left out when an image is
/// given; they are then guessed from the photo.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    pub category: Option<String>,
    pub sub_category: String,
    pub color: Option<String>,
    pub seasons: Vec<String>,
    pub occasions: Vec<String>,
    pub volume: u32,
    pub brand: Option<String>,
    pub note: Option<String>,
    pub price_cents: Option<u64>,
    pub image: Option<PathBuf>,
}

impl NewItem {
    fn into_item(self) -> CliResult<ClothingItem> {
        let guessed = self.image.as_deref().map(stubs::analyze_clothing_image);
        let category = match (&self.category, &guessed) {
            (Some(text), _) => parse_tag::<Category>(text)?,
            (None, Some((category, _))) => *category,
            (None, None) => {
                return Err(CliError::InvalidInput(
                    "a category is required when no image is given".to_string(),
                ));
            }
        };
        let color = match (self.color, guessed) {
            (Some(color), _) => color,
            (None, Some((_, color))) => color,
            (None, None) => {
                return Err(CliError::InvalidInput(
                    "a color is required when no image is given".to_string(),
                ));
            }
        };

        let mut item = ClothingItem::new(category, self.sub_category, color)
            .with_seasons(parse_tags::<Season>(&self.seasons)?)
            .with_occasions(parse_tags::<Occasion>(&self.occasions)?)
            .with_volume(self.volume);
        item.brand = self.brand.unwrap_or_default();
        item.note = self.note.unwrap_or_default();
        item.buy_price_cents = self.price_cents;
        if let Some(image) = &self.image {
            item.image_uri = image.display().to_string();
            item.crop_uri = stubs::crop_clothing_image(image).display().to_string();
        }
        Ok(item)
    }
}

pub fn cmd_add(db_path: &Path, backend: &str, json: bool, new: NewItem) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let item = wardrobe.add_item(new.into_item()?)?;
    save_wardrobe(&wardrobe, db_path)?;
    if json {
        print_json(&item)
    } else {
        println!("Added {}", report::item_line(&item));
        Ok(())
    }
}

/// Bulk-add items from a JSON array. Ids and timestamps in the file are
/// ignored; every item gets a fresh id.
pub fn cmd_import_items(db_path: &Path, backend: &str, json: bool, input: &Path) -> CliResult<()> {
    let text = std::fs::read_to_string(input)?;
    let items: Vec<ClothingItem> = serde_json::from_str(&text)?;

    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let mut added = Vec::with_capacity(items.len());
    for item in items {
        added.push(wardrobe.add_item(item)?.id);
    }
    save_wardrobe(&wardrobe, db_path)?;
    info!(count = added.len(), "imported items");

    if json {
        print_json(&serde_json::json!({ "imported": added }))
    } else {
        println!("Imported {} items", added.len());
        Ok(())
    }
}

/// Filters for `list`.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub keyword: Option<String>,
    pub category: Option<String>,
    pub season: Option<String>,
    pub occasion: Option<String>,
    pub color: Option<String>,
    pub favorites: bool,
}

impl ListFilter {
    fn to_query(&self) -> CliResult<ItemQuery> {
        Ok(ItemQuery {
            keyword: self.keyword.clone(),
            category: self.category.as_deref().map(parse_tag).transpose()?,
            season: self.season.as_deref().map(parse_tag).transpose()?,
            occasion: self.occasion.as_deref().map(parse_tag).transpose()?,
            color: self.color.clone(),
            favorites_only: self.favorites,
        })
    }
}

pub fn cmd_list(db_path: &Path, backend: &str, json: bool, filter: &ListFilter) -> CliResult<()> {
    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let items = wardrobe.find_items(&filter.to_query()?)?;
    if json {
        return print_json(&items);
    }
    if items.is_empty() {
        println!("No items.");
    }
    for item in &items {
        println!("{}", report::item_line(item));
    }
    Ok(())
}

pub fn cmd_show(db_path: &Path, backend: &str, json: bool, id: u64) -> CliResult<()> {
    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let item = require_item(&wardrobe, id)?;
    if json {
        print_json(&item)
    } else {
        print!("{}", report::item_detail(&item));
        Ok(())
    }
}

/// Fields for `edit`. Unset fields keep their value; tag lists replace the
/// old tags when given.
#[derive(Debug, Clone, Default)]
pub struct ItemEdit {
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub color: Option<String>,
    pub seasons: Option<Vec<String>>,
    pub occasions: Option<Vec<String>>,
    pub volume: Option<u32>,
    pub brand: Option<String>,
    pub note: Option<String>,
    pub price_cents: Option<u64>,
}

impl ItemEdit {
    fn apply(self, item: &mut ClothingItem) -> CliResult<()> {
        if let Some(category) = self.category {
            item.category = parse_tag(&category)?;
        }
        if let Some(sub_category) = self.sub_category {
            item.sub_category = sub_category;
        }
        if let Some(color) = self.color {
            item.base_color = color;
        }
        if let Some(seasons) = self.seasons {
            item.seasons = parse_tags(&seasons)?;
        }
        if let Some(occasions) = self.occasions {
            item.occasions = parse_tags(&occasions)?;
        }
        if let Some(volume) = self.volume {
            item.volume = volume;
        }
        if let Some(brand) = self.brand {
            item.brand = brand;
        }
        if let Some(note) = self.note {
            item.note = note;
        }
        if self.price_cents.is_some() {
            item.buy_price_cents = self.price_cents;
        }
        Ok(())
    }
}

pub fn cmd_edit(db_path: &Path, backend: &str, json: bool, id: u64, edit: ItemEdit) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let mut item = require_item(&wardrobe, id)?;
    edit.apply(&mut item)?;
    let updated = wardrobe
        .update_item(item)?
        .ok_or_else(|| CliError::NotFound(format!("item not found: {id}")))?;
    save_wardrobe(&wardrobe, db_path)?;
    if json {
        print_json(&updated)
    } else {
        println!("Updated {}", report::item_line(&updated));
        Ok(())
    }
}

pub fn cmd_remove(db_path: &Path, backend: &str, json: bool, id: u64) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    if !wardrobe.delete_item(ItemId(id))? {
        return Err(CliError::NotFound(format!("item not found: {id}")));
    }
    save_wardrobe(&wardrobe, db_path)?;
    if json {
        print_json(&serde_json::json!({ "removed": id }))
    } else {
        println!("Removed item #{id}");
        Ok(())
    }
}

pub fn cmd_favorite(db_path: &Path, backend: &str, json: bool, id: u64) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    if !wardrobe.toggle_favorite(ItemId(id))? {
        return Err(CliError::NotFound(format!("item not found: {id}")));
    }
    save_wardrobe(&wardrobe, db_path)?;
    let item = require_item(&wardrobe, id)?;
    if json {
        print_json(&item)
    } else {
        let state = if item.is_favorite { "now a favorite" } else { "no longer a favorite" };
        println!("Item #{id} is {state}");
        Ok(())
    }
}

pub fn cmd_worn(db_path: &Path, backend: &str, json: bool, id: u64) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    if !wardrobe.increment_worn_count(ItemId(id))? {
        return Err(CliError::NotFound(format!("item not found: {id}")));
    }
    save_wardrobe(&wardrobe, db_path)?;
    let item = require_item(&wardrobe, id)?;
    if json {
        print_json(&item)
    } else {
        println!("Item #{id} worn {} times", item.worn_count);
        Ok(())
    }
}

// =============================================================================
// RECOMMENDATIONS
// =============================================================================

fn build_request(
    temperature: i32,
    occasion: &str,
    from: Option<u64>,
    style: Option<&str>,
) -> CliResult<OutfitRequest> {
    let mut request = OutfitRequest::new(temperature, parse_tag(occasion)?);
    if let Some(id) = from {
        request = request.starting_from(ItemId(id));
    }
    if let Some(style) = style {
        request = request.with_style(parse_tag::<StylePreference>(style)?);
    }
    Ok(request)
}

fn print_looks(wardrobe: &CliWardrobe, looks: &[OutfitLook]) -> CliResult<()> {
    if looks.is_empty() {
        println!("No outfit could be put together. Try `dadaplace gaps`.");
    }
    for look in looks {
        print!("{}", report::look_to_text(look, &wardrobe.look_items(look)?));
    }
    Ok(())
}

/// Recommend outfits, optionally around a starting item, optionally saving
/// them as looks.
pub fn cmd_recommend(
    db_path: &Path,
    backend: &str,
    json: bool,
    temperature: i32,
    occasion: &str,
    from: Option<u64>,
    style: Option<&str>,
    save: bool,
) -> CliResult<()> {
    let request = build_request(temperature, occasion, from, style)?;
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let mut looks = wardrobe.recommend(&request)?;

    if save {
        looks = looks
            .into_iter()
            .map(|look| wardrobe.save_look(look))
            .collect::<Result<Vec<_>, _>>()?;
        save_wardrobe(&wardrobe, db_path)?;
    }

    if json {
        print_json(&looks)
    } else {
        print_looks(&wardrobe, &looks)
    }
}

pub fn cmd_gaps(
    db_path: &Path,
    backend: &str,
    json: bool,
    temperature: i32,
    occasion: &str,
) -> CliResult<()> {
    let request = build_request(temperature, occasion, None, None)?;
    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let gaps = wardrobe.analyze_gaps(&request)?;
    if json {
        print_json(&gaps)
    } else {
        print!("{}", report::gaps_to_text(&gaps));
        Ok(())
    }
}

/// Score a hand-picked set of items.
pub fn cmd_score(
    db_path: &Path,
    backend: &str,
    json: bool,
    item_ids: &[u64],
    temperature: i32,
    occasion: &str,
) -> CliResult<()> {
    if item_ids.is_empty() {
        return Err(CliError::InvalidInput("no items to score".to_string()));
    }
    let request = build_request(temperature, occasion, None, None)?;
    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let items = item_ids
        .iter()
        .map(|id| require_item(&wardrobe, *id))
        .collect::<CliResult<Vec<_>>>()?;

    let engine = wardrobe.engine();
    let score = engine.score(&items, &request);
    let reason = engine.explain_reason(&items, &request);
    if json {
        return print_json(&serde_json::json!({
            "score": score,
            "overall": score.overall(),
            "reason": reason,
        }));
    }
    let look = OutfitLook {
        name: "Your outfit".to_string(),
        item_ids: items.iter().map(|i| i.id).collect(),
        recommendation_reason: reason,
        weather_match: score.weather_match,
        color_harmony: score.color_harmony,
        style_consistency: score.style_consistency,
        ..OutfitLook::default()
    };
    print!("{}", report::look_to_text(&look, &items));
    Ok(())
}

// =============================================================================
// LOOKS
// =============================================================================

/// Save a hand-made look from item ids.
pub fn cmd_look_save(
    db_path: &Path,
    backend: &str,
    json: bool,
    name: &str,
    item_ids: &[u64],
    occasion: Option<&str>,
    public: bool,
) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let items = item_ids
        .iter()
        .map(|id| require_item(&wardrobe, *id))
        .collect::<CliResult<Vec<_>>>()?;
    if items.is_empty() {
        return Err(CliError::InvalidInput("a look needs at least one item".to_string()));
    }
    let occasions = match occasion {
        Some(text) => vec![parse_tag::<Occasion>(text)?],
        None => Vec::new(),
    };

    let profile = wardrobe.profile()?.unwrap_or_default();

    let look = wardrobe.save_look(OutfitLook {
        name: name.to_string(),
        item_ids: items.iter().map(|i| i.id).collect(),
        occasions,
        is_public: public,
        creator_user_id: LOCAL_USER,
        image_uri: stubs::render_virtual_model(&items, &profile),
        ..OutfitLook::default()
    })?;
    save_wardrobe(&wardrobe, db_path)?;

    if json {
        print_json(&look)
    } else {
        println!("Saved look #{} {}", look.id, look.name);
        Ok(())
    }
}

pub fn cmd_look_list(db_path: &Path, backend: &str, json: bool) -> CliResult<()> {
    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let looks = wardrobe.all_looks()?;
    if json {
        return print_json(&looks);
    }
    if looks.is_empty() {
        println!("No saved looks.");
    }
    for look in &looks {
        println!(
            "#{:<4} {} ({} items, overall {})",
            look.id,
            look.name,
            look.item_ids.len(),
            look.score().overall()
        );
    }
    Ok(())
}

pub fn cmd_look_show(db_path: &Path, backend: &str, json: bool, id: u64) -> CliResult<()> {
    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let look = wardrobe
        .get_look(LookId(id))?
        .ok_or_else(|| CliError::NotFound(format!("look not found: {id}")))?;
    if json {
        print_json(&look)
    } else {
        print!("{}", report::look_to_text(&look, &wardrobe.look_items(&look)?));
        Ok(())
    }
}

pub fn cmd_look_delete(db_path: &Path, backend: &str, json: bool, id: u64) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    if !wardrobe.delete_look(LookId(id))? {
        return Err(CliError::NotFound(format!("look not found: {id}")));
    }
    save_wardrobe(&wardrobe, db_path)?;
    if json {
        print_json(&serde_json::json!({ "removed": id }))
    } else {
        println!("Deleted look #{id}");
        Ok(())
    }
}

// =============================================================================
// COMMUNITY
// =============================================================================

/// Fields for `post`.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub content: String,
    pub topics: Vec<String>,
    pub images: Vec<String>,
    pub look: Option<u64>,
    /// Items tagged at the center of the image.
    pub tags: Vec<u64>,
}

pub fn cmd_post(db_path: &Path, backend: &str, json: bool, draft: PostDraft) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    if let Some(look) = draft.look
        && wardrobe.get_look(LookId(look))?.is_none()
    {
        return Err(CliError::NotFound(format!("look not found: {look}")));
    }
    let mut tagged = Vec::with_capacity(draft.tags.len());
    for id in &draft.tags {
        let item = require_item(&wardrobe, *id)?;
        tagged.push(TaggedItem::new(item.id, 5_000, 5_000));
    }

    let mut post = CommunityPost::new(LOCAL_USER, draft.content)
        .with_topics(draft.topics)
        .with_tagged_items(tagged);
    post.image_uris = draft.images;
    post.outfit_look_id = draft.look.map(LookId);

    let post = wardrobe.publish_post(post)?;
    save_wardrobe(&wardrobe, db_path)?;
    if json {
        print_json(&post)
    } else {
        print!("{}", report::post_to_text(&post));
        Ok(())
    }
}

pub fn cmd_like(db_path: &Path, backend: &str, json: bool, id: u64) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let post = wardrobe
        .like_post(PostId(id))?
        .ok_or_else(|| CliError::NotFound(format!("post not found: {id}")))?;
    save_wardrobe(&wardrobe, db_path)?;
    if json {
        print_json(&post)
    } else {
        println!("Post #{id} has {} likes", post.like_count);
        Ok(())
    }
}

pub fn cmd_collect(db_path: &Path, backend: &str, json: bool, id: u64) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let post = wardrobe
        .collect_post(PostId(id))?
        .ok_or_else(|| CliError::NotFound(format!("post not found: {id}")))?;
    save_wardrobe(&wardrobe, db_path)?;
    if json {
        print_json(&post)
    } else {
        println!("Post #{id} collected {} times", post.favorite_count);
        Ok(())
    }
}

pub fn cmd_share(db_path: &Path, backend: &str, json: bool, id: u64) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let post = wardrobe
        .share_post(PostId(id))?
        .ok_or_else(|| CliError::NotFound(format!("post not found: {id}")))?;
    save_wardrobe(&wardrobe, db_path)?;
    if json {
        print_json(&post)
    } else {
        println!("Post #{id} shared {} times", post.share_count);
        Ok(())
    }
}

/// Hide a post, or soft-delete it when `delete` is set.
pub fn cmd_retract(
    db_path: &Path,
    backend: &str,
    json: bool,
    id: u64,
    delete: bool,
) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let done = if delete {
        wardrobe.delete_post(PostId(id))?
    } else {
        wardrobe.hide_post(PostId(id))?
    };
    if !done {
        return Err(CliError::NotFound(format!("post not found: {id}")));
    }
    save_wardrobe(&wardrobe, db_path)?;
    let action = if delete { "deleted" } else { "hidden" };
    if json {
        print_json(&serde_json::json!({ "id": id, "status": action }))
    } else {
        println!("Post #{id} {action}");
        Ok(())
    }
}

pub fn cmd_comment(
    db_path: &Path,
    backend: &str,
    json: bool,
    post_id: u64,
    content: &str,
    reply_to: Option<u64>,
) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let comment = wardrobe
        .add_comment(PostId(post_id), LOCAL_USER, content, reply_to.map(CommentId))?
        .ok_or_else(|| CliError::NotFound(format!("post not found: {post_id}")))?;
    save_wardrobe(&wardrobe, db_path)?;
    if json {
        print_json(&comment)
    } else {
        println!("{}", report::comment_line(&comment));
        Ok(())
    }
}

/// Parse `latest`, `mixed` or `following` into a feed order.
pub fn parse_feed_order(order: &str, follow: &[u64]) -> CliResult<FeedOrder> {
    match order.trim().to_lowercase().as_str() {
        "latest" => Ok(FeedOrder::Latest),
        "mixed" => Ok(FeedOrder::Mixed),
        "following" => Ok(FeedOrder::Following(
            follow.iter().copied().map(UserId).collect(),
        )),
        other => Err(CliError::InvalidInput(format!(
            "unknown feed order: {other} (expected latest, mixed or following)"
        ))),
    }
}

/// Show the feed, or search it when `search` is given.
pub fn cmd_feed(
    db_path: &Path,
    backend: &str,
    json: bool,
    order: &str,
    follow: &[u64],
    search: Option<&str>,
    comments: bool,
) -> CliResult<()> {
    let order = parse_feed_order(order, follow)?;
    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let posts = match search {
        Some(text) => wardrobe.search_posts(text)?,
        None => wardrobe.feed(&order)?,
    };
    let trending = wardrobe.trending_topics(TRENDING_TOPICS)?;

    if json {
        return print_json(&serde_json::json!({
            "posts": posts,
            "trending": trending,
        }));
    }
    if !trending.is_empty() {
        let topics: Vec<_> = trending
            .iter()
            .map(|(topic, count)| format!("#{topic} ({count})"))
            .collect();
        println!("Trending: {}", topics.join("  "));
    }
    if posts.is_empty() {
        println!("No posts.");
    }
    for post in &posts {
        print!("{}", report::post_to_text(post));
        if comments {
            for comment in wardrobe.comments_for_post(post.id)? {
                println!("    {}", report::comment_line(&comment));
            }
        }
    }
    Ok(())
}

// =============================================================================
// PROFILE
// =============================================================================

pub fn cmd_profile_show(db_path: &Path, backend: &str, json: bool) -> CliResult<()> {
    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let profile = wardrobe.profile()?;
    if json {
        return print_json(&profile);
    }
    match profile {
        Some(profile) => print!("{}", report::profile_to_text(&profile)),
        None => println!("No profile yet. Set one with `dadaplace profile set`."),
    }
    Ok(())
}

/// Fields for `profile set`. Unset fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub nickname: Option<String>,
    pub avatar: Option<String>,
    pub gender: Option<String>,
    pub height_cm: Option<u32>,
    pub weight_grams: Option<u32>,
    pub skin_tone: Option<String>,
    pub style: Option<String>,
}

pub fn cmd_profile_set(db_path: &Path, backend: &str, json: bool, edit: ProfileEdit) -> CliResult<()> {
    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let mut profile = wardrobe.profile()?.unwrap_or_default();
    profile.id = LOCAL_USER;
    if let Some(nickname) = edit.nickname {
        profile.nickname = nickname;
    }
    if let Some(avatar) = edit.avatar {
        profile.avatar = avatar;
    }
    if let Some(gender) = edit.gender {
        profile.gender = parse_tag::<Gender>(&gender)?;
    }
    if edit.height_cm.is_some() {
        profile.height_cm = edit.height_cm;
    }
    if edit.weight_grams.is_some() {
        profile.weight_grams = edit.weight_grams;
    }
    if let Some(skin) = edit.skin_tone {
        profile.skin_tone = parse_tag::<SkinTone>(&skin)?;
    }
    if let Some(style) = edit.style {
        profile.style_preference = parse_tag::<StylePreference>(&style)?;
    }

    let profile: UserProfile = wardrobe.save_profile(profile)?;
    save_wardrobe(&wardrobe, db_path)?;
    if json {
        print_json(&profile)
    } else {
        print!("{}", report::profile_to_text(&profile));
        Ok(())
    }
}

// =============================================================================
// EXPORT / IMPORT
// =============================================================================

/// Write the whole wardrobe to `output` as `binary` or `json`.
pub fn cmd_export(db_path: &Path, backend: &str, output: &Path, format: &str) -> CliResult<()> {
    let wardrobe = load_or_create_wardrobe(db_path, backend)?;
    let snapshot = wardrobe.store().snapshot()?;
    match format {
        "binary" => std::fs::write(output, encode_snapshot(&snapshot)?)?,
        "json" => std::fs::write(output, snapshot_to_json(&snapshot)?)?,
        other => return Err(CliError::UnknownFormat(other.to_string())),
    }
    info!(path = %output.display(), format, items = snapshot.items.len(), "exported wardrobe");
    println!(
        "Exported {} items, {} looks and {} posts to {}",
        snapshot.items.len(),
        snapshot.looks.len(),
        snapshot.posts.len(),
        output.display()
    );
    Ok(())
}

/// Load an exported wardrobe into an empty database.
pub fn cmd_import(db_path: &Path, backend: &str, input: &Path, format: &str) -> CliResult<()> {
    let snapshot: WardrobeSnapshot = match format {
        "binary" => decode_snapshot(&std::fs::read(input)?)?,
        "json" => snapshot_from_json(&std::fs::read_to_string(input)?)?,
        other => return Err(CliError::UnknownFormat(other.to_string())),
    };

    let mut wardrobe = load_or_create_wardrobe(db_path, backend)?;
    if !wardrobe.store().snapshot()?.is_empty() {
        return Err(CliError::InvalidInput(
            "import needs an empty database".to_string(),
        ));
    }
    let items = snapshot.items.len();
    wardrobe.store_mut().restore(snapshot)?;
    save_wardrobe(&wardrobe, db_path)?;
    info!(path = %input.display(), format, items, "imported wardrobe");
    println!("Imported {} items from {}", items, input.display());
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
