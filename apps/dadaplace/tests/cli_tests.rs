//! Integration tests for DaDaPlace CLI commands.
//!
//! Uses tempfile for testing file-based operations.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use dadaplace::cli::{
    CliError, ItemEdit, ListFilter, NewItem, PostDraft, ProfileEdit, cmd_add, cmd_collect,
    cmd_comment, cmd_edit, cmd_export, cmd_favorite, cmd_feed, cmd_gaps, cmd_import,
    cmd_import_items, cmd_init, cmd_like, cmd_list, cmd_look_delete, cmd_look_save, cmd_post,
    cmd_profile_set, cmd_recommend, cmd_remove, cmd_retract, cmd_score, cmd_share, cmd_status,
    cmd_worn, load_or_create_wardrobe,
};
use dadaplace_core::{Category, ItemId, LookId, Occasion, PostId, Season, StylePreference};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Create a temporary directory for tests.
fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn new_item(category: &str, sub_category: &str, color: &str) -> NewItem {
    NewItem {
        category: Some(category.to_string()),
        sub_category: sub_category.to_string(),
        color: Some(color.to_string()),
        seasons: vec!["winter,autumn".to_string()],
        occasions: vec!["casual".to_string()],
        volume: 2,
        ..NewItem::default()
    }
}

/// Initialize a database holding one top, one bottom and one pair of shoes.
fn seeded_db(dir: &TempDir, backend: &str) -> PathBuf {
    let db_path = dir.path().join("wardrobe.db");
    cmd_init(&db_path, backend, false).unwrap();
    cmd_add(&db_path, backend, false, new_item("top", "sweater", "navy")).unwrap();
    cmd_add(&db_path, backend, false, new_item("bottom", "jeans", "blue")).unwrap();
    cmd_add(&db_path, backend, false, new_item("shoes", "boots", "black")).unwrap();
    db_path
}

fn create_items_json(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("items.json");
    let content = r#"[
        {"category": "top", "sub_category": "tee", "base_color": "white",
         "seasons": ["summer"], "occasions": ["casual"]},
        {"category": "bottom", "sub_category": "shorts", "base_color": "khaki",
         "seasons": ["summer"], "occasions": ["casual", "sport"]}
    ]"#;
    std::fs::write(&path, content).unwrap();
    path
}

fn item_count(db_path: &Path, backend: &str) -> usize {
    load_or_create_wardrobe(db_path, backend)
        .unwrap()
        .all_items()
        .unwrap()
        .len()
}

// =============================================================================
// INIT COMMAND TESTS
// =============================================================================

#[test]
fn test_init_creates_file_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");

    let result = cmd_init(&db_path, "file", false);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_init_creates_redb_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.redb");

    let result = cmd_init(&db_path, "redb", false);
    assert!(result.is_ok());
    assert!(db_path.exists());
}

#[test]
fn test_init_refuses_existing_without_force() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    let result = cmd_init(&db_path, "file", false);
    assert!(matches!(result, Err(CliError::AlreadyExists(_))));
    assert_eq!(item_count(&db_path, "file"), 3);
}

#[test]
fn test_init_force_overwrites() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    cmd_init(&db_path, "file", true).unwrap();
    assert_eq!(item_count(&db_path, "file"), 0);
}

#[test]
fn test_init_unknown_backend() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");

    let result = cmd_init(&db_path, "sqlite", false);
    assert!(matches!(result, Err(CliError::UnknownBackend(_))));
    assert!(!db_path.exists());
}

// =============================================================================
// ITEM COMMAND TESTS
// =============================================================================

#[test]
fn test_add_persists_across_sessions() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    let sweater = wardrobe.get_item(ItemId(1)).unwrap().unwrap();
    assert_eq!(sweater.category, Category::Top);
    assert_eq!(sweater.sub_category, "sweater");
    assert!(sweater.has_season(Season::Winter));
    assert!(sweater.has_season(Season::Autumn));
    assert!(sweater.has_occasion(Occasion::Casual));
}

#[test]
fn test_add_with_redb_backend() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "redb");
    assert_eq!(item_count(&db_path, "redb"), 3);
}

#[test]
fn test_add_rejects_unknown_tag() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");
    cmd_init(&db_path, "file", false).unwrap();

    let mut item = new_item("top", "tee", "white");
    item.seasons = vec!["monsoon".to_string()];
    assert!(cmd_add(&db_path, "file", false, item).is_err());
    assert_eq!(item_count(&db_path, "file"), 0);
}

#[test]
fn test_add_from_image_guesses_category() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");
    cmd_init(&db_path, "file", false).unwrap();

    let new = NewItem {
        sub_category: "shirt".to_string(),
        image: Some(temp.path().join("shirt.jpg")),
        ..NewItem::default()
    };
    cmd_add(&db_path, "file", true, new).unwrap();

    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    let item = wardrobe.get_item(ItemId(1)).unwrap().unwrap();
    assert_eq!(item.category, Category::Top);
    assert_eq!(item.base_color, "white");
    assert!(item.image_uri.ends_with("shirt.jpg"));
}

#[test]
fn test_import_items_from_json() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");
    let input = create_items_json(&temp);

    cmd_import_items(&db_path, "file", false, &input).unwrap();
    assert_eq!(item_count(&db_path, "file"), 2);
}

#[test]
fn test_import_items_invalid_json() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");
    let input = temp.path().join("bad.json");
    std::fs::write(&input, "not json").unwrap();

    let result = cmd_import_items(&db_path, "file", false, &input);
    assert!(matches!(result, Err(CliError::Json(_))));
}

#[test]
fn test_list_with_filters() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    let filter = ListFilter {
        category: Some("bottom".to_string()),
        ..ListFilter::default()
    };
    assert!(cmd_list(&db_path, "file", true, &filter).is_ok());

    let bad = ListFilter {
        season: Some("monsoon".to_string()),
        ..ListFilter::default()
    };
    assert!(cmd_list(&db_path, "file", false, &bad).is_err());
}

#[test]
fn test_edit_replaces_fields() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    let edit = ItemEdit {
        color: Some("grey".to_string()),
        seasons: Some(vec!["spring".to_string()]),
        ..ItemEdit::default()
    };
    cmd_edit(&db_path, "file", false, 1, edit).unwrap();

    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    let item = wardrobe.get_item(ItemId(1)).unwrap().unwrap();
    assert_eq!(item.base_color, "grey");
    assert!(item.has_season(Season::Spring));
    assert!(!item.has_season(Season::Winter));
    assert_eq!(item.sub_category, "sweater");
}

#[test]
fn test_edit_missing_item() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    let result = cmd_edit(&db_path, "file", false, 99, ItemEdit::default());
    assert!(matches!(result, Err(CliError::NotFound(_))));
}

#[test]
fn test_remove_item() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    cmd_remove(&db_path, "file", false, 2).unwrap();
    assert_eq!(item_count(&db_path, "file"), 2);
    assert!(cmd_remove(&db_path, "file", false, 2).is_err());
}

#[test]
fn test_favorite_toggles_twice() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    cmd_favorite(&db_path, "file", false, 1).unwrap();
    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    assert!(wardrobe.get_item(ItemId(1)).unwrap().unwrap().is_favorite);

    cmd_favorite(&db_path, "file", false, 1).unwrap();
    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    assert!(!wardrobe.get_item(ItemId(1)).unwrap().unwrap().is_favorite);
}

#[test]
fn test_worn_counts_up() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "redb");

    cmd_worn(&db_path, "redb", false, 3).unwrap();
    cmd_worn(&db_path, "redb", false, 3).unwrap();
    let wardrobe = load_or_create_wardrobe(&db_path, "redb").unwrap();
    assert_eq!(wardrobe.get_item(ItemId(3)).unwrap().unwrap().worn_count, 2);
}

#[test]
fn test_status_reports() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    assert!(cmd_status(&db_path, "file", false).is_ok());
    assert!(cmd_status(&db_path, "file", true).is_ok());
}

// =============================================================================
// RECOMMENDATION COMMAND TESTS
// =============================================================================

#[test]
fn test_recommend_and_save() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    cmd_recommend(&db_path, "file", true, 5, "casual", None, None, true).unwrap();

    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    let looks = wardrobe.all_looks().unwrap();
    assert_eq!(looks.len(), 1);
    assert_eq!(looks[0].item_ids, vec![ItemId(1), ItemId(2), ItemId(3)]);
    assert!(looks[0].weather_match >= 7);
}

#[test]
fn test_recommend_without_save_leaves_looks_empty() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    cmd_recommend(&db_path, "file", false, 5, "casual", None, Some("minimal"), false).unwrap();
    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    assert!(wardrobe.all_looks().unwrap().is_empty());
}

#[test]
fn test_recommend_unknown_starting_item() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    let result = cmd_recommend(&db_path, "file", false, 5, "casual", Some(42), None, false);
    assert!(result.is_err());
}

#[test]
fn test_recommend_unknown_occasion() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    let result = cmd_recommend(&db_path, "file", false, 5, "gala", None, None, false);
    assert!(result.is_err());
}

#[test]
fn test_gaps_on_empty_database() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");
    cmd_init(&db_path, "file", false).unwrap();

    assert!(cmd_gaps(&db_path, "file", true, 20, "casual").is_ok());
}

#[test]
fn test_score_items() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    assert!(cmd_score(&db_path, "file", true, &[1, 2, 3], 5, "casual").is_ok());
    assert!(cmd_score(&db_path, "file", false, &[1, 99], 5, "casual").is_err());
    assert!(cmd_score(&db_path, "file", false, &[], 5, "casual").is_err());
}

// =============================================================================
// LOOK COMMAND TESTS
// =============================================================================

#[test]
fn test_look_save_and_delete() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    cmd_look_save(&db_path, "file", false, "Friday", &[1, 2], Some("work"), true).unwrap();
    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    let look = wardrobe.get_look(LookId(1)).unwrap().unwrap();
    assert_eq!(look.name, "Friday");
    assert_eq!(look.occasions, vec![Occasion::Work]);
    assert!(look.is_public);
    assert!(!look.is_generated());

    cmd_look_delete(&db_path, "file", false, 1).unwrap();
    assert!(cmd_look_delete(&db_path, "file", false, 1).is_err());
}

#[test]
fn test_look_save_needs_known_items() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    assert!(cmd_look_save(&db_path, "file", false, "Nope", &[7], None, false).is_err());
    assert!(cmd_look_save(&db_path, "file", false, "Empty", &[], None, false).is_err());
}

// =============================================================================
// COMMUNITY COMMAND TESTS
// =============================================================================

fn draft(content: &str) -> PostDraft {
    PostDraft {
        content: content.to_string(),
        topics: vec!["ootd".to_string()],
        ..PostDraft::default()
    }
}

#[test]
fn test_post_like_and_comment() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    let mut post = draft("new boots");
    post.tags = vec![3];
    cmd_post(&db_path, "file", false, post).unwrap();
    cmd_like(&db_path, "file", false, 1).unwrap();
    cmd_comment(&db_path, "file", false, 1, "love them", None).unwrap();
    cmd_comment(&db_path, "file", false, 1, "thanks", Some(1)).unwrap();

    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    let post = wardrobe.get_post(PostId(1)).unwrap().unwrap();
    assert_eq!(post.like_count, 1);
    assert_eq!(post.comment_count, 2);
    assert_eq!(post.tagged_items.len(), 1);
    let comments = wardrobe.comments_for_post(PostId(1)).unwrap();
    assert_eq!(comments[1].parent_comment_id, Some(comments[0].id));
}

#[test]
fn test_post_rejects_unknown_references() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    let mut with_tag = draft("tagged");
    with_tag.tags = vec![42];
    assert!(cmd_post(&db_path, "file", false, with_tag).is_err());

    let mut with_look = draft("look");
    with_look.look = Some(5);
    assert!(cmd_post(&db_path, "file", false, with_look).is_err());
}

#[test]
fn test_post_needs_content_or_image() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    assert!(cmd_post(&db_path, "file", false, PostDraft::default()).is_err());
}

#[test]
fn test_comment_errors() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");
    cmd_post(&db_path, "file", false, draft("hello")).unwrap();

    assert!(matches!(
        cmd_comment(&db_path, "file", false, 9, "hi", None),
        Err(CliError::NotFound(_))
    ));
    assert!(cmd_comment(&db_path, "file", false, 1, "", None).is_err());
    assert!(cmd_comment(&db_path, "file", false, 1, "reply", Some(77)).is_err());
}

#[test]
fn test_like_missing_post() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");

    assert!(matches!(
        cmd_like(&db_path, "file", false, 1),
        Err(CliError::NotFound(_))
    ));
}

#[test]
fn test_collect_share_hide_delete() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");
    cmd_post(&db_path, "file", false, draft("keep")).unwrap();
    cmd_post(&db_path, "file", false, draft("hide me")).unwrap();
    cmd_post(&db_path, "file", false, draft("delete me")).unwrap();

    cmd_collect(&db_path, "file", false, 1).unwrap();
    cmd_share(&db_path, "file", false, 1).unwrap();
    cmd_share(&db_path, "file", true, 1).unwrap();
    cmd_retract(&db_path, "file", false, 2, false).unwrap();
    cmd_retract(&db_path, "file", true, 3, true).unwrap();

    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    let kept = wardrobe.get_post(PostId(1)).unwrap().unwrap();
    assert_eq!(kept.favorite_count, 1);
    assert_eq!(kept.share_count, 2);
    assert!(wardrobe.get_post(PostId(2)).unwrap().is_none());
    assert!(wardrobe.get_post(PostId(3)).unwrap().is_none());

    assert!(matches!(
        cmd_share(&db_path, "file", false, 2),
        Err(CliError::NotFound(_))
    ));
    assert!(matches!(
        cmd_retract(&db_path, "file", false, 3, true),
        Err(CliError::NotFound(_))
    ));
    assert!(matches!(
        cmd_collect(&db_path, "file", false, 42),
        Err(CliError::NotFound(_))
    ));
}

#[test]
fn test_feed_orders_and_search() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");
    cmd_post(&db_path, "file", false, draft("first")).unwrap();
    cmd_post(&db_path, "file", false, draft("second")).unwrap();

    assert!(cmd_feed(&db_path, "file", true, "latest", &[], None, false).is_ok());
    assert!(cmd_feed(&db_path, "file", false, "mixed", &[], None, true).is_ok());
    assert!(cmd_feed(&db_path, "file", false, "following", &[1], None, false).is_ok());
    assert!(cmd_feed(&db_path, "file", true, "mixed", &[], Some("ootd"), false).is_ok());
    assert!(cmd_feed(&db_path, "file", false, "random", &[], None, false).is_err());
}

// =============================================================================
// PROFILE COMMAND TESTS
// =============================================================================

#[test]
fn test_profile_set_keeps_unset_fields() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");

    let first = ProfileEdit {
        nickname: Some("dada".to_string()),
        height_cm: Some(170),
        ..ProfileEdit::default()
    };
    cmd_profile_set(&db_path, "file", false, first).unwrap();

    let second = ProfileEdit {
        style: Some("minimal".to_string()),
        ..ProfileEdit::default()
    };
    cmd_profile_set(&db_path, "file", false, second).unwrap();

    let wardrobe = load_or_create_wardrobe(&db_path, "file").unwrap();
    let profile = wardrobe.profile().unwrap().unwrap();
    assert_eq!(profile.nickname, "dada");
    assert_eq!(profile.height_cm, Some(170));
    assert_eq!(profile.style_preference, StylePreference::Minimal);
}

#[test]
fn test_profile_set_rejects_bad_gender() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");

    let edit = ProfileEdit {
        gender: Some("robot".to_string()),
        ..ProfileEdit::default()
    };
    assert!(cmd_profile_set(&db_path, "file", false, edit).is_err());
}

// =============================================================================
// EXPORT / IMPORT COMMAND TESTS
// =============================================================================

#[test]
fn test_export_import_binary() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");
    let export_path = temp.path().join("export.dada");
    let import_db = temp.path().join("imported.db");

    cmd_export(&db_path, "file", &export_path, "binary").unwrap();
    assert!(export_path.exists());

    cmd_import(&import_db, "file", &export_path, "binary").unwrap();
    assert_eq!(item_count(&import_db, "file"), 3);
}

#[test]
fn test_export_json_into_redb() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");
    let export_path = temp.path().join("export.json");
    let import_db = temp.path().join("imported.redb");

    cmd_export(&db_path, "file", &export_path, "json").unwrap();
    cmd_import(&import_db, "redb", &export_path, "json").unwrap();
    assert_eq!(item_count(&import_db, "redb"), 3);

    // Imported counters continue after the restored ids.
    let mut wardrobe = load_or_create_wardrobe(&import_db, "redb").unwrap();
    let added = wardrobe
        .add_item(dadaplace_core::ClothingItem::new(Category::Accessory, "scarf", "red"))
        .unwrap();
    assert_eq!(added.id, ItemId(4));
}

#[test]
fn test_import_requires_empty_database() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");
    let export_path = temp.path().join("export.dada");

    cmd_export(&db_path, "file", &export_path, "binary").unwrap();
    let result = cmd_import(&db_path, "file", &export_path, "binary");
    assert!(matches!(result, Err(CliError::InvalidInput(_))));
}

#[test]
fn test_export_unknown_format() {
    let temp = create_temp_dir();
    let db_path = seeded_db(&temp, "file");
    let out = temp.path().join("export.xml");

    let result = cmd_export(&db_path, "file", &out, "xml");
    assert!(matches!(result, Err(CliError::UnknownFormat(_))));
}

#[test]
fn test_import_corrupt_binary() {
    let temp = create_temp_dir();
    let db_path = temp.path().join("test.db");
    let input = temp.path().join("garbage.dada");
    std::fs::write(&input, b"not a snapshot").unwrap();

    assert!(cmd_import(&db_path, "file", &input, "binary").is_err());
}
