//! `JsonFileStore` behaviour against a real filesystem.

use std::fs;

use loottables::{
    ConfigStore, ContainerProfile, GroupEntry, JsonFileStore, LootConfig, LootEntry, LootGroup,
    Range, Settings,
};
use serde_json::Value;
use tempfile::tempdir;

#[test]
fn missing_file_is_created_with_defaults() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("loot.json"));

    let cfg = store.load().unwrap();
    assert_eq!(cfg, LootConfig::default());
    assert!(store.path().exists());

    let on_disk = LootConfig::from_json(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(on_disk, cfg);
}

#[test]
fn nested_directories_are_created_on_save() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("config").join("loot").join("loot.json"));
    store.save(&LootConfig::default()).unwrap();
    assert!(store.path().exists());
}

#[test]
fn corrupt_file_is_backed_up_and_replaced() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("loot.json"));
    fs::write(store.path(), "{ this is not json").unwrap();

    let cfg = store.load().unwrap();
    assert_eq!(cfg, LootConfig::default());

    let backup = store.backup_path();
    assert_eq!(backup.file_name().unwrap(), "loot.json.bak");
    assert_eq!(fs::read_to_string(&backup).unwrap(), "{ this is not json");

    let rewritten: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert!(rewritten.get("settings").is_some());
}

#[test]
fn ill_typed_document_is_backed_up_and_replaced() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("loot.json"));
    let bad = r#"{ "settings": { "blueprint_probability": "lots" } }"#;
    fs::write(store.path(), bad).unwrap();

    let cfg = store.load().unwrap();
    assert_eq!(cfg.settings, Settings::default());
    assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), bad);
}

#[test]
fn sparse_file_is_upgraded_and_persisted() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("loot.json"));
    fs::write(
        store.path(),
        r#"{
            "settings": { "blueprint_probability": 25 },
            "containers": { "crate_basic": { "item_count": { "min": 3, "max": 4 } } }
        }"#,
    )
    .unwrap();

    let cfg = store.load().unwrap();
    assert_eq!(cfg.settings.blueprint_probability, 25.0);
    assert_eq!(cfg.settings.max_container_slots, Settings::default().max_container_slots);
    assert_eq!(cfg.containers["crate_basic"].item_count, Range::new(3, 4));
    assert!(!store.backup_path().exists());

    let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["containers"]["crate_basic"]["enabled"], Value::Bool(true));
    assert_eq!(raw["settings"]["blueprint_probability"], serde_json::json!(25.0));
    assert!(raw["settings"].get("fill_retry_budget").is_some());
}

#[test]
fn complete_file_is_left_untouched() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("loot.json"));
    store.save(&LootConfig::default()).unwrap();
    let before = fs::read_to_string(store.path()).unwrap();

    store.load().unwrap();
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn saved_config_loads_back_equal() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("loot.json"));

    let mut cfg = LootConfig::default();
    let mut profile = ContainerProfile {
        item_count: Range::new(2, 3),
        scrap: Range::new(5, 10),
        ..ContainerProfile::default()
    };
    profile
        .items
        .insert("wood".into(), LootEntry::new(Range::new(50, 100)));
    cfg.containers.insert("crate_basic".into(), profile);

    let mut group = LootGroup::default();
    group
        .items
        .insert("bandage".into(), GroupEntry::new(60.0, Range::new(1, 3)));
    group
        .items
        .insert("syringe".into(), GroupEntry::new(40.0, Range::fixed(1)));
    cfg.groups.insert("meds".into(), group);
    cfg.blacklist.insert("rock".into());

    store.save(&cfg).unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded, cfg);
    let keys: Vec<&str> = loaded.groups["meds"].items.keys().map(String::as_str).collect();
    assert_eq!(keys, ["bandage", "syringe"]);
}

#[test]
fn null_inside_an_item_is_repaired_not_discarded() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("loot.json"));
    fs::write(
        store.path(),
        r#"{ "containers": { "crate_basic": {
            "item_count": { "min": 1, "max": 1 },
            "items": { "wood": { "amount": null }, "stones": { "amount": { "min": 2, "max": 4 } } }
        } } }"#,
    )
    .unwrap();

    let cfg = store.load().unwrap();
    assert!(!store.backup_path().exists());
    let items = &cfg.containers["crate_basic"].items;
    assert_eq!(items["wood"].amount, Range::fixed(1));
    assert_eq!(items["stones"].amount, Range::new(2, 4));

    let raw: Value = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["containers"]["crate_basic"]["items"]["wood"]["amount"]["min"], 1);
}
