use std::io::Write;

use super::*;

fn write_yaml(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write yaml");
    file
}

#[test]
fn presets_have_unique_ids_and_are_defaults() {
    let presets = preset_gifts();
    assert_eq!(presets.len(), 10);
    let ids: HashSet<&str> = presets.iter().map(|g| g.id.as_str()).collect();
    assert_eq!(ids.len(), presets.len());
    assert!(presets.iter().all(|g| g.is_default));
}

#[test]
fn custom_gift_requires_name() {
    assert!(FreeGift::custom("   ", GiftCategory::Other, None).is_none());
}

#[test]
fn custom_gift_is_not_default_and_trims_input() {
    let gift = FreeGift::custom(" Laptop Sleeve ", GiftCategory::Bag, Some("  "))
        .expect("expected a gift");
    assert_eq!(gift.name, "Laptop Sleeve");
    assert!(gift.description.is_none());
    assert!(!gift.is_default);
    assert!(!gift.id.is_empty());
}

#[test]
fn custom_gifts_get_distinct_ids() {
    let a = FreeGift::custom("Pen drive", GiftCategory::Other, None).unwrap();
    let b = FreeGift::custom("Pen drive", GiftCategory::Other, None).unwrap();
    assert_ne!(a.id, b.id);
}

#[test]
fn toggle_adds_then_removes_preset() {
    let preset = preset_gifts().remove(3);
    let mut gifts = Vec::new();

    toggle_gift(&mut gifts, preset.clone());
    assert_eq!(gifts, vec![preset.clone()]);

    toggle_gift(&mut gifts, preset);
    assert!(gifts.is_empty());
}

#[test]
fn add_gift_ignores_duplicate_id() {
    let preset = preset_gifts().remove(0);
    let mut gifts = vec![preset.clone()];
    add_gift(&mut gifts, preset);
    assert_eq!(gifts.len(), 1);
}

#[test]
fn remove_gift_by_id() {
    let mut gifts = preset_gifts();
    remove_gift(&mut gifts, "5");
    assert_eq!(gifts.len(), 9);
    assert!(gifts.iter().all(|g| g.id != "5"));
}

#[test]
fn gift_category_serializes_lowercase() {
    let json = serde_json::to_string(&GiftCategory::Mousepad).unwrap();
    assert_eq!(json, "\"mousepad\"");
    assert_eq!(GiftCategory::Mousepad.label(), "Mouse Pad");
}

#[test]
fn load_gift_presets_marks_everything_default() {
    let file = write_yaml(
        "gifts:\n  - id: bag\n    name: Backpack\n    category: bag\n  - id: mouse\n    name: Wireless Mouse\n    category: mouse\n    description: 2.4GHz\n",
    );
    let gifts = load_gift_presets(file.path()).expect("valid presets");
    assert_eq!(gifts.len(), 2);
    assert!(gifts.iter().all(|g| g.is_default));
    assert_eq!(gifts[1].description.as_deref(), Some("2.4GHz"));
}

#[test]
fn load_gift_presets_rejects_duplicate_ids() {
    let file = write_yaml(
        "gifts:\n  - id: a\n    name: One\n    category: other\n  - id: a\n    name: Two\n    category: other\n",
    );
    let err = load_gift_presets(file.path()).unwrap_err();
    assert!(
        matches!(err, ConfigError::Validation(ref msg) if msg.contains("duplicate gift id")),
        "expected duplicate id error, got: {err:?}"
    );
}

#[test]
fn load_gift_presets_rejects_blank_name() {
    let file = write_yaml("gifts:\n  - id: a\n    name: ' '\n    category: other\n");
    let err = load_gift_presets(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[test]
fn load_gift_presets_rejects_unknown_category() {
    let file = write_yaml("gifts:\n  - id: a\n    name: Drone\n    category: drone\n");
    let err = load_gift_presets(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::GiftsFileParse(_)));
}

#[test]
fn load_gift_presets_missing_file_is_io_error() {
    let err = load_gift_presets(Path::new("/nonexistent/gifts.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::GiftsFileIo { .. }));
}
