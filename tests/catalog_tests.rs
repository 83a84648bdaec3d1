use photo_catalog::*;
use std::collections::BTreeSet;

const SAMPLE: &str = include_str!("fixtures/photo_metadata.js");

fn sample_catalog() -> Catalog {
    Catalog::load(SAMPLE).expect("sample catalog should load")
}

#[test]
fn test_sample_loads_every_photo() {
    let catalog = sample_catalog();
    assert_eq!(catalog.len(), 9);
}

#[test]
fn test_keys_match_filenames() {
    let catalog = sample_catalog();
    for record in catalog.list(None) {
        let looked_up = catalog.get(&record.filename).unwrap();
        assert_eq!(looked_up.filename, record.filename);
    }
}

#[test]
fn test_all_dimensions_positive() {
    let catalog = sample_catalog();
    for record in catalog.list(None) {
        assert!(record.original_size.is_positive());
        for (_, thumbnail) in record.thumbnail_sizes.iter() {
            assert!(thumbnail.is_positive());
            assert!(thumbnail.longest_side() <= record.original_size.longest_side());
        }
    }
}

#[test]
fn test_large_thumbnail_matches_original_within_bounds() {
    let catalog = sample_catalog();
    let door = catalog.get("carved-wooden-door.jpg").unwrap();
    assert_eq!(door.original_size, Dimensions::new(1200, 1800));
    assert_eq!(door.thumbnail_sizes.large, Dimensions::new(1200, 1800));

    for record in catalog.list(None) {
        let large = record.thumbnail_sizes.get(ThumbnailSize::Large);
        if record.original_size.longest_side() <= 2400 {
            assert_eq!(large.longest_side(), record.original_size.longest_side());
        }
    }
}

#[test]
fn test_get_blood_moon() {
    let catalog = sample_catalog();
    let record = catalog.get("blood-moon-1.jpg").unwrap();
    assert_eq!(record.category, "astronomy");
    assert_eq!(record.hash, "d995e11af505ecf896a753337f1f67b7");
    assert_eq!(record.title, "Blood Moon 1");
    assert_eq!(record.processed.to_string(), "2025-08-09T16:57:31.573048");
    assert!(record.exif.camera.is_empty());
    assert_eq!(record.exif.datetime, None);
}

#[test]
fn test_get_is_exact_match_only() {
    let catalog = sample_catalog();
    assert!(catalog.get("blood-moon").is_none());
    assert!(catalog.get("BLOOD-MOON-1.JPG").is_none());
    assert!(catalog.get("").is_none());
}

#[test]
fn test_list_astronomy() {
    let catalog = sample_catalog();
    let astronomy: BTreeSet<&str> = catalog
        .list(Some("astronomy"))
        .map(|r| r.filename.as_str())
        .collect();
    let expected: BTreeSet<&str> = [
        "blood-moon-1.jpg",
        "blood-moon-eclipse.jpg",
        "lunar-eclipse-phases.jpg",
        "lunar-eclipse-shadow.jpg",
        "moon-1.jpg",
    ]
    .into_iter()
    .collect();
    assert_eq!(astronomy, expected);
}

#[test]
fn test_categories() {
    let catalog = sample_catalog();
    let expected: BTreeSet<&str> = ["astronomy", "architecture", "nature", "portrait", "urban"]
        .into_iter()
        .collect();
    assert_eq!(catalog.categories(), expected);
    assert_eq!(catalog.category_counts()["astronomy"], 5);
}

#[test]
fn test_missing_hash_fails_the_whole_load() {
    let mut document: serde_json::Value = serde_json::from_str(
        SAMPLE
            .trim()
            .trim_start_matches("// Auto-generated photo metadata")
            .trim()
            .trim_start_matches("const photoMetadata =")
            .trim_end_matches(';'),
    )
    .unwrap();
    document["moon-1.jpg"]
        .as_object_mut()
        .unwrap()
        .remove("hash");

    match Catalog::load(document.to_string()) {
        Err(CatalogError::MalformedRecord { key, .. }) => assert_eq!(key, "moon-1.jpg"),
        other => panic!("expected a malformed record error, got {:?}", other),
    }
}

#[test]
fn test_plain_json_and_js_module_are_equivalent() {
    let catalog = sample_catalog();
    let from_json = Catalog::load(catalog.to_json_string().unwrap()).unwrap();
    assert_eq!(
        from_json.list(None).collect::<Vec<_>>(),
        catalog.list(None).collect::<Vec<_>>()
    );
}

#[test]
fn test_regenerated_module_diffs_cleanly() {
    let catalog = sample_catalog();
    let regenerated = Catalog::load(catalog.to_js_module().unwrap()).unwrap();
    assert!(diff(&catalog, &regenerated).is_empty());
}
