//! Corpus loading and tier validation tests
//!
//! Tests cover:
//! - Effective corpus: tier monotonicity, "Time" exclusion, unresolved ingredients
//! - Malformed recipes dropped, duplicate names rejected
//! - Defaults for missing fields
//! - Loading from disk

mod common;

use alchemy_common::corpus::{is_primitive, ElementRecipe};
use alchemy_common::{Corpus, Error};
use std::io::Write;

#[test]
fn test_minimal_corpus_keeps_every_valid_recipe() {
    let corpus = common::minimal_corpus();

    assert_eq!(corpus.len(), 9);
    assert_eq!(corpus.validation_report().total_dropped(), 0);

    let brick = corpus.get("Brick").expect("Brick should exist");
    assert_eq!(brick.tier, 4);
    assert_eq!(brick.recipes, vec![ElementRecipe::new("Fire", "Stone")]);
}

#[test]
fn test_every_surviving_recipe_is_tier_monotone() {
    let corpus = Corpus::from_json_str(
        r#"[
            {"name": "Water", "tier": 1},
            {"name": "Fire", "tier": 1},
            {"name": "Steam", "tier": 2, "recipes": [
                {"ingredients": ["Water", "Fire"]},
                {"ingredients": ["Steam", "Water"]}
            ]},
            {"name": "Geyser", "tier": 2, "recipes": [{"ingredients": ["Steam", "Water"]}]}
        ]"#,
    )
    .unwrap();

    for element in corpus.elements() {
        for recipe in &element.recipes {
            for ingredient in &recipe.ingredients {
                let tier = corpus.get(ingredient).unwrap().tier;
                assert!(tier < element.tier, "{} uses {}", element.name, ingredient);
            }
        }
    }

    assert_eq!(corpus.get("Steam").unwrap().recipes.len(), 1);
    assert!(corpus.get("Geyser").unwrap().recipes.is_empty());
    assert_eq!(corpus.validation_report().tier_violation, 2);
}

#[test]
fn test_time_ingredient_is_excluded() {
    let corpus = Corpus::from_json_str(
        r#"[
            {"name": "Time", "tier": 1},
            {"name": "Water", "tier": 1},
            {"name": "Fire", "tier": 1},
            {"name": "Ice", "tier": 2, "recipes": [
                {"ingredients": ["Water", "Time"]},
                {"ingredients": ["Water", "Fire"]}
            ]}
        ]"#,
    )
    .unwrap();

    let ice = corpus.get("Ice").unwrap();
    assert_eq!(ice.recipes.len(), 1);
    assert!(ice
        .recipes
        .iter()
        .all(|r| r.ingredients.iter().all(|i| i != "Time")));
    assert_eq!(corpus.validation_report().excluded_ingredient, 1);
}

#[test]
fn test_unknown_ingredient_and_malformed_recipes_are_dropped() {
    let corpus = Corpus::from_json_str(
        r#"[
            {"name": "Water", "tier": 1},
            {"name": "Fire", "tier": 1},
            {"name": "Steam", "tier": 2, "recipes": [
                {"ingredients": ["Water", "Unobtainium"]},
                {"ingredients": ["Water"]},
                {"ingredients": ["Water", "Fire", "Fire"]},
                {"ingredients": ["Fire", "Water"]}
            ]}
        ]"#,
    )
    .unwrap();

    let steam = corpus.get("Steam").unwrap();
    assert_eq!(steam.recipes, vec![ElementRecipe::new("Water", "Fire")]);

    let report = corpus.validation_report();
    assert_eq!(report.unknown_ingredient, 1);
    assert_eq!(report.malformed, 2);
}

#[test]
fn test_duplicate_recipes_collapse_regardless_of_order() {
    let corpus = Corpus::from_json_str(
        r#"[
            {"name": "Water", "tier": 1},
            {"name": "Fire", "tier": 1},
            {"name": "Steam", "tier": 2, "recipes": [
                {"ingredients": ["Water", "Fire"]},
                {"ingredients": ["Fire", "Water"]}
            ]}
        ]"#,
    )
    .unwrap();

    assert_eq!(corpus.get("Steam").unwrap().recipes.len(), 1);
    assert_eq!(corpus.validation_report().duplicate, 1);
}

#[test]
fn test_duplicate_element_names_fail_to_load() {
    let result = Corpus::from_json_str(
        r#"[
            {"name": "Water", "tier": 1},
            {"name": "Water", "tier": 1}
        ]"#,
    );

    match result {
        Err(Error::CorpusLoad(msg)) => assert!(msg.contains("Water")),
        other => panic!("expected CorpusLoad error, got {:?}", other),
    }
}

#[test]
fn test_missing_fields_take_defaults() {
    let corpus = Corpus::from_json_str(
        r#"[{"name": "Water"}, {"name": "Fire", "recipes": null, "localImage": "img/fire.png"}]"#,
    )
    .unwrap();

    let water = corpus.get("Water").unwrap();
    assert_eq!(water.tier, 1);
    assert!(water.recipes.is_empty());
    assert_eq!(water.image_ref(), "");

    let fire = corpus.get("Fire").unwrap();
    assert_eq!(fire.image_ref(), "img/fire.png");
}

#[test]
fn test_element_serializes_with_recipes_array() {
    let corpus = common::minimal_corpus();
    let water = serde_json::to_value(corpus.get("Water").unwrap()).unwrap();

    assert_eq!(water["name"], "Water");
    assert_eq!(water["tier"], 1);
    assert_eq!(water["recipes"], serde_json::json!([]));
    assert_eq!(water["image"], "https://img.example/water.png");
    assert!(water.get("localImage").is_none());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(common::MINIMAL_CORPUS.as_bytes()).unwrap();

    let corpus = Corpus::load(file.path()).unwrap();
    assert_eq!(corpus.len(), 9);
    assert_eq!(corpus.elements()[0].name, "Water");
    assert!(corpus.elements().iter().take(4).all(|e| is_primitive(&e.name)));
}

#[test]
fn test_load_missing_file_is_corpus_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Corpus::load(&dir.path().join("missing.json"));
    assert!(matches!(result, Err(Error::CorpusLoad(_))));
}

#[test]
fn test_invalid_json_is_corpus_error() {
    let result = Corpus::from_json_str("{not json");
    assert!(matches!(result, Err(Error::CorpusLoad(_))));
}
