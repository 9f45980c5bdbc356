//! Shared fixtures for alchemy-common integration tests

#![allow(dead_code)]

use alchemy_common::config::QueryLimits;
use alchemy_common::{Corpus, ElementGraph, RecipeService};
use std::sync::Arc;

/// Primitives plus Steam, Lava, Energy, Stone and Brick
pub const MINIMAL_CORPUS: &str = r#"[
    {"name": "Water", "tier": 1, "image": "https://img.example/water.png"},
    {"name": "Fire", "tier": 1},
    {"name": "Earth", "tier": 1},
    {"name": "Air", "tier": 1},
    {"name": "Steam", "tier": 2, "recipes": [{"ingredients": ["Water", "Fire"]}]},
    {"name": "Lava", "tier": 2, "recipes": [{"ingredients": ["Fire", "Earth"]}]},
    {"name": "Energy", "tier": 2, "recipes": [{"ingredients": ["Fire", "Air"]}]},
    {"name": "Stone", "tier": 3, "recipes": [{"ingredients": ["Lava", "Air"]}]},
    {"name": "Brick", "tier": 4, "recipes": [{"ingredients": ["Stone", "Fire"]}]}
]"#;

/// Elements with several recipes each, for enumeration and diversity checks
pub const BRANCHING_CORPUS: &str = r#"[
    {"name": "Water", "tier": 1},
    {"name": "Fire", "tier": 1},
    {"name": "Earth", "tier": 1},
    {"name": "Air", "tier": 1},
    {"name": "Mud", "tier": 2, "recipes": [{"ingredients": ["Water", "Earth"]}]},
    {"name": "Steam", "tier": 2, "recipes": [{"ingredients": ["Water", "Fire"]}]},
    {"name": "Cloud", "tier": 3, "recipes": [
        {"ingredients": ["Steam", "Air"]},
        {"ingredients": ["Water", "Air"]}
    ]},
    {"name": "Rain", "tier": 4, "recipes": [
        {"ingredients": ["Cloud", "Water"]},
        {"ingredients": ["Cloud", "Mud"]}
    ]},
    {"name": "Plant", "tier": 5, "recipes": [
        {"ingredients": ["Rain", "Earth"]},
        {"ingredients": ["Mud", "Rain"]}
    ]}
]"#;

pub fn minimal_corpus() -> Corpus {
    Corpus::from_json_str(MINIMAL_CORPUS).expect("minimal corpus should load")
}

pub fn minimal_graph() -> ElementGraph {
    ElementGraph::new(minimal_corpus())
}

pub fn branching_graph() -> ElementGraph {
    let corpus = Corpus::from_json_str(BRANCHING_CORPUS).expect("branching corpus should load");
    ElementGraph::new(corpus)
}

pub fn minimal_service() -> RecipeService {
    RecipeService::new(Arc::new(minimal_graph()), QueryLimits::default())
}

pub fn branching_service() -> RecipeService {
    RecipeService::new(Arc::new(branching_graph()), QueryLimits::default())
}

/// Element names of a path, in order
pub fn names(path: &[alchemy_common::search::PathNode]) -> Vec<&str> {
    path.iter().map(|n| n.element.as_str()).collect()
}
