//! Element corpus: model, JSON loader and tier validation
//!
//! The corpus file is a JSON array of elements. Loading produces the
//! *effective corpus*: every recipe that survives has exactly two ingredients,
//! each ingredient resolves to a known element of strictly lower tier, and no
//! ingredient is "Time".

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info, warn};

/// The four elements every synthesis starts from, in canonical order
pub const PRIMITIVES: [&str; 4] = ["Water", "Fire", "Earth", "Air"];

/// Ingredient excluded from every recipe
const EXCLUDED_INGREDIENT: &str = "Time";

/// Whether `name` is one of the four primitives
pub fn is_primitive(name: &str) -> bool {
    PRIMITIVES.contains(&name)
}

/// A two-ingredient recipe as stored on its result element
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementRecipe {
    pub ingredients: [String; 2],
}

impl ElementRecipe {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            ingredients: [first.into(), second.into()],
        }
    }

    /// Ingredient names in sorted order (recipes are unordered pairs)
    pub fn sorted_ingredients(&self) -> [&str; 2] {
        let [a, b] = &self.ingredients;
        if a <= b {
            [a.as_str(), b.as_str()]
        } else {
            [b.as_str(), a.as_str()]
        }
    }
}

impl PartialEq for ElementRecipe {
    fn eq(&self, other: &Self) -> bool {
        self.sorted_ingredients() == other.sorted_ingredients()
    }
}

impl Eq for ElementRecipe {}

/// One element of the effective corpus
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_image: Option<String>,
    pub recipes: Vec<ElementRecipe>,
    pub tier: u32,
}

impl Element {
    /// Image reference shown to clients: local copy first, then remote URL
    pub fn image_ref(&self) -> &str {
        self.local_image
            .as_deref()
            .or(self.image.as_deref())
            .unwrap_or("")
    }
}

/// Element as it appears in the corpus file, before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    name: String,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    local_image: Option<String>,
    #[serde(default)]
    recipes: Option<Vec<RawRecipe>>,
    #[serde(default)]
    tier: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    #[serde(default)]
    ingredients: Vec<String>,
}

/// Counts of recipes removed while building the effective corpus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub malformed: usize,
    pub unknown_ingredient: usize,
    pub excluded_ingredient: usize,
    pub tier_violation: usize,
    pub duplicate: usize,
}

impl ValidationReport {
    pub fn total_dropped(&self) -> usize {
        self.malformed
            + self.unknown_ingredient
            + self.excluded_ingredient
            + self.tier_violation
            + self.duplicate
    }
}

/// Immutable effective corpus, elements kept in file order
#[derive(Debug, Clone)]
pub struct Corpus {
    elements: Vec<Element>,
    index: HashMap<String, usize>,
    report: ValidationReport,
}

impl Corpus {
    /// Read and validate the corpus file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::CorpusLoad(format!("{}: {}", path.display(), e)))?;
        let corpus = Self::from_json_str(&content)?;
        info!(
            "Loaded {} elements from {} ({} recipes dropped by validation)",
            corpus.len(),
            path.display(),
            corpus.report.total_dropped()
        );
        Ok(corpus)
    }

    /// Parse and validate a corpus from its JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Vec<RawElement> =
            serde_json::from_str(json).map_err(|e| Error::CorpusLoad(e.to_string()))?;

        let mut report = ValidationReport::default();
        let mut elements = Vec::with_capacity(raw.len());

        for raw_element in raw {
            let mut recipes = Vec::new();
            for recipe in raw_element.recipes.unwrap_or_default() {
                match <[String; 2]>::try_from(recipe.ingredients) {
                    Ok(ingredients) => recipes.push(ElementRecipe { ingredients }),
                    Err(ingredients) => {
                        warn!(
                            "Dropping malformed recipe for {}: expected 2 ingredients, found {}",
                            raw_element.name,
                            ingredients.len()
                        );
                        report.malformed += 1;
                    }
                }
            }

            elements.push(Element {
                name: raw_element.name,
                image: raw_element.image,
                local_image: raw_element.local_image,
                recipes,
                tier: raw_element.tier.unwrap_or(1),
            });
        }

        Self::from_elements_with_report(elements, report)
    }

    /// Validate already-constructed elements
    pub fn from_elements(elements: Vec<Element>) -> Result<Self> {
        Self::from_elements_with_report(elements, ValidationReport::default())
    }

    fn from_elements_with_report(
        mut elements: Vec<Element>,
        mut report: ValidationReport,
    ) -> Result<Self> {
        let mut index = HashMap::with_capacity(elements.len());
        for (position, element) in elements.iter().enumerate() {
            if index.insert(element.name.clone(), position).is_some() {
                return Err(Error::CorpusLoad(format!(
                    "duplicate element name: {}",
                    element.name
                )));
            }
        }

        let tiers: HashMap<String, u32> = elements
            .iter()
            .map(|e| (e.name.clone(), e.tier))
            .collect();

        for element in &mut elements {
            let result_tier = element.tier;
            let mut seen: HashSet<[String; 2]> = HashSet::new();
            let name = element.name.clone();

            element.recipes.retain(|recipe| {
                if recipe.ingredients.iter().any(|i| i == EXCLUDED_INGREDIENT) {
                    debug!("Dropping recipe for {}: uses {}", name, EXCLUDED_INGREDIENT);
                    report.excluded_ingredient += 1;
                    return false;
                }

                for ingredient in &recipe.ingredients {
                    match tiers.get(ingredient) {
                        None => {
                            warn!(
                                "Dropping recipe for {}: unknown ingredient {}",
                                name, ingredient
                            );
                            report.unknown_ingredient += 1;
                            return false;
                        }
                        Some(&tier) if tier >= result_tier => {
                            debug!(
                                "Dropping recipe for {}: {} has tier {} >= {}",
                                name, ingredient, tier, result_tier
                            );
                            report.tier_violation += 1;
                            return false;
                        }
                        Some(_) => {}
                    }
                }

                let [a, b] = recipe.sorted_ingredients();
                if !seen.insert([a.to_string(), b.to_string()]) {
                    report.duplicate += 1;
                    return false;
                }
                true
            });
        }

        Ok(Self {
            elements,
            index,
            report,
        })
    }

    /// All elements in corpus order
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn get(&self, name: &str) -> Option<&Element> {
        self.index.get(name).map(|&i| &self.elements[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// What validation removed while building this corpus
    pub fn validation_report(&self) -> ValidationReport {
        self.report
    }
}
