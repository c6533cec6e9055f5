//! Meal catalog: the universe of candidates a session draws from.
//!
//! A [`CatalogProvider`] is fetched once at session start. The resulting
//! [`Catalog`] is validated, indexed by meal id, and reused for every deck
//! rebuild in that session.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{Meal, MealCategory};

/// The weekly catalog that ships with the crate: seven meals per category.
const BUNDLED_MEALS: &str = include_str!("../catalog/meals.json");

/// Errors that can occur while fetching or validating a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate meal id in catalog: {0}")]
    DuplicateMeal(String),

    #[error("catalog contains a meal with an empty id")]
    EmptyMealId,
}

/// Supplies candidate meals. Read-only from the session's point of view.
pub trait CatalogProvider {
    fn fetch_catalog(&self) -> Result<Vec<Meal>, CatalogError>;
}

/// The catalog compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCatalog;

impl CatalogProvider for BundledCatalog {
    fn fetch_catalog(&self) -> Result<Vec<Meal>, CatalogError> {
        Ok(serde_json::from_str(BUNDLED_MEALS)?)
    }
}

/// A catalog read from a JSON array of meals on disk.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogProvider for FileCatalog {
    fn fetch_catalog(&self) -> Result<Vec<Meal>, CatalogError> {
        let json = fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// A validated, id-indexed set of meals.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    meals: Vec<Meal>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Validates meals: ids must be non-empty and unique.
    pub fn new(meals: Vec<Meal>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(meals.len());
        for (i, meal) in meals.iter().enumerate() {
            if meal.id.is_empty() {
                return Err(CatalogError::EmptyMealId);
            }
            if index.insert(meal.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateMeal(meal.id.clone()));
            }
        }
        Ok(Self { meals, index })
    }

    /// Fetches from `provider` and validates the result.
    pub fn fetch(provider: &dyn CatalogProvider) -> Result<Self, CatalogError> {
        Self::new(provider.fetch_catalog()?)
    }

    pub fn get(&self, meal_id: &str) -> Option<&Meal> {
        self.index.get(meal_id).map(|&i| &self.meals[i])
    }

    /// Meals in catalog order.
    pub fn meals(&self) -> &[Meal] {
        &self.meals
    }

    pub fn in_category(&self, category: MealCategory) -> impl Iterator<Item = &Meal> {
        self.meals.iter().filter(move |m| m.category == category)
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }
}
