//! Meal types: the candidates a user swipes through.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single candidate meal from the catalog.
///
/// Only `id` and `category` matter to the swipe session.
/// Everything else is descriptive and passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    /// Unique identifier within the catalog (e.g. `breakfast_3`).
    #[serde(rename = "meal_id")]
    pub id: String,

    pub name: String,

    /// Which slot of the day this meal fills.
    #[serde(rename = "meal_type")]
    pub category: MealCategory,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time_minutes: Option<u32>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,
}

/// The meal slot a meal belongs to.
///
/// Declaration order is the order a phased deck walks through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealCategory {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealCategory {
    pub const ALL: [Self; 3] = [Self::Breakfast, Self::Lunch, Self::Dinner];

    /// The name used in persisted rows and JSON.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
        }
    }

    /// Inverse of [`MealCategory::as_str`].
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for MealCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_catalog_field_names() {
        let json = r#"{
            "meal_id": "lunch_5",
            "name": "Pad Thai",
            "meal_type": "lunch",
            "cuisine": "Thai",
            "calories": 550,
            "cook_time_minutes": 25
        }"#;
        let meal: Meal = serde_json::from_str(json).unwrap();

        assert_eq!(meal.id, "lunch_5");
        assert_eq!(meal.category, MealCategory::Lunch);
        assert_eq!(meal.calories, Some(550));
        assert!(meal.ingredients.is_empty());
    }

    #[test]
    fn category_names_round_trip() {
        for category in MealCategory::ALL {
            assert_eq!(MealCategory::parse(category.as_str()), Some(category));
        }
        assert_eq!(MealCategory::parse("brunch"), None);
    }
}
