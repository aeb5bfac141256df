use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Number of ingredient/measure slots a recipe record can carry.
pub const MAX_INGREDIENTS: usize = 20;

/// A dish as returned by the recipe API.
///
/// Field names on the wire (and in the favorites store) are the API's own.
/// Everything not mapped to a named field is kept in `fields` so a favorite
/// round-trips the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb", default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(rename = "strInstructions", default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub name: String,
    pub measure: Option<String>,
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.measure {
            Some(measure) => write!(f, "{} - {}", self.name, measure),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Recipe {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Recipe {
            id: id.into(),
            name: name.into(),
            thumbnail_url: None,
            instructions: None,
            fields: Map::new(),
        }
    }

    fn text_field(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn ingredient_name(&self, index: usize) -> Option<&str> {
        self.text_field(&format!("strIngredient{index}"))
    }

    pub fn ingredient_measure(&self, index: usize) -> Option<&str> {
        self.text_field(&format!("strMeasure{index}"))
    }

    /// Pairs every non-blank ingredient with its measure, in slot order.
    pub fn ingredients(&self) -> Vec<Ingredient> {
        (1..=MAX_INGREDIENTS)
            .filter_map(|i| {
                self.ingredient_name(i).map(|name| Ingredient {
                    name: name.to_string(),
                    measure: self.ingredient_measure(i).map(str::to_string),
                })
            })
            .collect()
    }
}
