use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::Config;
use crate::error::ApiError;
use crate::recipe::Recipe;

#[async_trait]
pub trait RecipeApi: Send + Sync {
    /// Recipes whose name matches `query`. No match is an empty list.
    async fn search(&self, query: &str) -> Result<Vec<Recipe>, ApiError>;

    async fn random(&self) -> Result<Recipe, ApiError>;
}

#[derive(Debug, Deserialize)]
struct MealsEnvelope {
    meals: Option<Vec<Recipe>>,
}

/// Client for TheMealDB's JSON API.
pub struct MealDbClient {
    http: reqwest::Client,
    base_url: String,
}

impl MealDbClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(MealDbClient {
            http,
            base_url: config.api_base_url.clone(),
        })
    }

    async fn get_meals(&self, path: &str, query: &[(&str, &str)]) -> Result<Vec<Recipe>, ApiError> {
        let url = format!("{}/{}", self.base_url, path);
        log::debug!("GET {} {:?}", url, query);
        let response = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;
        parse_meals(&text)
    }
}

#[async_trait]
impl RecipeApi for MealDbClient {
    async fn search(&self, query: &str) -> Result<Vec<Recipe>, ApiError> {
        self.get_meals("search.php", &[("s", query)]).await
    }

    async fn random(&self) -> Result<Recipe, ApiError> {
        first_meal(self.get_meals("random.php", &[]).await?)
    }
}

/// Decodes a `{ "meals": [...] | null }` body.
pub fn parse_meals(text: &str) -> Result<Vec<Recipe>, ApiError> {
    let envelope: MealsEnvelope =
        serde_json::from_str(text).map_err(|e| ApiError::Parse(e.to_string()))?;
    Ok(envelope.meals.unwrap_or_default())
}

fn first_meal(meals: Vec<Recipe>) -> Result<Recipe, ApiError> {
    if meals.len() > 1 {
        log::warn!("Random endpoint returned {} meals, keeping the first", meals.len());
    }
    meals.into_iter().next().ok_or(ApiError::NoRecipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_meals_is_an_empty_list() {
        assert!(parse_meals(r#"{"meals":null}"#).unwrap().is_empty());
    }

    #[test]
    fn meals_are_decoded_in_order() {
        let meals = parse_meals(
            r#"{"meals":[
                {"idMeal":"52977","strMeal":"Corba","strMealThumb":"https://example.test/c.jpg"},
                {"idMeal":"53060","strMeal":"Burek","strInstructions":"Bake."}
            ]}"#,
        )
        .unwrap();
        assert_eq!(meals.len(), 2);
        assert_eq!(meals[0].name, "Corba");
        assert_eq!(meals[0].thumbnail_url.as_deref(), Some("https://example.test/c.jpg"));
        assert_eq!(meals[1].instructions.as_deref(), Some("Bake."));
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert!(matches!(parse_meals("<html>"), Err(ApiError::Parse(_))));
    }

    #[test]
    fn random_without_meals_is_an_error() {
        assert!(matches!(first_meal(Vec::new()), Err(ApiError::NoRecipe)));
    }

    #[test]
    fn random_keeps_the_first_meal() {
        let meal = first_meal(vec![Recipe::new("1", "A"), Recipe::new("2", "B")]).unwrap();
        assert_eq!(meal.id, "1");
    }
}
