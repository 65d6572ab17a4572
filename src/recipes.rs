//! Recipe service boundary
//!
//! The chat flow only needs two capabilities from the remote service:
//! a free-text search and a details lookup by id.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Search hit. Only the id is needed to fetch details.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipeSummary {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<RecipeSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetail {
    pub title: String,
    pub ready_in_minutes: i64,
    pub servings: i64,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[async_trait]
pub trait RecipeService: Send + Sync {
    /// Search by free text, asking for at most `number` candidates
    async fn search(&self, query: &str, number: u32) -> Result<Vec<RecipeSummary>>;

    async fn details(&self, id: i64) -> Result<RecipeDetail>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_response_parses_results() {
        let json = r#"{"results":[{"id":42,"title":"Pasta","image":"x.jpg"}],"offset":0,"number":1,"totalResults":17}"#;
        let parsed: SearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.results.len(), 1);
        assert_eq!(parsed.results[0].id, 42);
    }

    #[test]
    fn test_search_response_missing_results_is_empty() {
        let parsed: SearchResponse = serde_json::from_str(r#"{"totalResults":0}"#).unwrap();
        assert!(parsed.results.is_empty());
    }

    #[test]
    fn test_detail_null_instructions() {
        let json = r#"{"id":42,"title":"Pasta","readyInMinutes":20,"servings":2,"instructions":null}"#;
        let detail: RecipeDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.title, "Pasta");
        assert_eq!(detail.ready_in_minutes, 20);
        assert_eq!(detail.servings, 2);
        assert!(detail.instructions.is_none());
    }
}
