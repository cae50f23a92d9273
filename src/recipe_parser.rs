use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::recipe_schema::recipe_schema;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub meal_type: String,
    pub difficulty: String,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("model returned an empty payload")]
    EmptyPayload,

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload does not match the recipe schema at {path}: expected {expected}")]
    Schema { path: String, expected: String },
}

/// Removes a surrounding ```` ```json ```` or ```` ``` ```` fence, if any.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    if !trimmed.ends_with("```") {
        return trimmed;
    }
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

/// Parses raw model output into recipes, in the order the model produced them.
///
/// Surrounding whitespace is trimmed and a wrapping markdown code fence
/// (```` ```json ```` or ```` ``` ````) is tolerated; the remainder must be a JSON array.
///
/// Either every element matches the schema and all recipes are returned, or an
/// error is returned and nothing is.
pub fn parse_response(raw: &str) -> Result<Vec<Recipe>, ParseError> {
    let content = strip_code_fence(raw);
    if content.is_empty() {
        return Err(ParseError::EmptyPayload);
    }

    let value: Value = serde_json::from_str(content)?;
    recipe_schema()
        .validate(&value)
        .map_err(|violation| ParseError::Schema {
            path: violation.path,
            expected: violation.expected,
        })?;

    Ok(serde_json::from_value(value)?)
}
