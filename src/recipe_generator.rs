use serde::Serialize;
use thiserror::Error;

use crate::api_connection::{RecipeTransport, TransportError};
use crate::filters::{Difficulty, MealType};
use crate::recipe_parser::{parse_response, ParseError, Recipe};
use crate::recipe_prompt::build_prompt;
use crate::recipe_schema::recipe_schema;

/// Immutable snapshot of what the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeQuery {
    pub ingredients: Vec<String>,
    pub meal_type: MealType,
    pub difficulty: Difficulty,
}

impl RecipeQuery {
    pub fn prompt(&self) -> String {
        build_prompt(self.ingredients.as_slice(), self.meal_type, self.difficulty)
    }
}

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error("could not parse model response: {0}")]
    Parse(#[from] ParseError),
}

/// Builds the prompt and schema for `query`, asks the transport and parses its answer.
pub async fn generate_recipes<T>(
    transport: &T,
    query: &RecipeQuery,
) -> Result<Vec<Recipe>, GenerationError>
where
    T: RecipeTransport + ?Sized,
{
    let prompt = query.prompt();
    let schema = recipe_schema();

    let raw = transport.complete(&prompt, &schema).await?;
    tracing::debug!(bytes = raw.len(), "received model response");

    let recipes = parse_response(&raw).map_err(|e| {
        tracing::debug!(error = %e, raw = %raw, "model response failed validation");
        e
    })?;
    Ok(recipes)
}
