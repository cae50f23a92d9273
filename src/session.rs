use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;

use crate::api_connection::RecipeTransport;
use crate::filters::{Difficulty, FilterParseError, MealType};
use crate::ingredients::IngredientSet;
use crate::recipe_generator::{generate_recipes, RecipeQuery};
use crate::recipe_parser::Recipe;

/// Shown to the user for any transport or parse failure. The cause is only logged.
pub const GENERATION_FAILED_MESSAGE: &str = "could not generate recipes, try again";

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("add at least one ingredient")]
    EmptyIngredients,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Error(String),
    Success(Vec<Recipe>),
}

impl RequestStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestStatus::Loading)
    }

    pub fn recipes(&self) -> Option<&[Recipe]> {
        match self {
            RequestStatus::Success(recipes) => Some(recipes),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestStatus::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Everything a front end needs to render the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub ingredients: IngredientSet,
    pub meal_type: MealType,
    pub difficulty: Difficulty,
    pub status: RequestStatus,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            ingredients: IngredientSet::with_defaults(),
            meal_type: MealType::Any,
            difficulty: Difficulty::Any,
            status: RequestStatus::Idle,
        }
    }
}

/// What a call to [`RecipeSession::generate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// Recipes were stored as `Success`.
    Completed,
    /// The request failed; status is the generic `Error`.
    Failed,
    /// No ingredients; status is `Error` and no request was sent.
    Rejected,
    /// A request was already loading; the call was ignored and nothing changed.
    AlreadyInFlight,
}

/// View state for one user: ingredients, filters and the request status.
///
/// State lives in a `watch` channel so front ends can `subscribe` and re-render on
/// every change. At most one request is in flight per session: `generate` while
/// `Loading` is ignored and returns [`GenerateOutcome::AlreadyInFlight`].
pub struct RecipeSession<T> {
    transport: T,
    state: watch::Sender<SessionState>,
}

impl<T: RecipeTransport> RecipeSession<T> {
    pub fn new(transport: T) -> Self {
        Self::with_state(transport, SessionState::default())
    }

    /// Starts from `ingredients` instead of the default seed list.
    pub fn with_ingredients<I, S>(transport: T, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let state = SessionState {
            ingredients: ingredients.into_iter().collect(),
            ..SessionState::default()
        };
        Self::with_state(transport, state)
    }

    fn with_state(transport: T, state: SessionState) -> Self {
        let (state, _) = watch::channel(state);
        Self { transport, state }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn ingredients(&self) -> Vec<String> {
        self.state.borrow().ingredients.as_slice().to_vec()
    }

    pub fn meal_type(&self) -> MealType {
        self.state.borrow().meal_type
    }

    pub fn difficulty(&self) -> Difficulty {
        self.state.borrow().difficulty
    }

    pub fn status(&self) -> RequestStatus {
        self.state.borrow().status.clone()
    }

    /// Normalizes and appends `raw`. Blank or already-present names are silently ignored.
    pub fn add_ingredient(&self, raw: &str) -> bool {
        self.state
            .send_if_modified(|state| state.ingredients.insert(raw))
    }

    /// Removes the ingredient at `index`; an out-of-range index is a silent no-op.
    pub fn remove_ingredient(&self, index: usize) -> Option<String> {
        let mut removed = None;
        self.state.send_if_modified(|state| {
            removed = state.ingredients.remove(index);
            removed.is_some()
        });
        removed
    }

    pub fn set_meal_type(&self, meal_type: MealType) {
        self.state.send_if_modified(|state| {
            let changed = state.meal_type != meal_type;
            state.meal_type = meal_type;
            changed
        });
    }

    pub fn set_difficulty(&self, difficulty: Difficulty) {
        self.state.send_if_modified(|state| {
            let changed = state.difficulty != difficulty;
            state.difficulty = difficulty;
            changed
        });
    }

    /// Sets the meal type from raw UI input. Unknown values are rejected and
    /// the current selection is kept.
    pub fn select_meal_type(&self, raw: &str) -> Result<MealType, FilterParseError> {
        let meal_type = raw.parse()?;
        self.set_meal_type(meal_type);
        Ok(meal_type)
    }

    /// Sets the difficulty from raw UI input. Unknown values are rejected and
    /// the current selection is kept.
    pub fn select_difficulty(&self, raw: &str) -> Result<Difficulty, FilterParseError> {
        let difficulty = raw.parse()?;
        self.set_difficulty(difficulty);
        Ok(difficulty)
    }

    /// Requests recipes for the current ingredients and filters.
    pub async fn generate(&self) -> GenerateOutcome {
        let mut outcome = GenerateOutcome::AlreadyInFlight;
        let mut query = None;

        // Check and enter `Loading` in one step so a second caller sees it.
        self.state.send_if_modified(|state| {
            if state.status.is_loading() {
                return false;
            }
            if state.ingredients.is_empty() {
                state.status = RequestStatus::Error(SessionError::EmptyIngredients.to_string());
                outcome = GenerateOutcome::Rejected;
                return true;
            }
            state.status = RequestStatus::Loading;
            query = Some(RecipeQuery {
                ingredients: state.ingredients.as_slice().to_vec(),
                meal_type: state.meal_type,
                difficulty: state.difficulty,
            });
            true
        });

        let Some(query) = query else {
            if outcome == GenerateOutcome::AlreadyInFlight {
                tracing::debug!("generate ignored, a request is already in flight");
            } else {
                tracing::warn!("generate rejected, ingredient list is empty");
            }
            return outcome;
        };

        let guard = LoadingGuard::new(&self.state);
        tracing::info!(
            ingredients = query.ingredients.len(),
            meal_type = %query.meal_type,
            difficulty = %query.difficulty,
            "requesting recipes"
        );

        let (status, outcome) = match generate_recipes(&self.transport, &query).await {
            Ok(recipes) => {
                tracing::info!(count = recipes.len(), "recipes generated");
                (RequestStatus::Success(recipes), GenerateOutcome::Completed)
            }
            Err(e) => {
                tracing::error!(error = %e, "recipe generation failed");
                (
                    RequestStatus::Error(GENERATION_FAILED_MESSAGE.to_string()),
                    GenerateOutcome::Failed,
                )
            }
        };

        guard.finish(status);
        outcome
    }
}

/// Owns the `Loading` status of one request. If the `generate` future is dropped
/// before `finish`, the status falls back to the generic `Error`.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<SessionState>,
    finished: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a watch::Sender<SessionState>) -> Self {
        Self {
            state,
            finished: false,
        }
    }

    fn finish(mut self, status: RequestStatus) {
        self.finished = true;
        self.state.send_modify(|state| state.status = status);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let reset = self.state.send_if_modified(|state| {
            if !state.status.is_loading() {
                return false;
            }
            state.status = RequestStatus::Error(GENERATION_FAILED_MESSAGE.to_string());
            true
        });
        if reset {
            tracing::warn!("recipe request was cancelled before completing");
        }
    }
}
