use crate::filters::{Difficulty, MealType};

pub const INGREDIENT_SEPARATOR: &str = ", ";

/// Number of recipes the model is asked for. Advisory only: the parser accepts any count.
pub const REQUESTED_RECIPE_COUNT: usize = 3;

/// Builds the instruction text sent to the model.
///
/// The output only depends on the arguments: the same ingredients and filters
/// always produce the same prompt. Filter clauses are omitted for `Any`.
pub fn build_prompt<S: AsRef<str>>(
    ingredients: &[S],
    meal_type: MealType,
    difficulty: Difficulty,
) -> String {
    let mut prompt = format!(
        "You are a creative, expert home-cook chef. Create exactly {} delicious recipes using only the listed ingredients.",
        REQUESTED_RECIPE_COUNT
    );

    if meal_type != MealType::Any {
        prompt.push_str(&format!(
            " The recipes must be suitable for {}.",
            meal_type.as_str()
        ));
    }

    if difficulty != Difficulty::Any {
        prompt.push_str(&format!(
            " The difficulty of the recipes must be {}.",
            difficulty.as_str()
        ));
    }

    let ingredient_list = ingredients
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(INGREDIENT_SEPARATOR);
    prompt.push_str(&format!("\nAvailable ingredients: {}.", ingredient_list));

    prompt.push_str(
        "\n\nYour response MUST be a JSON array of objects, where each object follows the provided schema \
(name, description, ingredients, instructions, mealType, difficulty). \
Do not include any ingredient that is not in the list. \
If essential ingredients are missing, create the best recipes possible with what is available. \
Offer variety across the recipes where possible.",
    );

    prompt
}
