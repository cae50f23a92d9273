use clap::Parser;

use crate::filters::{Difficulty, MealType};

#[derive(Parser, Debug)]
#[command(author, version, about = "Suggest recipes for the ingredients you have", long_about = None)]
pub struct Cli {
    /// Ingredient to add (repeatable). Added after the default list unless --no-defaults is set.
    #[arg(short, long = "ingredient", value_name = "NAME")]
    pub ingredients: Vec<String>,

    /// Start from an empty ingredient list instead of eggs, cheese and tomatoes
    #[arg(long)]
    pub no_defaults: bool,

    /// Remove the ingredient at this 0-based position before generating (repeatable)
    #[arg(short, long = "remove", value_name = "INDEX")]
    pub remove: Vec<usize>,

    /// Meal type: any, breakfast, lunch, dinner or snack
    #[arg(short, long, default_value = "any")]
    pub meal_type: MealType,

    /// Difficulty: any, easy, medium or hard
    #[arg(short, long, default_value = "any")]
    pub difficulty: Difficulty,

    /// Override the model name from the environment
    #[arg(long)]
    pub model: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print the resulting session state as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
