use anyhow::{anyhow, Context, Result};
use recipe_ideas::api_connection::Provider;
use recipe_ideas::cli::{parse_args, Cli};
use recipe_ideas::config::GeneratorConfig;
use recipe_ideas::ingredients::DEFAULT_INGREDIENTS;
use recipe_ideas::recipe_parser::Recipe;
use recipe_ideas::session::{
    GenerateOutcome, RecipeSession, RequestStatus, GENERATION_FAILED_MESSAGE,
};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn build_session(cli: &Cli, provider: Provider) -> RecipeSession<Provider> {
    let seed: &[&str] = if cli.no_defaults { &[] } else { &DEFAULT_INGREDIENTS };
    let session = RecipeSession::with_ingredients(provider, seed);

    for ingredient in &cli.ingredients {
        if !session.add_ingredient(ingredient) {
            tracing::info!(ingredient = %ingredient, "skipping blank or duplicate ingredient");
        }
    }
    // Highest index first so earlier removals don't shift later ones.
    let mut removals = cli.remove.clone();
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    for index in removals {
        if session.remove_ingredient(index).is_none() {
            tracing::warn!(index, "no ingredient at this position, nothing removed");
        }
    }

    session.set_meal_type(cli.meal_type);
    session.set_difficulty(cli.difficulty);
    session
}

fn print_recipe(position: usize, recipe: &Recipe) {
    println!("\n{}. {}", position, recipe.name);
    println!("   {} | {}", recipe.meal_type, recipe.difficulty);
    println!("   {}", recipe.description);
    println!("   Ingredients:");
    for ingredient in &recipe.ingredients {
        println!("     - {}", ingredient);
    }
    println!("   Instructions:");
    for (step, instruction) in recipe.instructions.iter().enumerate() {
        println!("     {}. {}", step + 1, instruction);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = parse_args();

    let mut config = GeneratorConfig::from_env().context("Failed to load configuration")?;
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }

    let provider = Provider::new(config).context("Failed to build HTTP client")?;
    let session = build_session(&cli, provider);

    println!("Ingredients: {}", session.ingredients().join(", "));
    println!(
        "Meal type: {} | Difficulty: {}",
        session.meal_type(),
        session.difficulty()
    );
    println!("Looking for recipes...");

    let outcome = session.generate().await;
    let status = session.status();

    if cli.json {
        let state = session.snapshot();
        println!(
            "{}",
            serde_json::to_string_pretty(&state).context("Failed to serialize session state")?
        );
    } else if let Some(recipes) = status.recipes() {
        println!("\nFound {} recipe(s):", recipes.len());
        for (idx, recipe) in recipes.iter().enumerate() {
            print_recipe(idx + 1, recipe);
        }
    }

    outcome_result(outcome, &status)
}

fn outcome_result(outcome: GenerateOutcome, status: &RequestStatus) -> Result<()> {
    match outcome {
        GenerateOutcome::Failed | GenerateOutcome::Rejected => Err(anyhow!(status
            .error_message()
            .unwrap_or(GENERATION_FAILED_MESSAGE)
            .to_string())),
        GenerateOutcome::Completed | GenerateOutcome::AlreadyInFlight => Ok(()),
    }
}
