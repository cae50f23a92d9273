use async_trait::async_trait;
use recipe_ideas::api_connection::{RecipeTransport, TransportError};
use recipe_ideas::filters::{Difficulty, MealType};
use recipe_ideas::recipe_schema::SchemaNode;
use recipe_ideas::session::{
    GenerateOutcome, RecipeSession, RequestStatus, GENERATION_FAILED_MESSAGE,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;

fn recipes_payload(names: &[&str]) -> String {
    let items: Vec<_> = names
        .iter()
        .map(|name| {
            json!({
                "name": name,
                "description": format!("{} for the table.", name),
                "ingredients": ["2 eggs", "100 g cheese"],
                "instructions": ["Prepare.", "Cook.", "Serve."],
                "mealType": "Breakfast",
                "difficulty": "Easy"
            })
        })
        .collect();
    json!(items).to_string()
}

/// Replies with a fixed payload and records every prompt it receives.
struct ScriptedTransport {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn ok(body: String) -> Self {
        Self {
            reply: Ok(body),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing(body: &str) -> Self {
        Self {
            reply: Err(body.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl RecipeTransport for ScriptedTransport {
    async fn complete(&self, prompt: &str, _schema: &SchemaNode) -> Result<String, TransportError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(|error_body| TransportError::Api {
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            error_body,
        })
    }
}

/// Holds every request until `release` is called.
struct GatedTransport {
    calls: AtomicUsize,
    gate: Notify,
    body: String,
}

impl GatedTransport {
    fn new(body: String) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            gate: Notify::new(),
            body,
        }
    }

    fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl RecipeTransport for GatedTransport {
    async fn complete(&self, _prompt: &str, _schema: &SchemaNode) -> Result<String, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        Ok(self.body.clone())
    }
}

/// Never answers the first request; answers every later one.
struct StallsFirstTransport {
    calls: AtomicUsize,
    body: String,
}

#[async_trait]
impl RecipeTransport for StallsFirstTransport {
    async fn complete(&self, _prompt: &str, _schema: &SchemaNode) -> Result<String, TransportError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            std::future::pending::<()>().await;
        }
        Ok(self.body.clone())
    }
}

#[tokio::test]
async fn test_generate_success_stores_recipes() {
    let session = RecipeSession::with_ingredients(
        ScriptedTransport::ok(recipes_payload(&["Omelette", "Frittata", "Toastie"])),
        ["Eggs", "cheese"],
    );
    session.set_meal_type(MealType::Breakfast);

    assert_eq!(session.generate().await, GenerateOutcome::Completed);

    let status = session.status();
    let recipes = status.recipes().expect("status should be Success");
    assert_eq!(recipes.len(), 3);
    assert_eq!(recipes[0].name, "Omelette");
    assert_eq!(recipes[2].instructions, ["Prepare.", "Cook.", "Serve."]);

    let prompts = session.transport().prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Available ingredients: eggs, cheese."));
    assert!(prompts[0].contains("suitable for breakfast"));
    assert!(!prompts[0].contains("The difficulty of the recipes must be"));
}

#[tokio::test]
async fn test_empty_ingredients_makes_no_transport_call() {
    let session = RecipeSession::new(ScriptedTransport::ok(recipes_payload(&["Unused"])));
    while session.remove_ingredient(0).is_some() {}

    assert_eq!(session.generate().await, GenerateOutcome::Rejected);
    assert_eq!(
        session.status().error_message(),
        Some("add at least one ingredient")
    );
    assert_eq!(session.transport().calls(), 0);
}

#[tokio::test]
async fn test_transport_failure_yields_generic_error() {
    let session = RecipeSession::new(ScriptedTransport::failing("quota exceeded for key sk-123"));

    assert_eq!(session.generate().await, GenerateOutcome::Failed);
    let status = session.status();
    assert_eq!(status.error_message(), Some(GENERATION_FAILED_MESSAGE));
    assert!(!GENERATION_FAILED_MESSAGE.contains("quota"));
}

#[tokio::test]
async fn test_schema_failure_yields_same_generic_error() {
    let payload = json!([{ "name": "Half a recipe", "description": "no steps" }]).to_string();
    let session = RecipeSession::new(ScriptedTransport::ok(payload));

    assert_eq!(session.generate().await, GenerateOutcome::Failed);
    assert_eq!(session.status().error_message(), Some(GENERATION_FAILED_MESSAGE));
}

#[tokio::test]
async fn test_error_state_recovers_on_next_generate() {
    let session = RecipeSession::with_ingredients(
        ScriptedTransport::ok(recipes_payload(&["Rice bowl"])),
        Vec::<String>::new(),
    );
    assert_eq!(session.generate().await, GenerateOutcome::Rejected);

    assert!(session.add_ingredient("rice"));
    assert_eq!(session.generate().await, GenerateOutcome::Completed);
    assert_eq!(session.status().recipes().map(|r| r.len()), Some(1));
}

#[tokio::test]
async fn test_second_generate_while_loading_is_ignored() {
    for _ in 0..5 {
        let session = RecipeSession::new(GatedTransport::new(recipes_payload(&["First"])));
        let mut watcher = session.subscribe();

        let (first, second) = tokio::join!(session.generate(), async {
            watcher
                .wait_for(|state| state.status.is_loading())
                .await
                .expect("session dropped");
            let outcome = session.generate().await;
            assert_eq!(session.status(), RequestStatus::Loading);
            session.transport().release();
            outcome
        });

        assert_eq!(first, GenerateOutcome::Completed);
        assert_eq!(second, GenerateOutcome::AlreadyInFlight);
        assert_eq!(session.transport().calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.status().recipes().map(|r| r[0].name.clone()), Some("First".to_string()));
    }
}

#[tokio::test]
async fn test_cancelled_generate_leaves_session_usable() {
    let session = RecipeSession::new(StallsFirstTransport {
        calls: AtomicUsize::new(0),
        body: recipes_payload(&["Second try"]),
    });

    let timed_out = tokio::time::timeout(Duration::from_millis(50), session.generate()).await;
    assert!(timed_out.is_err());
    assert_eq!(session.status().error_message(), Some(GENERATION_FAILED_MESSAGE));

    assert_eq!(session.generate().await, GenerateOutcome::Completed);
    assert_eq!(session.transport().calls.load(Ordering::SeqCst), 2);
    assert_eq!(
        session.status().recipes().map(|r| r[0].name.clone()),
        Some("Second try".to_string())
    );
}

#[tokio::test]
async fn test_subscriber_sees_loading_then_success() {
    let session = RecipeSession::new(GatedTransport::new(recipes_payload(&["Salad"])));
    let mut watcher = session.subscribe();
    watcher.borrow_and_update();

    let (outcome, seen) = tokio::join!(session.generate(), async {
        let mut seen = Vec::new();
        watcher.changed().await.expect("session dropped");
        seen.push(watcher.borrow_and_update().status.clone());
        session.transport().release();
        watcher.changed().await.expect("session dropped");
        seen.push(watcher.borrow_and_update().status.clone());
        seen
    });

    assert_eq!(outcome, GenerateOutcome::Completed);
    assert_eq!(seen[0], RequestStatus::Loading);
    assert!(matches!(&seen[1], RequestStatus::Success(recipes) if recipes[0].name == "Salad"));
}

#[test]
fn test_ingredient_editing_and_filters() {
    let session = RecipeSession::new(ScriptedTransport::ok(String::new()));

    assert!(session.add_ingredient("  Basil "));
    assert!(!session.add_ingredient("BASIL"));
    assert!(!session.add_ingredient("   "));
    assert_eq!(session.ingredients(), ["eggs", "cheese", "tomatoes", "basil"]);

    assert_eq!(session.remove_ingredient(1), Some("cheese".to_string()));
    assert_eq!(session.remove_ingredient(3), None);
    assert_eq!(session.ingredients(), ["eggs", "tomatoes", "basil"]);

    session.set_difficulty(Difficulty::Hard);
    assert!(session.select_difficulty("impossible").is_err());
    assert_eq!(session.difficulty(), Difficulty::Hard);
}
