use serde_json::{json, Map, Value};

/// Structural contract for model output, independent of any vendor SDK.
///
/// The same tree is rendered to JSON Schema for the request and interpreted by
/// the parser when validating the response.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    String,
    StringArray,
    Object(Vec<SchemaField>),
    Array(Box<SchemaNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: &'static str,
    pub description: &'static str,
    pub node: SchemaNode,
}

impl SchemaField {
    pub fn new(name: &'static str, description: &'static str, node: SchemaNode) -> Self {
        Self {
            name,
            description,
            node,
        }
    }
}

/// A value that does not match the schema, located by a JSON-pointer-like path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub expected: String,
}

impl SchemaNode {
    fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::String => "string",
            SchemaNode::StringArray => "array of strings",
            SchemaNode::Object(_) => "object",
            SchemaNode::Array(_) => "array",
        }
    }

    /// Renders the tree as a JSON Schema document.
    pub fn to_json_schema(&self) -> Value {
        self.render(None)
    }

    fn render(&self, description: Option<&str>) -> Value {
        let mut schema = match self {
            SchemaNode::String => json!({ "type": "string" }),
            SchemaNode::StringArray => json!({
                "type": "array",
                "items": { "type": "string" },
            }),
            SchemaNode::Object(fields) => {
                let mut properties = Map::new();
                for field in fields {
                    properties.insert(
                        field.name.to_string(),
                        field.node.render(Some(field.description)),
                    );
                }
                let required: Vec<&str> = fields.iter().map(|f| f.name).collect();
                json!({
                    "type": "object",
                    "properties": properties,
                    "required": required,
                    "additionalProperties": false,
                })
            }
            SchemaNode::Array(items) => json!({
                "type": "array",
                "items": items.render(None),
            }),
        };
        if let (Some(description), Some(obj)) = (description, schema.as_object_mut()) {
            obj.insert("description".to_string(), Value::from(description));
        }
        schema
    }

    /// Checks `value` against the tree. Properties not named by an object node are ignored.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaViolation> {
        self.validate_at(value, "$")
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<(), SchemaViolation> {
        let violation = || SchemaViolation {
            path: path.to_string(),
            expected: self.type_name().to_string(),
        };

        match self {
            SchemaNode::String => value.is_string().then_some(()).ok_or_else(violation),
            SchemaNode::StringArray => {
                let items = value.as_array().ok_or_else(violation)?;
                for (index, item) in items.iter().enumerate() {
                    if !item.is_string() {
                        return Err(SchemaViolation {
                            path: format!("{}[{}]", path, index),
                            expected: "string".to_string(),
                        });
                    }
                }
                Ok(())
            }
            SchemaNode::Object(fields) => {
                let obj = value.as_object().ok_or_else(violation)?;
                for field in fields {
                    let field_path = format!("{}.{}", path, field.name);
                    match obj.get(field.name) {
                        Some(field_value) => field.node.validate_at(field_value, &field_path)?,
                        None => {
                            return Err(SchemaViolation {
                                path: field_path,
                                expected: format!("required {}", field.node.type_name()),
                            })
                        }
                    }
                }
                Ok(())
            }
            SchemaNode::Array(item_node) => {
                let items = value.as_array().ok_or_else(violation)?;
                for (index, item) in items.iter().enumerate() {
                    item_node.validate_at(item, &format!("{}[{}]", path, index))?;
                }
                Ok(())
            }
        }
    }
}

pub const RECIPE_LIST_SCHEMA_NAME: &str = "recipe_list";

/// Schema of a single recipe record: six mandatory fields.
pub fn recipe_item_schema() -> SchemaNode {
    SchemaNode::Object(vec![
        SchemaField::new(
            "name",
            "A creative name for the recipe.",
            SchemaNode::String,
        ),
        SchemaField::new(
            "description",
            "A short, appetizing description of the dish (2-3 sentences).",
            SchemaNode::String,
        ),
        SchemaField::new(
            "ingredients",
            "Ingredients needed for the recipe, with quantities. Only the provided ingredients may be used.",
            SchemaNode::StringArray,
        ),
        SchemaField::new(
            "instructions",
            "Clear, ordered steps to prepare the recipe.",
            SchemaNode::StringArray,
        ),
        SchemaField::new(
            "mealType",
            "The kind of meal (e.g. 'Breakfast', 'Lunch', 'Dinner', 'Snack'). Must match the request when one is given.",
            SchemaNode::String,
        ),
        SchemaField::new(
            "difficulty",
            "The difficulty level (e.g. 'Easy', 'Medium', 'Hard'). Must match the request when one is given.",
            SchemaNode::String,
        ),
    ])
}

/// The contract the model must satisfy: an array of recipe records.
pub fn recipe_schema() -> SchemaNode {
    SchemaNode::Array(Box::new(recipe_item_schema()))
}
