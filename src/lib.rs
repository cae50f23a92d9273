pub mod api_connection;
pub mod cli;
pub mod config;
pub mod filters;
pub mod ingredients;
pub mod recipe_generator;
pub mod recipe_parser;
pub mod recipe_prompt;
pub mod recipe_schema;
pub mod session;
