pub mod connection;
pub mod endpoints;

pub use connection::{Provider, RecipeTransport, TransportError};
