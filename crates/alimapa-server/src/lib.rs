//! HTTP layer: the JSON API the map client talks to.

mod error;
mod routes;

pub use error::ApiError;
pub use routes::{AppState, router, serve};
