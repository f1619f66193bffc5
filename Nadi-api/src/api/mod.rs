pub mod handlers;
pub mod routes;
pub mod state;

#[cfg(test)]
mod routes_tests;

pub use routes::{create_app, create_application};
pub use state::AppState;
