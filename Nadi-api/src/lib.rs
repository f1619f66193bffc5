// NADI API lib.rs
//
// HTTP surface of the blood pressure analysis service: analysis endpoints,
// last-result redisplay, usage counters, health and OpenAPI docs.

// Public modules
pub mod api;
pub mod entities;
pub mod openapi;

pub use api::{create_app, create_application, AppState};
