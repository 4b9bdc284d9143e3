// src/api/mod.rs
pub mod routes;
pub mod handlers;
pub mod state;

pub use routes::{configure_routes, json_config};
pub use state::AppState;
