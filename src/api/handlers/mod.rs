// src/api/handlers/mod.rs
mod analyze;
mod health;

pub use analyze::analyze_food;
pub use health::health_check;
