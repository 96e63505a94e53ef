//! Command implementations for churnctl CLI

pub mod batch;
pub mod form;
pub mod health;
pub mod predict;

// Re-export main dispatcher functions for flat access from main.rs
pub use batch::run_batch;
pub use form::run_form;
pub use health::run_health;
pub use predict::run_predict;
